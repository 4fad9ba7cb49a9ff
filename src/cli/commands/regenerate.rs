use std::{fs, io};

use anyhow::{Context, Result};
use serde_json::Value;
use tracing::info;

use super::super::{args::RegenerateCommand, exit_status::ExitStatus, report::print_regenerate_to};
use crate::core::{
    context::CollectContext,
    generator::generate_config,
    json5::to_json5_string,
    scanner::{ProcessedTag, TagReplacement},
};

/// One tag whose config differs from what its location implies.
#[derive(Debug, Clone)]
pub struct RegeneratedTag {
    pub file_path: String,
    pub line: usize,
    pub column: usize,
    pub before: String,
    pub after: String,
}

#[derive(Debug)]
pub struct RegenerateSummary {
    pub tags: Vec<RegeneratedTag>,
    pub file_count: usize,
    pub is_apply: bool,
}

pub fn regenerate_tags(cmd: RegenerateCommand) -> Result<ExitStatus> {
    let ctx = CollectContext::new(&cmd.common)?;
    let options = ctx.generator_options();
    let mut summary = RegenerateSummary {
        tags: Vec::new(),
        file_count: 0,
        is_apply: cmd.apply,
    };

    for file in ctx.file_tags() {
        let planned: Vec<(&ProcessedTag, String)> = file
            .tags
            .iter()
            .filter(|tag| tag.is_valid())
            .filter_map(|tag| {
                generate_config(
                    &file.relative_file_path,
                    tag.parameter_config.as_ref(),
                    &options,
                )
                .map(|config| (tag, to_json5_string(&Value::Object(config))))
            })
            .collect();

        if planned.is_empty() {
            continue;
        }

        if cmd.apply {
            let path = ctx.absolute_path(&file.relative_file_path);
            let source = fs::read_to_string(&path)
                .with_context(|| format!("Failed to read file: {}", path.display()))?;
            let replacements: Vec<TagReplacement<'_>> = planned
                .iter()
                .map(|(tag, text)| TagReplacement::config(tag, text.clone()))
                .collect();
            let updated = ctx
                .scanner()
                .replace_tags(&source, &replacements)
                .with_context(|| format!("Failed to rewrite tags in {}", path.display()))?;
            fs::write(&path, updated)
                .with_context(|| format!("Failed to write file: {}", path.display()))?;
            info!("Rewrote {} tag(s) in {}", planned.len(), file.relative_file_path);
        }

        summary.file_count += 1;
        summary
            .tags
            .extend(planned.into_iter().map(|(tag, after)| RegeneratedTag {
                file_path: file.relative_file_path.clone(),
                line: tag.line,
                column: tag.column,
                before: tag
                    .parameter_config
                    .as_ref()
                    .map(|config| to_json5_string(&Value::Object(config.clone())))
                    .unwrap_or_else(|| "(no config)".to_string()),
                after,
            }));
    }

    print_regenerate_to(&summary, &mut io::stdout().lock());
    Ok(ExitStatus::Success)
}
