use std::io;

use anyhow::Result;

use super::super::{
    args::CheckCommand,
    exit_status::ExitStatus,
    report::{
        invalid_tags, print_success_to, print_summary_to, report_conflicts_to,
        report_invalid_tags_to, report_read_errors_to,
    },
};
use crate::core::{
    aggregate::CollectError,
    conflict::{ConflictPolicy, PolicyResolver},
    context::CollectContext,
};

/// Aggregate without writing and report everything found.
///
/// Every conflict is collected regardless of the configured policy, so a
/// single run shows the full picture.
pub fn check(cmd: CheckCommand) -> Result<ExitStatus> {
    let ctx = CollectContext::new(&cmd.common)?;
    let collector = ctx.collector();
    let mut resolver = PolicyResolver {
        on_conflict: ConflictPolicy::Continue,
        fail_on_conflicts: false,
    };
    let out = &mut io::stdout().lock();

    let conflicts = match ctx.aggregate(&collector, &mut resolver) {
        Ok(outcome) => outcome.conflicts,
        Err(CollectError::Aborted { conflicts }) => conflicts,
        Err(e) => return Err(e.into()),
    };
    let invalid = invalid_tags(ctx.file_tags());
    let read_errors = ctx.read_errors();

    report_read_errors_to(read_errors, out);
    report_invalid_tags_to(&invalid, out);
    report_conflicts_to(&conflicts, out);

    let errors = conflicts.len();
    let warnings = invalid.len() + read_errors.len();
    if errors + warnings == 0 {
        let tags = ctx.file_tags().iter().map(|file| file.tags.len()).sum();
        print_success_to(ctx.files.len(), tags, out);
    } else {
        print_summary_to(errors, warnings, out);
    }

    Ok(ExitStatus::from_problems(!conflicts.is_empty() || !invalid.is_empty()))
}
