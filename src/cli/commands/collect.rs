use std::io;

use anyhow::Result;
use tracing::info;

use super::super::{
    args::CollectCommand,
    exit_status::ExitStatus,
    report::{
        invalid_tags, print_aborted_to, print_written_to, report_conflicts_to,
        report_invalid_tags_to, report_read_errors_to,
    },
};
use crate::core::{aggregate::CollectError, context::CollectContext, writer::CollectionWriter};

/// Scan, aggregate and persist.
///
/// An aborted aggregation writes nothing and exits with `Failure`. Conflicts
/// that did not abort the run are reported and the first-seen values are
/// written.
pub fn collect(cmd: CollectCommand) -> Result<ExitStatus> {
    let ctx = CollectContext::new(&cmd.common)?;
    let collector = ctx.collector();
    let mut resolver = ctx.resolver();
    let out = &mut io::stdout().lock();

    report_read_errors_to(ctx.read_errors(), out);
    report_invalid_tags_to(&invalid_tags(ctx.file_tags()), out);

    let outcome = match ctx.aggregate(&collector, &mut resolver) {
        Ok(outcome) => outcome,
        Err(CollectError::Aborted { conflicts }) => {
            report_conflicts_to(&conflicts, out);
            print_aborted_to(conflicts.len(), out);
            return Ok(ExitStatus::Failure);
        }
        Err(e) => return Err(e.into()),
    };

    report_conflicts_to(&outcome.conflicts, out);

    let written = CollectionWriter::new(&collector).persist(&outcome.collections, cmd.clean)?;
    let tag_count = ctx
        .file_tags()
        .iter()
        .map(|file| file.tags.len())
        .sum::<usize>()
        - outcome.skipped_tags;
    info!(
        "Collected {} tag(s) from {} file(s)",
        tag_count,
        ctx.files.len()
    );
    print_written_to(&written, &ctx.root_dir, tag_count, out);

    Ok(ExitStatus::Success)
}
