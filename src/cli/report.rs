//! Report formatting and printing utilities.
//!
//! Problems are displayed in cargo-style format. Every printer takes a writer
//! so output can be captured in tests; commands pass a locked stdout.

use std::{io::Write, path::Path};

use colored::Colorize;
use unicode_width::UnicodeWidthStr;

use super::commands::regenerate::RegenerateSummary;
use crate::core::{
    aggregate::FileTags,
    conflict::Conflict,
    context::ReadError,
    scanner::{ProcessedTag, TagValidity},
    writer::WrittenCollection,
};

/// Success mark for consistent output formatting.
pub const SUCCESS_MARK: &str = "\u{2713}"; // ✓

/// Failure mark for consistent output formatting.
pub const FAILURE_MARK: &str = "\u{2718}"; // ✘

/// Invalid tags of every file, in file and source order.
pub fn invalid_tags(files: &[FileTags]) -> Vec<(&str, &ProcessedTag)> {
    files
        .iter()
        .flat_map(|file| {
            file.tags
                .iter()
                .filter(|tag| !tag.is_valid())
                .map(move |tag| (file.relative_file_path.as_str(), tag))
        })
        .collect()
}

pub fn report_invalid_tags_to<W: Write>(tags: &[(&str, &ProcessedTag)], writer: &mut W) {
    let width = line_width(tags.iter().map(|(_, tag)| tag.line));

    for (file_path, tag) in tags {
        let _ = writeln!(writer, "{}: {}", "warning".bold().yellow(), tag.validity);
        let _ = writeln!(
            writer,
            "{:>width$}{} {}:{}:{}",
            "",
            "-->".blue(),
            file_path,
            tag.line,
            tag.column,
            width = width + 1
        );

        let snippet = tag.full_match.lines().next().unwrap_or_default();
        let _ = writeln!(writer, "{:>width$} {}", "", "|".blue(), width = width);
        let _ = writeln!(
            writer,
            "{:>width$} {} {}",
            tag.line.to_string().blue(),
            "|".blue(),
            snippet,
            width = width
        );
        let underline = "^".repeat(UnicodeWidthStr::width(snippet).max(1));
        let _ = writeln!(
            writer,
            "{:>width$} {} {}",
            "",
            "|".blue(),
            underline.yellow(),
            width = width
        );
        if let Some(note) = validity_note(tag.validity) {
            let _ = writeln!(
                writer,
                "{:>width$} {} {} {}",
                "",
                "=".blue(),
                "note:".bold(),
                note,
                width = width
            );
        }
        let _ = writeln!(writer);
    }
}

fn validity_note(validity: TagValidity) -> Option<&'static str> {
    match validity {
        TagValidity::Ok => None,
        TagValidity::InvalidParam1 => Some("argument 1 must be a static object literal"),
        TagValidity::InvalidParam2 => Some("argument 2 must be a static object literal"),
        TagValidity::TranslationsNotFound => Some("the translations argument is missing"),
    }
}

pub fn report_conflicts_to<W: Write>(conflicts: &[Conflict], writer: &mut W) {
    let width = line_width(conflicts.iter().map(|c| c.tag_b.tag.line));

    for conflict in conflicts {
        let _ = writeln!(
            writer,
            "{}: {} {}",
            format!("conflict[{}]", conflict.kind).bold().red(),
            conflict.collection,
            conflict.path.cyan()
        );
        let _ = writeln!(
            writer,
            "{:>width$}{} {}",
            "",
            "-->".blue(),
            conflict.tag_b.location(),
            width = width + 1
        );
        let _ = writeln!(
            writer,
            "{:>width$} {} {} {} from {}",
            "",
            "=".blue(),
            "kept:".bold(),
            conflict.tag_a.value,
            conflict.tag_a.location(),
            width = width
        );
        let _ = writeln!(
            writer,
            "{:>width$} {} {} {}",
            "",
            "=".blue(),
            "discarded:".bold(),
            conflict.tag_b.value,
            width = width
        );
        let _ = writeln!(writer);
    }
}

pub fn report_read_errors_to<W: Write>(errors: &[ReadError], writer: &mut W) {
    for error in errors {
        let _ = writeln!(
            writer,
            "{}: could not read {}: {}",
            "warning".bold().yellow(),
            error.file_path,
            error.error
        );
    }
}

/// `✘ N problems (E errors, W warnings)`, printed only when there are problems.
pub fn print_summary_to<W: Write>(errors: usize, warnings: usize, writer: &mut W) {
    let total = errors + warnings;
    if total == 0 {
        return;
    }
    let _ = writeln!(
        writer,
        "{} {} {} ({} {}, {} {})",
        FAILURE_MARK.red(),
        total,
        if total == 1 { "problem" } else { "problems" },
        errors,
        if errors == 1 { "error" } else { "errors" }.red(),
        warnings,
        if warnings == 1 { "warning" } else { "warnings" }.yellow()
    );
}

pub fn print_success_to<W: Write>(source_files: usize, tags: usize, writer: &mut W) {
    let _ = writeln!(
        writer,
        "{} {}",
        SUCCESS_MARK.green(),
        format!(
            "Checked {} {} in {} source {} - no issues found",
            tags,
            if tags == 1 { "tag" } else { "tags" },
            source_files,
            if source_files == 1 { "file" } else { "files" }
        )
        .green()
    );
}

pub fn print_written_to<W: Write>(
    written: &[WrittenCollection],
    root_dir: &Path,
    tags: usize,
    writer: &mut W,
) {
    for entry in written.iter().filter(|w| w.changed) {
        let path = entry
            .file_path
            .strip_prefix(root_dir)
            .unwrap_or(&entry.file_path);
        let action = if entry.created {
            "Created".green().bold()
        } else {
            "Updated".green().bold()
        };
        let _ = writeln!(writer, "{} {}", action, path.display());
    }

    let changed = written.iter().filter(|w| w.changed).count();
    let _ = writeln!(
        writer,
        "{} {}",
        SUCCESS_MARK.green(),
        format!(
            "Collected {} {} into {} {} ({} changed)",
            tags,
            if tags == 1 { "tag" } else { "tags" },
            written.len(),
            if written.len() == 1 {
                "collection"
            } else {
                "collections"
            },
            changed
        )
        .green()
    );
}

pub fn print_aborted_to<W: Write>(conflicts: usize, writer: &mut W) {
    let _ = writeln!(
        writer,
        "{} Collection aborted after {} {}; no files were written",
        FAILURE_MARK.red(),
        conflicts,
        if conflicts == 1 { "conflict" } else { "conflicts" }
    );
}

pub fn print_regenerate_to<W: Write>(summary: &RegenerateSummary, writer: &mut W) {
    if summary.tags.is_empty() {
        let _ = writeln!(
            writer,
            "{} {}",
            SUCCESS_MARK.green(),
            "All tag configs match their file locations".green()
        );
        return;
    }

    if !summary.is_apply {
        let width = line_width(summary.tags.iter().map(|t| t.line));
        for tag in &summary.tags {
            let _ = writeln!(
                writer,
                "{:>width$}{} {}:{}:{}",
                "",
                "-->".blue(),
                tag.file_path,
                tag.line,
                tag.column,
                width = width + 1
            );
            let _ = writeln!(writer, "{:>width$} {} {}", "", "-".red(), tag.before, width = width);
            let _ = writeln!(writer, "{:>width$} {} {}", "", "+".green(), tag.after, width = width);
        }
        let _ = writeln!(writer);
    }

    if summary.is_apply {
        let _ = writeln!(
            writer,
            "{} {} tag(s) in {} file(s).",
            "Updated".green().bold(),
            summary.tags.len(),
            summary.file_count
        );
    } else {
        let _ = writeln!(
            writer,
            "{} {} tag(s) in {} file(s).",
            "Would update".yellow().bold(),
            summary.tags.len(),
            summary.file_count
        );
        let _ = writeln!(writer, "Run with {} to rewrite them.", "--apply".cyan());
    }
}

fn line_width(lines: impl Iterator<Item = usize>) -> usize {
    lines.max().map(|n| n.to_string().len()).unwrap_or(1)
}
