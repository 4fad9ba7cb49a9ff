use std::{
    collections::BTreeSet,
    path::{Path, PathBuf},
};

use glob::{Pattern, glob};
use tracing::{debug, warn};
use walkdir::WalkDir;

/// Check if a pattern contains glob wildcards (* or ?).
/// Patterns without wildcards are treated as literal paths.
fn is_glob_pattern(pattern: &str) -> bool {
    pattern.contains('*') || pattern.contains('?')
}

/// What to scan below a source root.
pub struct ScanOptions<'a> {
    pub includes: &'a [String],
    pub excludes: &'a [String],
    pub extensions: &'a [String],
}

/// Result of scanning files.
pub struct ScanResult {
    /// Paths relative to the source root, `/`-separated and sorted.
    pub files: Vec<String>,
    pub skipped_count: usize,
}

pub fn scan_files(source_root: &Path, options: &ScanOptions<'_>) -> ScanResult {
    let mut files = BTreeSet::new();
    let mut skipped_count = 0;

    let mut literal_excludes: Vec<PathBuf> = Vec::new();
    let mut glob_excludes: Vec<Pattern> = Vec::new();

    for p in options.excludes {
        if is_glob_pattern(p) {
            match Pattern::new(p) {
                Ok(pattern) => glob_excludes.push(pattern),
                Err(e) => warn!("Invalid exclude pattern '{}': {}", p, e),
            }
        } else {
            literal_excludes.push(source_root.join(p));
        }
    }

    let dirs_to_scan: Vec<PathBuf> = if options.includes.is_empty() {
        vec![source_root.to_path_buf()]
    } else {
        let mut paths = Vec::new();
        for inc in options.includes {
            if is_glob_pattern(inc) {
                let full_pattern = source_root.join(inc);
                match glob(&full_pattern.to_string_lossy()) {
                    Ok(entries) => paths.extend(entries.flatten().filter(|entry| entry.is_dir())),
                    Err(e) => warn!("Invalid include pattern '{}': {}", inc, e),
                }
            } else {
                let path = source_root.join(inc);
                if path.exists() {
                    paths.push(path);
                } else {
                    warn!("Include path does not exist: {}", path.display());
                }
            }
        }
        paths
    };

    for dir in dirs_to_scan {
        for entry in WalkDir::new(dir) {
            let entry = match entry {
                Ok(e) => e,
                Err(e) => {
                    skipped_count += 1;
                    warn!("Cannot access path: {}", e);
                    continue;
                }
            };
            let path = entry.path();

            if literal_excludes
                .iter()
                .any(|exclude| path.starts_with(exclude))
            {
                continue;
            }

            if glob_excludes
                .iter()
                .any(|p| p.matches(&path.to_string_lossy()))
            {
                continue;
            }

            if path.is_file() && has_extension(path, options.extensions) {
                files.insert(relative_path(source_root, path));
            }
        }
    }

    debug!("Found {} scannable files", files.len());

    ScanResult {
        files: files.into_iter().collect(),
        skipped_count,
    }
}

fn has_extension(path: &Path, extensions: &[String]) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|ext| extensions.iter().any(|allowed| allowed == ext))
}

/// Path of `path` below `root`, always `/`-separated.
fn relative_path(root: &Path, path: &Path) -> String {
    let relative = path.strip_prefix(root).unwrap_or(path);
    relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}
