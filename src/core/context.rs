use std::{
    cell::OnceCell,
    fs,
    path::{Path, PathBuf},
};

use anyhow::{Context as _, Result};
use rayon::prelude::*;
use tracing::{debug, info, warn};

use crate::{
    cli::args::CommonArgs,
    config::{Config, load_config},
    core::{
        aggregate::{CollectError, CollectOutcome, FileTags, MergeOptions, group_tags_to_collections},
        collector::{CollectorOptions, TagCollector},
        conflict::{ConflictResolver, PolicyResolver},
        file_scanner::{ScanOptions, scan_files},
        generator::GeneratorOptions,
        scanner::TagScanner,
    },
};

/// A source file that could not be read.
#[derive(Debug, Clone)]
pub struct ReadError {
    pub file_path: String,
    pub error: String,
}

/// Everything a command needs about one project.
///
/// Configuration priority (highest to lowest):
/// 1. CLI arguments (e.g. `--source-root`)
/// 2. `.langtagrc.json`
/// 3. Built-in defaults
///
/// Source files are read and scanned lazily, in parallel, on first access.
pub struct CollectContext {
    pub config: Config,

    /// Project root: where the config was searched from and paths resolve against.
    pub root_dir: PathBuf,

    /// Source files below `scan_root`, relative and sorted.
    pub files: Vec<String>,

    scanner: TagScanner,
    file_tags: OnceCell<Vec<FileTags>>,
    read_errors: OnceCell<Vec<ReadError>>,
}

impl CollectContext {
    pub fn new(common_args: &CommonArgs) -> Result<Self> {
        let root_dir = common_args
            .source_root
            .clone()
            .unwrap_or_else(|| PathBuf::from("."));

        let config_result = load_config(&root_dir)?;
        if !config_result.from_file {
            info!("No .langtagrc.json found, using default configuration");
        }

        Self::from_config(config_result.config, root_dir)
    }

    pub fn from_config(config: Config, root_dir: PathBuf) -> Result<Self> {
        let scanner = TagScanner::new(&config.tag_name, config.translation_arg_position)
            .with_context(|| format!("Invalid tag name: {}", config.tag_name))?;

        let scan_root = root_dir.join(&config.source_root);
        let scan_result = scan_files(
            &scan_root,
            &ScanOptions {
                includes: &config.includes,
                excludes: &config.excludes,
                extensions: &config.extensions,
            },
        );

        if scan_result.skipped_count > 0 {
            warn!(
                "{} path(s) skipped due to access errors",
                scan_result.skipped_count
            );
        }

        Ok(Self {
            config,
            root_dir,
            files: scan_result.files,
            scanner,
            file_tags: OnceCell::new(),
            read_errors: OnceCell::new(),
        })
    }

    pub fn scanner(&self) -> &TagScanner {
        &self.scanner
    }

    /// Directory the relative file paths are based on.
    pub fn scan_root(&self) -> PathBuf {
        self.root_dir.join(&self.config.source_root)
    }

    pub fn absolute_path(&self, relative_file_path: &str) -> PathBuf {
        self.scan_root().join(relative_file_path)
    }

    pub fn locales_dir(&self) -> PathBuf {
        self.root_dir.join(&self.config.locales_directory)
    }

    /// Tags of every readable source file, in file order (lazy initialization).
    ///
    /// Reading and scanning run in parallel; `collect` keeps the input order,
    /// which aggregation depends on.
    pub fn file_tags(&self) -> &[FileTags] {
        self.file_tags.get_or_init(|| {
            let scan_root = self.scan_root();
            let scanner = &self.scanner;

            let results: Vec<_> = self
                .files
                .par_iter()
                .map(|file_path| {
                    let result = read_source(&scan_root.join(file_path)).map(|source| FileTags {
                        relative_file_path: file_path.clone(),
                        tags: scanner.extract_tags(&source),
                    });
                    (file_path, result)
                })
                .collect();

            let mut file_tags = Vec::with_capacity(results.len());
            let mut errors = Vec::new();
            for (file_path, result) in results {
                match result {
                    Ok(tags) => {
                        if !tags.tags.is_empty() {
                            debug!("{}: {} tag(s)", file_path, tags.tags.len());
                        }
                        file_tags.push(tags);
                    }
                    Err(e) => {
                        warn!("Skipping {}: {:#}", file_path, e);
                        errors.push(ReadError {
                            file_path: file_path.clone(),
                            error: format!("{:#}", e),
                        });
                    }
                }
            }

            let _ = self.read_errors.set(errors);
            file_tags
        })
    }

    /// Files that could not be read. Populated by `file_tags()`.
    pub fn read_errors(&self) -> &[ReadError] {
        self.file_tags();
        self.read_errors.get_or_init(Vec::new)
    }

    pub fn collector(&self) -> TagCollector {
        let collect = &self.config.collect;
        TagCollector::new(
            collect.collector,
            CollectorOptions {
                locales_dir: self.locales_dir(),
                base_language_code: self.config.base_language_code.clone(),
                default_namespace: collect.default_namespace.clone(),
                append_namespace_to_path: collect.append_namespace_to_path,
            },
        )
    }

    pub fn merge_options(&self) -> MergeOptions {
        MergeOptions {
            default_namespace: self.config.collect.default_namespace.clone(),
            ignore_conflicts_with_matching_values: self
                .config
                .collect
                .ignore_conflicts_with_matching_values,
        }
    }

    pub fn resolver(&self) -> PolicyResolver {
        PolicyResolver {
            on_conflict: self.config.collect.on_conflict,
            fail_on_conflicts: self.config.collect.fail_on_conflicts,
        }
    }

    pub fn generator_options(&self) -> GeneratorOptions {
        let generation = &self.config.generation;
        GeneratorOptions {
            root_dirs: generation.root_dirs.clone(),
            ignore_dirs: generation.ignore_dirs.clone(),
            default_namespace: self.config.collect.default_namespace.clone(),
            clear_on_default_namespace: generation.clear_on_default_namespace,
        }
    }

    /// Aggregate every scanned tag with the configured collector.
    pub fn aggregate(
        &self,
        collector: &TagCollector,
        resolver: &mut dyn ConflictResolver,
    ) -> Result<CollectOutcome, CollectError> {
        group_tags_to_collections(self.file_tags(), collector, resolver, &self.merge_options())
    }
}

fn read_source(path: &Path) -> Result<String> {
    fs::read_to_string(path).with_context(|| format!("Failed to read file: {}", path.display()))
}
