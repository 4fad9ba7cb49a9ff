//! Collector strategies.
//!
//! A collector decides which physical collection (output file) a namespace
//! lands in, may rewrite a tag's config before it is merged, and owns the
//! filesystem side effects around persisting collections.
//!
//! ## Variants
//!
//! - [`NamespaceCollector`]: one JSON file per namespace under
//!   `<localesDirectory>/<baseLanguageCode>/`.
//! - [`DictionaryCollector`]: a single `<localesDirectory>/<baseLanguageCode>.json`
//!   with the namespace folded into each tag's path.

use std::path::PathBuf;

use anyhow::Result;
use enum_dispatch::enum_dispatch;
use serde::{Deserialize, Serialize};

use super::scanner::ProcessedTag;

mod dictionary;
mod namespace;

pub use dictionary::DictionaryCollector;
pub use namespace::NamespaceCollector;

/// Collector selection in the config file.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CollectorKind {
    #[default]
    Namespace,
    Dictionary,
}

/// Settings every collector is constructed with.
#[derive(Debug, Clone)]
pub struct CollectorOptions {
    /// Root directory for persisted collections.
    pub locales_dir: PathBuf,
    pub base_language_code: String,
    pub default_namespace: String,
    /// Dictionary collector only: prefix each path with its namespace.
    pub append_namespace_to_path: bool,
}

/// Capabilities of a collector.
#[enum_dispatch]
pub trait Collector {
    /// Name of the collection the given namespace is aggregated into.
    fn aggregate_collection(&self, namespace: &str) -> String;

    /// Adjust a tag before it is merged. Never modifies the input.
    fn transform_tag(&self, tag: &ProcessedTag) -> ProcessedTag;

    /// Prepare the output location; with `clean`, drop previous output first.
    fn pre_write(&self, clean: bool) -> Result<()>;

    /// File a collection is persisted to.
    fn resolve_collection_file_path(&self, collection: &str) -> PathBuf;

    /// Called when a collection has no file on disk yet.
    fn on_missing_collection(&self, collection: &str);

    /// Called after persisting, with the collections whose files changed.
    fn post_write(&self, changed: &[String]) -> Result<()>;
}

/// The configured collector.
#[enum_dispatch(Collector)]
#[derive(Debug, Clone)]
pub enum TagCollector {
    Namespace(NamespaceCollector),
    Dictionary(DictionaryCollector),
}

impl TagCollector {
    pub fn new(kind: CollectorKind, options: CollectorOptions) -> Self {
        match kind {
            CollectorKind::Namespace => NamespaceCollector::new(options).into(),
            CollectorKind::Dictionary => DictionaryCollector::new(options).into(),
        }
    }
}
