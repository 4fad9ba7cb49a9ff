//! Persisting collections as locale JSON files.

use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result, bail};
use serde_json::{Map, Value};
use tracing::debug;

use super::{aggregate::Collections, collector::Collector};

/// Writes collection trees through a collector's hooks.
pub struct CollectionWriter<'a, C: Collector> {
    collector: &'a C,
}

/// What happened to one collection file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WrittenCollection {
    pub collection: String,
    pub file_path: PathBuf,
    pub created: bool,
    pub changed: bool,
}

impl<'a, C: Collector> CollectionWriter<'a, C> {
    pub fn new(collector: &'a C) -> Self {
        Self { collector }
    }

    /// Persist every collection, in name order.
    ///
    /// Runs `pre_write`, then writes each collection (announcing files that do
    /// not exist yet), then hands the changed collection names to `post_write`.
    pub fn persist(&self, collections: &Collections, clean: bool) -> Result<Vec<WrittenCollection>> {
        self.collector.pre_write(clean)?;

        let mut written = Vec::with_capacity(collections.len());
        for (collection, tree) in collections {
            let file_path = self.collector.resolve_collection_file_path(collection);
            let created = !file_path.exists();
            if created {
                self.collector.on_missing_collection(collection);
            }

            let changed = Self::write(&file_path, tree)?;
            written.push(WrittenCollection {
                collection: collection.clone(),
                file_path,
                created,
                changed,
            });
        }

        let changed: Vec<String> = written
            .iter()
            .filter(|w| w.changed)
            .map(|w| w.collection.clone())
            .collect();
        self.collector.post_write(&changed)?;

        Ok(written)
    }

    /// Write `tree` to `path` unless the file already holds the same data.
    ///
    /// Returns whether the file was written.
    pub fn write(path: &Path, tree: &Map<String, Value>) -> Result<bool> {
        if read_existing(path)?.as_ref() == Some(tree) {
            debug!("{} is up to date", path.display());
            return Ok(false);
        }

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
        }

        let content = serde_json::to_string_pretty(tree).context("Failed to serialize JSON")?;
        fs::write(path, format!("{}\n", content))
            .with_context(|| format!("Failed to write file: {}", path.display()))?;

        Ok(true)
    }
}

fn read_existing(path: &Path) -> Result<Option<Map<String, Value>>> {
    if !path.is_file() {
        return Ok(None);
    }

    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read file: {}", path.display()))?;
    let value: Value = serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse JSON: {}", path.display()))?;
    match value {
        Value::Object(map) => Ok(Some(map)),
        _ => bail!("Root of JSON file must be an object: {}", path.display()),
    }
}
