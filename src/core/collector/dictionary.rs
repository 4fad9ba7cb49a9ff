use std::{fs, path::PathBuf};

use anyhow::{Context, Result};
use serde_json::{Map, Value};
use tracing::{info, warn};

use super::{Collector, CollectorOptions};
use crate::core::scanner::ProcessedTag;

/// Single dictionary for every namespace.
#[derive(Debug, Clone)]
pub struct DictionaryCollector {
    options: CollectorOptions,
}

impl DictionaryCollector {
    pub fn new(options: CollectorOptions) -> Self {
        Self { options }
    }
}

impl Collector for DictionaryCollector {
    fn aggregate_collection(&self, _namespace: &str) -> String {
        self.options.base_language_code.clone()
    }

    /// Move the namespace in front of the path: `{ namespace: 'auth', path:
    /// 'login' }` becomes `{ path: 'auth.login' }`.
    fn transform_tag(&self, tag: &ProcessedTag) -> ProcessedTag {
        if !self.options.append_namespace_to_path {
            return tag.clone();
        }

        let namespace = tag
            .namespace()
            .unwrap_or(self.options.default_namespace.as_str())
            .to_string();
        let path = match tag.path() {
            Some(path) => format!("{}.{}", namespace, path),
            None => namespace,
        };

        let mut config = tag.parameter_config.clone().unwrap_or_else(Map::new);
        config.remove("namespace");
        config.insert("path".to_string(), Value::String(path));
        tag.with_config(config)
    }

    fn pre_write(&self, clean: bool) -> Result<()> {
        let dir = &self.options.locales_dir;
        let file = self.resolve_collection_file_path(&self.options.base_language_code);

        if clean && file.is_file() {
            fs::remove_file(&file)
                .with_context(|| format!("Failed to remove file: {}", file.display()))?;
        }

        fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create directory: {}", dir.display()))?;
        Ok(())
    }

    fn resolve_collection_file_path(&self, collection: &str) -> PathBuf {
        self.options
            .locales_dir
            .join(format!("{}.json", collection))
    }

    fn on_missing_collection(&self, collection: &str) {
        warn!(
            "Dictionary {} does not exist yet, it will be created",
            self.resolve_collection_file_path(collection).display()
        );
    }

    fn post_write(&self, changed: &[String]) -> Result<()> {
        match changed.first() {
            Some(collection) => info!(
                "Updated dictionary {}",
                self.resolve_collection_file_path(collection).display()
            ),
            None => info!("Dictionary is up to date"),
        }
        Ok(())
    }
}
