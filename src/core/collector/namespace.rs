use std::{fs, path::PathBuf};

use anyhow::{Context, Result};
use tracing::{debug, info};

use super::{Collector, CollectorOptions};
use crate::core::scanner::ProcessedTag;

/// One collection per namespace.
#[derive(Debug, Clone)]
pub struct NamespaceCollector {
    options: CollectorOptions,
}

impl NamespaceCollector {
    pub fn new(options: CollectorOptions) -> Self {
        Self { options }
    }

    fn language_dir(&self) -> PathBuf {
        self.options
            .locales_dir
            .join(&self.options.base_language_code)
    }
}

impl Collector for NamespaceCollector {
    fn aggregate_collection(&self, namespace: &str) -> String {
        namespace.to_string()
    }

    fn transform_tag(&self, tag: &ProcessedTag) -> ProcessedTag {
        tag.clone()
    }

    fn pre_write(&self, clean: bool) -> Result<()> {
        let dir = self.language_dir();

        if clean && dir.is_dir() {
            for entry in fs::read_dir(&dir)
                .with_context(|| format!("Failed to read directory: {}", dir.display()))?
            {
                let path = entry?.path();
                if path.is_file() && path.extension().is_some_and(|ext| ext == "json") {
                    fs::remove_file(&path)
                        .with_context(|| format!("Failed to remove file: {}", path.display()))?;
                    debug!("Removed {}", path.display());
                }
            }
        }

        fs::create_dir_all(&dir)
            .with_context(|| format!("Failed to create directory: {}", dir.display()))?;
        Ok(())
    }

    fn resolve_collection_file_path(&self, collection: &str) -> PathBuf {
        self.language_dir().join(format!("{}.json", collection))
    }

    fn on_missing_collection(&self, collection: &str) {
        debug!(
            "Namespace '{}' has no file yet, creating {}",
            collection,
            self.resolve_collection_file_path(collection).display()
        );
    }

    fn post_write(&self, changed: &[String]) -> Result<()> {
        if changed.is_empty() {
            info!("No namespace changes");
        }
        for namespace in changed {
            info!(
                "Updated namespace '{}' ({})",
                namespace,
                self.resolve_collection_file_path(namespace).display()
            );
        }
        Ok(())
    }
}
