use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result, bail};
use glob::Pattern;
use serde::{Deserialize, Serialize};

use crate::core::{
    collector::CollectorKind, conflict::ConflictPolicy, json5::is_identifier, scanner::ArgPosition,
};

pub const CONFIG_FILE_NAME: &str = ".langtagrc.json";

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    #[serde(default = "default_tag_name")]
    pub tag_name: String,
    #[serde(default)]
    pub translation_arg_position: ArgPosition,
    #[serde(default = "default_includes")]
    pub includes: Vec<String>,
    #[serde(default = "default_excludes")]
    pub excludes: Vec<String>,
    #[serde(default = "default_extensions")]
    pub extensions: Vec<String>,
    #[serde(default = "default_source_root")]
    pub source_root: String,
    #[serde(default = "default_locales_directory")]
    pub locales_directory: String,
    #[serde(default = "default_base_language_code")]
    pub base_language_code: String,
    #[serde(default)]
    pub collect: CollectConfig,
    #[serde(default)]
    pub generation: GenerationConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CollectConfig {
    #[serde(default)]
    pub collector: CollectorKind,
    #[serde(default = "default_namespace")]
    pub default_namespace: String,
    #[serde(default = "default_true")]
    pub ignore_conflicts_with_matching_values: bool,
    #[serde(default = "default_true")]
    pub append_namespace_to_path: bool,
    #[serde(default)]
    pub on_conflict: ConflictPolicy,
    #[serde(default = "default_true")]
    pub fail_on_conflicts: bool,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationConfig {
    #[serde(default = "default_root_dirs")]
    pub root_dirs: Vec<String>,
    #[serde(default)]
    pub ignore_dirs: Vec<String>,
    #[serde(default = "default_true")]
    pub clear_on_default_namespace: bool,
}

fn default_tag_name() -> String {
    "lang".to_string()
}

fn default_includes() -> Vec<String> {
    vec!["src".to_string()]
}

fn default_excludes() -> Vec<String> {
    ["**/node_modules/**", "**/dist/**", "**/build/**"]
        .map(String::from)
        .to_vec()
}

fn default_extensions() -> Vec<String> {
    ["js", "jsx", "ts", "tsx", "mjs", "cjs", "vue", "svelte"]
        .map(String::from)
        .to_vec()
}

fn default_source_root() -> String {
    "./".to_string()
}

fn default_locales_directory() -> String {
    "locales".to_string()
}

fn default_base_language_code() -> String {
    "en".to_string()
}

fn default_namespace() -> String {
    "common".to_string()
}

fn default_root_dirs() -> Vec<String> {
    vec!["src".to_string()]
}

fn default_true() -> bool {
    true
}

impl Default for Config {
    fn default() -> Self {
        Self {
            tag_name: default_tag_name(),
            translation_arg_position: ArgPosition::default(),
            includes: default_includes(),
            excludes: default_excludes(),
            extensions: default_extensions(),
            source_root: default_source_root(),
            locales_directory: default_locales_directory(),
            base_language_code: default_base_language_code(),
            collect: CollectConfig::default(),
            generation: GenerationConfig::default(),
        }
    }
}

impl Default for CollectConfig {
    fn default() -> Self {
        Self {
            collector: CollectorKind::default(),
            default_namespace: default_namespace(),
            ignore_conflicts_with_matching_values: true,
            append_namespace_to_path: true,
            on_conflict: ConflictPolicy::default(),
            fail_on_conflicts: true,
        }
    }
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            root_dirs: default_root_dirs(),
            ignore_dirs: Vec::new(),
            clear_on_default_namespace: true,
        }
    }
}

impl Config {
    /// Validate configuration values.
    ///
    /// Glob patterns must compile and the tag name must be usable as a
    /// JavaScript function name.
    pub fn validate(&self) -> Result<()> {
        if !is_identifier(&self.tag_name) {
            bail!("Invalid 'tagName': \"{}\" is not an identifier", self.tag_name);
        }

        for pattern in &self.excludes {
            Pattern::new(pattern)
                .with_context(|| format!("Invalid glob pattern in 'excludes': \"{}\"", pattern))?;
        }

        // Includes without wildcards are literal directories, so `app/[locale]`
        // needs no escaping.
        for pattern in &self.includes {
            if pattern.contains('*') || pattern.contains('?') {
                Pattern::new(pattern).with_context(|| {
                    format!("Invalid glob pattern in 'includes': \"{}\"", pattern)
                })?;
            }
        }

        if self.collect.default_namespace.trim().is_empty() {
            bail!("'collect.defaultNamespace' must not be empty");
        }

        Ok(())
    }
}

pub fn default_config_json() -> Result<String> {
    let config = Config::default();
    serde_json::to_string_pretty(&config).context("Failed to generate default config.")
}

pub fn find_config_file(start_dir: &Path) -> Option<PathBuf> {
    let mut current = start_dir.to_path_buf();

    loop {
        let config_path = current.join(CONFIG_FILE_NAME);
        if config_path.exists() {
            return Some(config_path);
        }
        if current.join(".git").exists() {
            return None;
        }
        if !current.pop() {
            return None;
        }
    }
}

/// Result of loading configuration.
pub struct ConfigLoadResult {
    pub config: Config,
    /// True if config was loaded from a file, false if using defaults.
    pub from_file: bool,
}

pub fn load_config(start_dir: &Path) -> Result<ConfigLoadResult> {
    match find_config_file(start_dir) {
        Some(path) => {
            let content = fs::read_to_string(&path)
                .with_context(|| format!("Failed to read config file: {}", path.display()))?;
            let config: Config = serde_json::from_str(&content)
                .with_context(|| format!("Failed to parse config file: {}", path.display()))?;
            config.validate()?;
            Ok(ConfigLoadResult {
                config,
                from_file: true,
            })
        }
        None => Ok(ConfigLoadResult {
            config: Config::default(),
            from_file: false,
        }),
    }
}
