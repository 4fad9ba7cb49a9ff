use std::fs;

use anyhow::{Context, Result};
use colored::Colorize;

use super::super::{args::CommonArgs, exit_status::ExitStatus, report::SUCCESS_MARK};
use crate::config::{CONFIG_FILE_NAME, default_config_json};

/// Write the default config into the project root. Never overwrites.
pub fn init(common: &CommonArgs) -> Result<ExitStatus> {
    let root_dir = common.source_root.clone().unwrap_or_else(|| ".".into());
    let config_path = root_dir.join(CONFIG_FILE_NAME);

    if config_path.exists() {
        eprintln!("Error: {} already exists", CONFIG_FILE_NAME);
        return Ok(ExitStatus::Failure);
    }

    fs::write(&config_path, format!("{}\n", default_config_json()?))
        .with_context(|| format!("Failed to write file: {}", config_path.display()))?;
    println!(
        "{} {}",
        SUCCESS_MARK.green(),
        format!("Created {}", CONFIG_FILE_NAME).green()
    );

    Ok(ExitStatus::Success)
}
