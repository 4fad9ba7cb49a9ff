use anyhow::{Context, Result};
use pretty_assertions::assert_eq;
use serde_json::Value;

use crate::{CliTest, exit_code, stdout};

/// Validates config file structure and default values.
fn assert_config_content(content: &str) -> Result<()> {
    let parsed: Value = serde_json::from_str(content).context("Config should be valid JSON")?;

    assert_eq!(parsed["tagName"], "lang");
    assert_eq!(parsed["translationArgPosition"], 1);
    assert_eq!(parsed["collect"]["collector"], "namespace");
    assert_eq!(parsed["generation"]["rootDirs"][0], "src");

    assert!(
        content.contains("  "),
        "Config should use 2-space indentation"
    );

    Ok(())
}

#[test]
fn test_init_creates_config() -> Result<()> {
    let test = CliTest::new()?;

    let output = test.run(&["init"])?;

    assert_eq!(exit_code(&output), Some(0));
    assert!(stdout(&output).contains("Created .langtagrc.json"));
    assert_config_content(&test.read_file(".langtagrc.json")?)?;

    Ok(())
}

#[test]
fn test_init_fails_if_exists() -> Result<()> {
    let test = CliTest::with_file(".langtagrc.json", "{}")?;

    let output = test.run(&["init"])?;

    assert_eq!(exit_code(&output), Some(1));
    assert!(String::from_utf8_lossy(&output.stderr).contains("already exists"));
    assert_eq!(test.read_file(".langtagrc.json")?, "{}");

    Ok(())
}

#[test]
fn test_init_config_is_immediately_usable() -> Result<()> {
    let test = CliTest::new()?;
    test.run(&["init"])?;
    test.write_file("src/app.ts", "lang({ ok: 'OK' })")?;

    let output = test.run(&["check"])?;

    assert!(
        output.status.success(),
        "Check command should work with initialized config. stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );

    Ok(())
}

#[test]
fn test_no_command_prints_help() -> Result<()> {
    let test = CliTest::new()?;

    let output = test.run(&[])?;

    assert_eq!(exit_code(&output), Some(0));
    assert!(stdout(&output).contains("collect"));

    Ok(())
}
