use anyhow::Result;
use pretty_assertions::assert_eq;
use serde_json::json;

use crate::{CliTest, exit_code, stdout};

#[test]
fn test_collect_writes_namespace_files() -> Result<()> {
    let test = CliTest::with_file(
        "src/auth/Login.tsx",
        r#"
const labels = lang({ title: 'Log in', submit: 'Send' }, { namespace: 'auth', path: 'login' });
const common = lang({ ok: 'OK' });
"#,
    )?;

    let output = test.run(&["collect"])?;

    assert_eq!(exit_code(&output), Some(0));
    assert_eq!(
        test.read_json("locales/en/auth.json")?,
        json!({"login": {"title": "Log in", "submit": "Send"}})
    );
    assert_eq!(test.read_json("locales/en/common.json")?, json!({"ok": "OK"}));
    assert!(stdout(&output).contains("Created locales/en/auth.json"));

    Ok(())
}

#[test]
fn test_collect_is_idempotent() -> Result<()> {
    let test = CliTest::with_file("src/app.ts", "lang({ ok: 'OK' })")?;

    test.run(&["collect"])?;
    let first = test.read_file("locales/en/common.json")?;
    let output = test.run(&["collect"])?;

    assert_eq!(exit_code(&output), Some(0));
    assert_eq!(test.read_file("locales/en/common.json")?, first);
    assert!(stdout(&output).contains("(0 changed)"));

    Ok(())
}

#[test]
fn test_collect_aborts_on_conflicts_by_default() -> Result<()> {
    let test = CliTest::new()?;
    test.write_file("src/a.ts", "lang({ title: 'A' })")?;
    test.write_file("src/b.ts", "lang({ title: 'B' })")?;

    let output = test.run(&["collect"])?;

    assert_eq!(exit_code(&output), Some(1));
    assert!(!test.root().join("locales").exists());
    let out = stdout(&output);
    assert!(out.contains("conflict[path_overwrite]: common title"));
    assert!(out.contains("src/b.ts:1:1"));
    assert!(out.contains("kept: \"A\" from src/a.ts:1:1"));
    assert!(out.contains("no files were written"));

    Ok(())
}

#[test]
fn test_collect_keeps_first_value_when_conflicts_allowed() -> Result<()> {
    let test = CliTest::new()?;
    test.write_file(".langtagrc.json", r#"{ "collect": { "failOnConflicts": false } }"#)?;
    test.write_file("src/a.ts", "lang({ title: 'A' })")?;
    test.write_file("src/b.ts", "lang({ title: 'B' })")?;

    let output = test.run(&["collect"])?;

    assert_eq!(exit_code(&output), Some(0));
    assert!(stdout(&output).contains("conflict[path_overwrite]"));
    assert_eq!(test.read_json("locales/en/common.json")?, json!({"title": "A"}));

    Ok(())
}

#[test]
fn test_collect_dictionary() -> Result<()> {
    let test = CliTest::new()?;
    test.write_file(
        ".langtagrc.json",
        r#"{ "baseLanguageCode": "de", "collect": { "collector": "dictionary" } }"#,
    )?;
    test.write_file(
        "src/a.ts",
        "lang({ title: 'Anmelden' }, { namespace: 'auth', path: 'login' }); lang({ ok: 'OK' });",
    )?;

    let output = test.run(&["collect"])?;

    assert_eq!(exit_code(&output), Some(0));
    assert_eq!(
        test.read_json("locales/de.json")?,
        json!({"auth": {"login": {"title": "Anmelden"}}, "common": {"ok": "OK"}})
    );

    Ok(())
}

#[test]
fn test_collect_clean_removes_stale_namespaces() -> Result<()> {
    let test = CliTest::with_file("src/app.ts", "lang({ ok: 'OK' })")?;
    test.write_file("locales/en/removed.json", r#"{ "old": "x" }"#)?;

    test.run(&["collect"])?;
    assert!(test.root().join("locales/en/removed.json").exists());

    let output = test.run(&["collect", "--clean"])?;

    assert_eq!(exit_code(&output), Some(0));
    assert!(!test.root().join("locales/en/removed.json").exists());
    assert!(test.root().join("locales/en/common.json").exists());

    Ok(())
}

#[test]
fn test_collect_with_source_root() -> Result<()> {
    let test = CliTest::with_file("web/src/app.ts", "lang({ ok: 'OK' })")?;

    let output = test.run(&["collect", "--source-root", "web"])?;

    assert_eq!(exit_code(&output), Some(0));
    assert_eq!(test.read_json("web/locales/en/common.json")?, json!({"ok": "OK"}));

    Ok(())
}

#[test]
fn test_collect_invalid_config() -> Result<()> {
    let test = CliTest::with_file(".langtagrc.json", r#"{ "translationArgPosition": 3 }"#)?;

    let output = test.run(&["collect"])?;

    assert_eq!(exit_code(&output), Some(2));
    assert!(String::from_utf8_lossy(&output.stderr).contains("Failed to parse config file"));

    Ok(())
}
