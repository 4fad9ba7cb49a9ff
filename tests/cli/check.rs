use anyhow::Result;
use pretty_assertions::assert_eq;

use crate::{CliTest, exit_code, stdout};

#[test]
fn test_check_clean_project() -> Result<()> {
    let test = CliTest::with_file(
        "src/app.ts",
        "lang({ a: 'A' }); lang({ b: 'B' }, { path: 'nested' });",
    )?;

    let output = test.run(&["check"])?;

    assert_eq!(exit_code(&output), Some(0));
    assert!(stdout(&output).contains("Checked 2 tags in 1 source file - no issues found"));
    assert!(!test.root().join("locales").exists());

    Ok(())
}

#[test]
fn test_check_reports_every_conflict() -> Result<()> {
    let test = CliTest::new()?;
    test.write_file(
        ".langtagrc.json",
        r#"{ "collect": { "onConflict": "stop" } }"#,
    )?;
    test.write_file("src/a.ts", "lang({ x: '1', y: '1' })")?;
    test.write_file("src/b.ts", "lang({ x: '2', y: { z: '2' } })")?;

    let output = test.run(&["check"])?;

    assert_eq!(exit_code(&output), Some(1));
    let out = stdout(&output);
    assert!(out.contains("conflict[path_overwrite]: common x"));
    assert!(out.contains("conflict[type_mismatch]: common y"));
    assert!(out.contains("2 problems (2 errors, 0 warnings)"));

    Ok(())
}

#[test]
fn test_check_reports_invalid_tags() -> Result<()> {
    let test = CliTest::with_file(
        "src/app.ts",
        "const label = lang({ title: someVariable });\nlang({ ok: 'OK' }, { path: `x.${y}` });\n",
    )?;

    let output = test.run(&["check"])?;

    assert_eq!(exit_code(&output), Some(1));
    let out = stdout(&output);
    assert!(out.contains("warning: invalid-param-1"));
    assert!(out.contains("--> src/app.ts:1:7"));
    assert!(out.contains("warning: invalid-param-2"));
    assert!(out.contains("--> src/app.ts:2:1"));
    assert!(out.contains("2 problems (0 errors, 2 warnings)"));

    Ok(())
}

#[test]
fn test_check_second_argument_position() -> Result<()> {
    let test = CliTest::new()?;
    test.write_file(
        ".langtagrc.json",
        r#"{ "tagName": "t", "translationArgPosition": 2 }"#,
    )?;
    test.write_file("src/app.ts", "t({ path: 'home' }, { title: 'Home' }); t({ path: 'x' });")?;

    let output = test.run(&["check"])?;

    assert_eq!(exit_code(&output), Some(1));
    assert!(stdout(&output).contains("warning: translations-not-found"));

    Ok(())
}
