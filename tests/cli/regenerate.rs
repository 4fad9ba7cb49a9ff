use anyhow::Result;
use pretty_assertions::assert_eq;

use crate::{CliTest, exit_code, stdout};

const LOGIN_FORM: &str = r#"// login form
export const labels = lang(
  { title: 'Log in' /* shown on top */, submit: 'Send' },
  { path: 'wrong', owner: 'team-auth' },
);
export const ok = lang({ ok: 'OK' });
"#;

#[test]
fn test_regenerate_dry_run_leaves_files() -> Result<()> {
    let test = CliTest::with_file("src/auth/login/Form.tsx", LOGIN_FORM)?;

    let output = test.run(&["regenerate-tags"])?;

    assert_eq!(exit_code(&output), Some(0));
    let out = stdout(&output);
    assert!(out.contains("--> src/auth/login/Form.tsx:2:14"));
    assert!(out.contains("- { path: 'wrong', owner: 'team-auth' }"));
    assert!(out.contains("+ { path: 'login', owner: 'team-auth', namespace: 'auth' }"));
    assert!(out.contains("Would update 2 tag(s) in 1 file(s)."));
    assert_eq!(test.read_file("src/auth/login/Form.tsx")?, LOGIN_FORM);

    Ok(())
}

#[test]
fn test_regenerate_apply_rewrites_configs() -> Result<()> {
    let test = CliTest::with_file("src/auth/login/Form.tsx", LOGIN_FORM)?;

    let output = test.run(&["regenerate-tags", "--apply"])?;

    assert_eq!(exit_code(&output), Some(0));
    assert!(stdout(&output).contains("Updated 2 tag(s) in 1 file(s)."));
    assert_eq!(
        test.read_file("src/auth/login/Form.tsx")?,
        r#"// login form
export const labels = lang(
  { title: 'Log in' /* shown on top */, submit: 'Send' },
  { path: 'login', owner: 'team-auth', namespace: 'auth' },
);
export const ok = lang({ ok: 'OK' }, { namespace: 'auth', path: 'login' });
"#
    );

    // Nothing left to do afterwards.
    let output = test.run(&["regenerate-tags"])?;
    assert!(stdout(&output).contains("All tag configs match their file locations"));

    Ok(())
}

#[test]
fn test_regenerate_then_collect() -> Result<()> {
    let test = CliTest::with_file("src/settings/Profile.tsx", "lang({ name: 'Name' })")?;

    test.run(&["regenerate-tags", "--apply"])?;
    let output = test.run(&["collect"])?;

    assert_eq!(exit_code(&output), Some(0));
    assert_eq!(
        test.read_json("locales/en/settings.json")?,
        serde_json::json!({"name": "Name"})
    );

    Ok(())
}
