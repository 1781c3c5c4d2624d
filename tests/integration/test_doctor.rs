//! Tests for the `doctor` command

use crate::helpers::*;
use anyhow::Result;

fn results(stdout: &[u8]) -> Result<Vec<serde_json::Value>> {
  Ok(serde_json::from_slice(stdout)?)
}

#[test]
fn test_doctor_json_all_pass() -> Result<()> {
  let workspace = TestWorkspace::with_bundle()?;

  let output = run_play_rail(&workspace.path, &["doctor", "--json"], Some("token"))?;
  let results = results(&output.stdout)?;

  let names: Vec<&str> = results.iter().filter_map(|r| r["check_name"].as_str()).collect();
  assert_eq!(names, vec!["config", "credentials", "metadata"]);
  assert!(results.iter().all(|r| r["passed"] == true), "{:?}", results);
  assert_eq!(results[0]["details"]["package"], "com.example.app");
  Ok(())
}

#[test]
fn test_doctor_reports_missing_credentials() -> Result<()> {
  let workspace = TestWorkspace::with_bundle()?;

  let (code, _) = run_play_rail_failing(&workspace.path, &["doctor"], None)?;
  assert_eq!(code, 1);

  Ok(())
}

#[test]
fn test_doctor_without_config_fails_config_check() -> Result<()> {
  let workspace = TestWorkspace::new()?;

  let (code, _) = run_play_rail_failing(&workspace.path, &["doctor", "--check", "config"], Some("token"))?;
  assert_eq!(code, 1);
  Ok(())
}

#[test]
fn test_doctor_single_check() -> Result<()> {
  let workspace = TestWorkspace::with_bundle()?;
  workspace.add_locale("en-US", "Example", "Bug fixes")?;
  workspace.add_locale("de-DE", "Beispiel", "Fehlerbehebungen")?;
  workspace.write_config(
    r#"[app]
package = "com.example.app"

[artifacts]
bundle = "app/build/outputs/bundle/release/*.aab"

[metadata]
attach = true
dir = "metadata"

[api]
gcloud = false
"#,
  )?;

  let output = run_play_rail(&workspace.path, &["doctor", "--check", "metadata", "--json"], None)?;
  let results = results(&output.stdout)?;

  assert_eq!(results.len(), 1);
  assert_eq!(results[0]["details"]["listings"], serde_json::json!(["de-DE", "en-US"]));
  Ok(())
}

#[test]
fn test_doctor_unknown_check() -> Result<()> {
  let workspace = TestWorkspace::new()?;

  let (code, stderr) = run_play_rail_failing(&workspace.path, &["doctor", "--check", "dns"], None)?;
  assert_eq!(code, 1);
  assert!(stderr.contains("dns"), "stderr: {}", stderr);
  Ok(())
}
