//! Tests for the `publish` command

use crate::helpers::*;
use anyhow::Result;

#[test]
fn test_missing_credentials_exit_before_edit() -> Result<()> {
  let workspace = TestWorkspace::with_bundle()?;

  let (code, stderr) = run_play_rail_failing(&workspace.path, &["publish", "--api-base", UNREACHABLE_API], None)?;

  assert_eq!(code, 4, "stderr: {}", stderr);
  assert!(stderr.contains("PLAY_RAIL_TOKEN"), "stderr: {}", stderr);
  Ok(())
}

#[test]
fn test_empty_token_file_is_auth_failure() -> Result<()> {
  let workspace = TestWorkspace::with_bundle()?;
  workspace.write_file("token.txt", "  \n")?;

  let (code, _) = run_play_rail_failing(&workspace.path, &["publish", "--token-file", "token.txt"], None)?;

  assert_eq!(code, 4);
  Ok(())
}

#[test]
fn test_unresolved_pattern_is_input_error() -> Result<()> {
  let workspace = TestWorkspace::with_bundle()?;

  let (code, stderr) = run_play_rail_failing(
    &workspace.path,
    &["publish", "--bundle", "build/missing/*.aab"],
    Some("token"),
  )?;

  assert_eq!(code, 1);
  assert!(stderr.contains("build/missing/*.aab"), "stderr: {}", stderr);
  Ok(())
}

#[test]
fn test_input_errors_win_over_missing_credentials() -> Result<()> {
  let workspace = TestWorkspace::with_bundle()?;

  // no token either: the input problem is reported first
  let (code, _) = run_play_rail_failing(&workspace.path, &["publish", "--rollout", "1.5"], None)?;

  assert_eq!(code, 1);
  Ok(())
}

#[test]
fn test_expansion_without_apk_is_rejected() -> Result<()> {
  let workspace = TestWorkspace::with_bundle()?;

  let (code, stderr) = run_play_rail_failing(&workspace.path, &["publish", "--apk-expansion"], Some("token"))?;

  assert_eq!(code, 1);
  assert!(stderr.contains("expansion"), "stderr: {}", stderr);
  Ok(())
}

#[test]
fn test_out_of_range_priority() -> Result<()> {
  let workspace = TestWorkspace::with_bundle()?;

  let (code, stderr) = run_play_rail_failing(&workspace.path, &["publish", "--priority", "9"], Some("token"))?;

  assert_eq!(code, 1);
  assert!(stderr.contains("update_priority"), "stderr: {}", stderr);
  Ok(())
}

#[test]
fn test_invalid_filter_values() -> Result<()> {
  let workspace = TestWorkspace::with_bundle()?;

  let (code, _) = run_play_rail_failing(
    &workspace.path,
    &["publish", "--filter", "list", "--filter-value", "12,abc"],
    Some("token"),
  )?;
  assert_eq!(code, 1);

  let (code, _) = run_play_rail_failing(
    &workspace.path,
    &["publish", "--filter", "expression", "--filter-value", "(1"],
    Some("token"),
  )?;
  assert_eq!(code, 1);

  let (code, _) = run_play_rail_failing(&workspace.path, &["publish", "--filter", "list"], Some("token"))?;
  assert_eq!(code, 1);
  Ok(())
}

#[test]
fn test_missing_explicit_config() -> Result<()> {
  let workspace = TestWorkspace::new()?;

  let (code, stderr) = run_play_rail_failing(&workspace.path, &["publish", "--config", "nope.toml"], Some("token"))?;

  assert_eq!(code, 1);
  assert!(stderr.contains("nope.toml"), "stderr: {}", stderr);
  Ok(())
}

#[test]
fn test_remote_failure_names_step_and_package() -> Result<()> {
  let workspace = TestWorkspace::with_bundle()?;

  let (code, stderr) = run_play_rail_failing(
    &workspace.path,
    &["publish", "--api-base", UNREACHABLE_API, "--json"],
    Some("token"),
  )?;

  assert_eq!(code, 3, "stderr: {}", stderr);
  assert!(stderr.contains("open edit"), "stderr: {}", stderr);
  assert!(stderr.contains("com.example.app"), "stderr: {}", stderr);
  Ok(())
}

#[test]
fn test_listing_only_requires_metadata() -> Result<()> {
  let workspace = TestWorkspace::new()?;
  workspace.write_config("[app]\npackage = \"com.example.app\"\n[api]\ngcloud = false\n")?;

  let (code, _) = run_play_rail_failing(&workspace.path, &["publish", "--listing-only"], Some("token"))?;
  assert_eq!(code, 1);

  // with metadata, validation passes and the run reaches the remote
  workspace.add_locale("en-US", "Example", "Fixes")?;
  let (code, stderr) = run_play_rail_failing(
    &workspace.path,
    &[
      "publish",
      "--listing-only",
      "--metadata",
      "--metadata-dir",
      "metadata",
      "--api-base",
      UNREACHABLE_API,
      "--timeout",
      "5",
    ],
    Some("token"),
  )?;
  assert_eq!(code, 3, "stderr: {}", stderr);
  Ok(())
}
