//! Test helpers for integration tests

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use tempfile::TempDir;

/// Closed local port: any remote call fails fast with a connection error
pub const UNREACHABLE_API: &str = "http://127.0.0.1:9";

/// A scratch project directory with build outputs and metadata
pub struct TestWorkspace {
  _root: TempDir,
  pub path: PathBuf,
}

impl TestWorkspace {
  /// Create an empty workspace
  pub fn new() -> Result<Self> {
    let root = TempDir::new()?;
    let path = root.path().to_path_buf();
    Ok(Self { _root: root, path })
  }

  /// Workspace with one release bundle and a matching play.toml
  pub fn with_bundle() -> Result<Self> {
    let workspace = Self::new()?;
    workspace.write_file("app/build/outputs/bundle/release/app-release.aab", "aab")?;
    workspace.write_config(
      r#"[app]
package = "com.example.app"

[release]
track = "beta"

[artifacts]
bundle = "app/build/outputs/bundle/release/*.aab"

[api]
gcloud = false
timeout_secs = 5
"#,
    )?;
    Ok(workspace)
  }

  /// Write a file, creating parent directories
  pub fn write_file(&self, rel: &str, content: &str) -> Result<PathBuf> {
    let path = self.path.join(rel);
    if let Some(parent) = path.parent() {
      std::fs::create_dir_all(parent)?;
    }
    std::fs::write(&path, content).with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(path)
  }

  /// Write play.toml
  pub fn write_config(&self, content: &str) -> Result<()> {
    self.write_file("play.toml", content)?;
    Ok(())
  }

  /// Add a metadata tree for one locale
  pub fn add_locale(&self, language: &str, title: &str, notes: &str) -> Result<()> {
    self.write_file(&format!("metadata/{}/title.txt", language), title)?;
    self.write_file(&format!("metadata/{}/changelogs/default.txt", language), notes)?;
    Ok(())
  }
}

fn command(cwd: &Path, args: &[&str], token: Option<&str>) -> Command {
  let mut cmd = Command::new(env!("CARGO_BIN_EXE_play-rail"));
  cmd.current_dir(cwd).args(args).env_remove("PLAY_RAIL_TOKEN").env("PLAY_RAIL_LOG", "off");
  if let Some(token) = token {
    cmd.env("PLAY_RAIL_TOKEN", token);
  }
  cmd
}

/// Run play-rail and require success
pub fn run_play_rail(cwd: &Path, args: &[&str], token: Option<&str>) -> Result<Output> {
  let output = command(cwd, args, token).output().context("Failed to run play-rail")?;

  if !output.status.success() {
    let stderr = String::from_utf8_lossy(&output.stderr);
    let stdout = String::from_utf8_lossy(&output.stdout);
    anyhow::bail!(
      "play-rail command failed: play-rail {}\nstdout: {}\nstderr: {}",
      args.join(" "),
      stdout,
      stderr
    );
  }

  Ok(output)
}

/// Run play-rail and require failure; returns exit code and stderr
pub fn run_play_rail_failing(cwd: &Path, args: &[&str], token: Option<&str>) -> Result<(i32, String)> {
  let output = command(cwd, args, token).output().context("Failed to run play-rail")?;

  if output.status.success() {
    anyhow::bail!(
      "play-rail command unexpectedly succeeded: play-rail {}\nstdout: {}",
      args.join(" "),
      String::from_utf8_lossy(&output.stdout)
    );
  }

  let code = output.status.code().context("play-rail was terminated by a signal")?;
  Ok((code, String::from_utf8_lossy(&output.stderr).into_owned()))
}
