//! play.toml validity: the file parses and resolves into a publish plan

use super::trait_def::{Check, CheckContext, CheckResult};
use crate::core::config::PlayConfig;
use crate::core::error::PlayResult;
use serde_json::json;

pub struct ConfigCheck;

impl Check for ConfigCheck {
  fn name(&self) -> &str {
    "config"
  }

  fn description(&self) -> &str {
    "Validates play.toml and resolves artifact patterns"
  }

  fn run(&self, ctx: &CheckContext) -> PlayResult<CheckResult> {
    let config = match PlayConfig::load(&ctx.root, ctx.config_path.as_deref()) {
      Ok(c) => c,
      Err(e) => return Ok(CheckResult::error(self.name(), e.to_string(), e.help_message())),
    };

    let plan = match config.resolve(&ctx.root) {
      Ok(plan) => plan,
      Err(e) => {
        return Ok(CheckResult::error(
          self.name(),
          e.to_string(),
          e.help_message().or(Some("Fix play.toml or pass the value as a flag".to_string())),
        ));
      }
    };

    let artifacts: Vec<String> = plan.artifacts.iter().map(|a| a.path.display().to_string()).collect();
    let message = if plan.is_listing_only() {
      format!("{} → {} (listing only)", plan.package, plan.track.track)
    } else {
      format!("{} → {} ({} artifact(s))", plan.package, plan.track.track, artifacts.len())
    };

    Ok(CheckResult::pass(self.name(), message).with_details(json!({
      "package": plan.package,
      "track": plan.track.track,
      "filter": plan.track.policy.to_string(),
      "artifacts": artifacts,
      "mapping_file": plan.mapping_file.map(|p| p.display().to_string()),
    })))
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use std::fs;
  use tempfile::TempDir;

  fn ctx(dir: &TempDir) -> CheckContext {
    CheckContext {
      root: dir.path().to_path_buf(),
      config_path: None,
    }
  }

  #[test]
  fn test_valid_config_passes() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("app.aab"), b"aab").unwrap();
    fs::write(
      dir.path().join("play.toml"),
      "[app]\npackage = \"com.example\"\n[artifacts]\nbundle = \"app.aab\"\n",
    )
    .unwrap();

    let result = ConfigCheck.run(&ctx(&dir)).unwrap();
    assert!(result.passed, "{}", result.message);
    assert!(result.message.contains("com.example"));
    assert_eq!(result.details.unwrap()["artifacts"].as_array().unwrap().len(), 1);
  }

  #[test]
  fn test_unresolved_pattern_fails() {
    let dir = TempDir::new().unwrap();
    fs::write(
      dir.path().join("play.toml"),
      "[app]\npackage = \"com.example\"\n[artifacts]\nbundle = \"build/*.aab\"\n",
    )
    .unwrap();

    let result = ConfigCheck.run(&ctx(&dir)).unwrap();
    assert!(result.is_blocking());
    assert!(result.message.contains("build/*.aab"));
  }
}
