//! Check registry and sequential runner

use super::config::ConfigCheck;
use super::credentials::CredentialsCheck;
use super::metadata::MetadataCheck;
use super::trait_def::{Check, CheckContext, CheckResult};
use crate::core::error::PlayResult;
use tracing::debug;

/// Runs registered checks in registration order
#[derive(Default)]
pub struct CheckRunner {
  checks: Vec<Box<dyn Check>>,
}

impl CheckRunner {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn register(&mut self, check: Box<dyn Check>) {
    self.checks.push(check);
  }

  /// Run every check; a check that errors internally is reported as failed
  pub fn run_all(&self, ctx: &CheckContext) -> Vec<CheckResult> {
    self
      .checks
      .iter()
      .map(|check| {
        debug!(check = check.name(), "running check");
        check.run(ctx).unwrap_or_else(|e| {
          CheckResult::error(check.name(), format!("{} failed: {}", check.description(), e), e.help_message())
        })
      })
      .collect()
  }

  /// Run a single check by name
  pub fn run_one(&self, name: &str, ctx: &CheckContext) -> Option<PlayResult<CheckResult>> {
    self.checks.iter().find(|c| c.name() == name).map(|c| c.run(ctx))
  }
}

/// Runner with every built-in check
pub fn create_default_runner() -> CheckRunner {
  let mut runner = CheckRunner::new();
  runner.register(Box::new(ConfigCheck));
  runner.register(Box::new(CredentialsCheck));
  runner.register(Box::new(MetadataCheck));
  runner
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::checks::trait_def::Severity;
  use crate::core::error::PlayError;
  use tempfile::TempDir;

  struct Failing;

  impl Check for Failing {
    fn name(&self) -> &str {
      "failing"
    }

    fn description(&self) -> &str {
      "Always fails"
    }

    fn run(&self, _ctx: &CheckContext) -> PlayResult<CheckResult> {
      Err(PlayError::with_help("boom", "do something else"))
    }
  }

  #[test]
  fn test_internal_error_becomes_failed_result() {
    let dir = TempDir::new().unwrap();
    let mut runner = CheckRunner::new();
    runner.register(Box::new(Failing));
    let results = runner.run_all(&CheckContext {
      root: dir.path().to_path_buf(),
      config_path: None,
    });
    assert_eq!(results.len(), 1);
    assert!(!results[0].passed);
    assert_eq!(results[0].severity, Severity::Error);
    assert_eq!(results[0].suggestion.as_deref(), Some("do something else"));
  }

  #[test]
  fn test_run_one_unknown_name() {
    let dir = TempDir::new().unwrap();
    let ctx = CheckContext {
      root: dir.path().to_path_buf(),
      config_path: None,
    };
    assert!(create_default_runner().run_one("nope", &ctx).is_none());
    assert!(create_default_runner().run_one("config", &ctx).is_some());
  }
}
