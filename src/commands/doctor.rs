//! `play-rail doctor`: local diagnostics before a publish run

use crate::checks::{CheckContext, CheckResult, Severity, create_default_runner};
use crate::core::error::{PlayError, PlayResult, ResultExt};
use std::env;
use std::path::PathBuf;

/// Run the doctor command; fails when any check reports an error
pub fn run_doctor(config: Option<PathBuf>, check: Option<String>, json: bool) -> PlayResult<()> {
  let ctx = CheckContext {
    root: env::current_dir().context("Failed to get current directory")?,
    config_path: config,
  };

  let runner = create_default_runner();
  let results = match &check {
    Some(name) => match runner.run_one(name, &ctx) {
      Some(result) => vec![result?],
      None => {
        return Err(PlayError::with_help(
          format!("Unknown check '{}'", name),
          "Available checks: config, credentials, metadata",
        ));
      }
    },
    None => runner.run_all(&ctx),
  };

  if json {
    println!(
      "{}",
      serde_json::to_string_pretty(&results).map_err(|e| PlayError::message(format!("Serialization error: {}", e)))?
    );
  } else {
    print_results(&results);
  }

  let failed = results.iter().filter(|r| r.is_blocking()).count();
  if failed > 0 {
    return Err(PlayError::with_help(
      format!("{} check(s) failed", failed),
      "Fix the errors above before running `play-rail publish`",
    ));
  }

  Ok(())
}

fn print_results(results: &[CheckResult]) {
  println!("🩺 play-rail doctor\n");

  for result in results {
    let icon = match (result.passed, result.severity) {
      (true, _) => "✅",
      (false, Severity::Warning) => "⚠️ ",
      (false, _) => "❌",
    };
    println!("{} {}: {}", icon, result.check_name, result.message);
    if let Some(suggestion) = &result.suggestion {
      println!("   💡 {}", suggestion);
    }
  }

  let passed = results.iter().filter(|r| r.passed).count();
  println!("\n{}/{} checks passed", passed, results.len());
}
