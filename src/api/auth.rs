//! Bearer-token resolution
//!
//! Sources are tried in order:
//! 1. `PLAY_RAIL_TOKEN` environment variable
//! 2. `[api] token_file` from play.toml
//! 3. `gcloud auth application-default print-access-token` (unless disabled)

use crate::core::error::{AuthError, PlayResult};
use std::fs;
use std::path::Path;
use std::process::Command;
use tracing::debug;

pub const TOKEN_ENV: &str = "PLAY_RAIL_TOKEN";

/// Where a token may come from
#[derive(Debug, Clone, Default)]
pub struct CredentialSources<'a> {
  pub env_token: Option<String>,
  pub token_file: Option<&'a Path>,
  pub allow_gcloud: bool,
}

impl<'a> CredentialSources<'a> {
  /// Sources for this process: environment plus configured file
  pub fn from_env(token_file: Option<&'a Path>, allow_gcloud: bool) -> Self {
    Self {
      env_token: std::env::var(TOKEN_ENV).ok(),
      token_file,
      allow_gcloud,
    }
  }

  /// Resolve a non-empty token or fail with an auth error
  pub fn resolve(&self) -> PlayResult<String> {
    if let Some(token) = self.env_token.as_deref().map(str::trim)
      && !token.is_empty()
    {
      debug!(source = TOKEN_ENV, "using access token");
      return Ok(token.to_string());
    }

    if let Some(path) = self.token_file {
      let content = fs::read_to_string(path).map_err(|e| AuthError::TokenFile {
        path: path.to_path_buf(),
        reason: e.to_string(),
      })?;
      let token = content.trim();
      if token.is_empty() {
        return Err(
          AuthError::TokenFile {
            path: path.to_path_buf(),
            reason: "file is empty".to_string(),
          }
          .into(),
        );
      }
      debug!(source = %path.display(), "using access token");
      return Ok(token.to_string());
    }

    if self.allow_gcloud {
      return gcloud_token();
    }

    Err(AuthError::NoCredentials.into())
  }
}

fn gcloud_token() -> PlayResult<String> {
  let output = Command::new("gcloud")
    .args(["auth", "application-default", "print-access-token"])
    .output()
    .map_err(|e| AuthError::Gcloud { reason: e.to_string() })?;

  if !output.status.success() {
    let stderr = String::from_utf8_lossy(&output.stderr);
    return Err(
      AuthError::Gcloud {
        reason: stderr.trim().to_string(),
      }
      .into(),
    );
  }

  let token = String::from_utf8_lossy(&output.stdout).trim().to_string();
  if token.is_empty() {
    return Err(
      AuthError::Gcloud {
        reason: "empty token".to_string(),
      }
      .into(),
    );
  }
  debug!(source = "gcloud", "using access token");
  Ok(token)
}
