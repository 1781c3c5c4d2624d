//! Access-token availability (no remote call is made with it)

use super::trait_def::{Check, CheckContext, CheckResult};
use crate::api::auth::{CredentialSources, TOKEN_ENV};
use crate::core::config::PlayConfig;
use crate::core::error::PlayResult;

pub struct CredentialsCheck;

impl Check for CredentialsCheck {
  fn name(&self) -> &str {
    "credentials"
  }

  fn description(&self) -> &str {
    "Resolves an access token for the publishing API"
  }

  fn run(&self, ctx: &CheckContext) -> PlayResult<CheckResult> {
    // a broken play.toml is reported by the config check
    let api = PlayConfig::load(&ctx.root, ctx.config_path.as_deref())
      .map(|c| c.api)
      .unwrap_or_default();
    let token_file = api.token_file.as_ref().map(|p| ctx.root.join(p));

    let sources = CredentialSources::from_env(token_file.as_deref(), api.gcloud);
    let source = if sources.env_token.as_deref().is_some_and(|t| !t.trim().is_empty()) {
      TOKEN_ENV.to_string()
    } else if let Some(path) = &token_file {
      path.display().to_string()
    } else {
      "gcloud".to_string()
    };

    match sources.resolve() {
      Ok(_) => Ok(CheckResult::pass(self.name(), format!("Access token from {}", source))),
      Err(e) => Ok(CheckResult::error(self.name(), e.to_string(), e.help_message())),
    }
  }
}
