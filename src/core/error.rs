//! Error types for play-rail with contextual messages and exit codes
//!
//! Every failure of a publish run is reported as a single `PlayError`. Remote
//! failures carry the step that failed and the identifiers needed to find the
//! entity involved (package, edit id, track, version code, local path) so the
//! message can be diagnosed without server-side logs.

use crate::api::ApiError;
use std::fmt;
use std::io;
use std::path::PathBuf;

/// Exit codes for play-rail
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitCode {
  /// User error (config, invalid args, missing files)
  User = 1,
  /// System error (I/O)
  System = 2,
  /// Remote call rejected or failed
  Remote = 3,
  /// Credentials could not be resolved
  Auth = 4,
}

impl ExitCode {
  /// Convert to i32 for process exit
  pub fn as_i32(self) -> i32 {
    self as i32
  }
}

/// Main error type for play-rail
#[derive(Debug)]
pub enum PlayError {
  /// Configuration file errors
  Config(ConfigError),

  /// Missing or contradictory run parameters
  Input(InputError),

  /// Credential / authorization failures
  Auth(AuthError),

  /// A remote step of the edit transaction failed
  Remote(RemoteError),

  /// I/O errors
  Io(io::Error),

  /// Generic error with message and optional context
  Message {
    message: String,
    context: Option<String>,
    help: Option<String>,
  },
}

impl PlayError {
  /// Create a simple error message
  pub fn message(msg: impl Into<String>) -> Self {
    PlayError::Message {
      message: msg.into(),
      context: None,
      help: None,
    }
  }

  /// Create an error with help text
  pub fn with_help(msg: impl Into<String>, help: impl Into<String>) -> Self {
    PlayError::Message {
      message: msg.into(),
      context: None,
      help: Some(help.into()),
    }
  }

  /// Add context to an existing error
  pub fn context(self, ctx: impl Into<String>) -> Self {
    let ctx_str = ctx.into();
    match self {
      PlayError::Message { message, context, help } => PlayError::Message {
        message,
        context: Some(context.map(|c| format!("{}\n{}", ctx_str, c)).unwrap_or(ctx_str)),
        help,
      },
      PlayError::Io(err) => PlayError::Message {
        message: format!("I/O error: {}", err),
        context: Some(ctx_str),
        help: None,
      },
      _ => self,
    }
  }

  /// Get the appropriate exit code for this error
  pub fn exit_code(&self) -> ExitCode {
    match self {
      PlayError::Config(_) => ExitCode::User,
      PlayError::Input(_) => ExitCode::User,
      PlayError::Auth(_) => ExitCode::Auth,
      PlayError::Remote(_) => ExitCode::Remote,
      PlayError::Io(_) => ExitCode::System,
      PlayError::Message { .. } => ExitCode::User,
    }
  }

  /// Get contextual help message for this error
  pub fn help_message(&self) -> Option<String> {
    match self {
      PlayError::Config(e) => e.help_message(),
      PlayError::Input(e) => e.help_message(),
      PlayError::Auth(e) => e.help_message(),
      PlayError::Remote(e) => e.help_message(),
      PlayError::Message { help, .. } => help.clone(),
      PlayError::Io(_) => None,
    }
  }

  /// Name of the remote step that failed, if this is a remote failure
  pub fn failed_step(&self) -> Option<&'static str> {
    match self {
      PlayError::Remote(e) => Some(e.step()),
      _ => None,
    }
  }
}

impl fmt::Display for PlayError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      PlayError::Config(e) => write!(f, "{}", e),
      PlayError::Input(e) => write!(f, "{}", e),
      PlayError::Auth(e) => write!(f, "{}", e),
      PlayError::Remote(e) => write!(f, "{}", e),
      PlayError::Io(e) => write!(f, "I/O error: {}", e),
      PlayError::Message { message, context, .. } => {
        write!(f, "{}", message)?;
        if let Some(ctx) = context {
          write!(f, "\n{}", ctx)?;
        }
        Ok(())
      }
    }
  }
}

impl std::error::Error for PlayError {
  fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
    match self {
      PlayError::Io(e) => Some(e),
      PlayError::Remote(e) => Some(e.cause()),
      _ => None,
    }
  }
}

impl From<io::Error> for PlayError {
  fn from(err: io::Error) -> Self {
    PlayError::Io(err)
  }
}

impl From<String> for PlayError {
  fn from(msg: String) -> Self {
    PlayError::message(msg)
  }
}

impl From<&str> for PlayError {
  fn from(msg: &str) -> Self {
    PlayError::message(msg)
  }
}

impl From<ConfigError> for PlayError {
  fn from(err: ConfigError) -> Self {
    PlayError::Config(err)
  }
}

impl From<InputError> for PlayError {
  fn from(err: InputError) -> Self {
    PlayError::Input(err)
  }
}

impl From<AuthError> for PlayError {
  fn from(err: AuthError) -> Self {
    PlayError::Auth(err)
  }
}

impl From<RemoteError> for PlayError {
  fn from(err: RemoteError) -> Self {
    PlayError::Remote(err)
  }
}

impl From<toml_edit::de::Error> for PlayError {
  fn from(err: toml_edit::de::Error) -> Self {
    PlayError::message(format!("TOML deserialization error: {}", err))
  }
}

impl From<serde_json::Error> for PlayError {
  fn from(err: serde_json::Error) -> Self {
    PlayError::message(format!("JSON error: {}", err))
  }
}

impl From<std::string::FromUtf8Error> for PlayError {
  fn from(err: std::string::FromUtf8Error) -> Self {
    PlayError::message(format!("UTF-8 conversion error: {}", err))
  }
}

/// Configuration file errors
#[derive(Debug)]
pub enum ConfigError {
  /// Explicitly requested config file does not exist
  NotFound { path: PathBuf },

  /// Config file could not be parsed
  Invalid { path: PathBuf, reason: String },
}

impl ConfigError {
  fn help_message(&self) -> Option<String> {
    match self {
      ConfigError::NotFound { .. } => Some(
        "play-rail looks for play.toml, .play.toml or .config/play.toml. Pass --config to point elsewhere.".to_string(),
      ),
      ConfigError::Invalid { .. } => Some("Run `play-rail doctor` to validate the configuration.".to_string()),
    }
  }
}

impl fmt::Display for ConfigError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      ConfigError::NotFound { path } => write!(f, "Configuration file not found: {}", path.display()),
      ConfigError::Invalid { path, reason } => {
        write!(f, "Invalid configuration in {}: {}", path.display(), reason)
      }
    }
  }
}

/// Missing or contradictory run parameters
#[derive(Debug)]
pub enum InputError {
  /// Required field not supplied by flags or config
  MissingField { field: String },

  /// Expansion attachment requested for an artifact slot with no artifact
  ExpansionWithoutArtifact { slot: String },

  /// Glob pattern matched no files
  NoMatch { pattern: String },

  /// Glob pattern matched more than one file where exactly one is required
  AmbiguousMatch { pattern: String, matches: Vec<PathBuf> },

  /// Glob pattern could not be parsed
  InvalidPattern { pattern: String, reason: String },

  /// Local file does not exist or is not readable
  FileNotFound { path: PathBuf },

  /// Numeric parameter outside its accepted range
  OutOfRange {
    field: String,
    value: String,
    range: String,
  },

  /// Version-code filter values could not be parsed
  InvalidFilter { value: String, reason: String },

  /// Parameters that cannot be combined
  Conflict { message: String },
}

impl InputError {
  fn help_message(&self) -> Option<String> {
    match self {
      InputError::ExpansionWithoutArtifact { slot } => Some(format!(
        "Either supply {} artifacts or drop the expansion-file switch for them.",
        slot
      )),
      InputError::NoMatch { .. } => Some("Check the working directory and the artifact path or glob.".to_string()),
      InputError::AmbiguousMatch { .. } => {
        Some("Narrow the pattern, or list the extra files as additional artifacts.".to_string())
      }
      InputError::InvalidFilter { .. } => Some(
        "Exclude lists are comma-separated positive integers; expressions are regular expressions.".to_string(),
      ),
      _ => None,
    }
  }
}

impl fmt::Display for InputError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      InputError::MissingField { field } => write!(f, "Missing required parameter: {}", field),
      InputError::ExpansionWithoutArtifact { slot } => {
        write!(f, "Expansion file requested for {} artifacts, but none were supplied", slot)
      }
      InputError::NoMatch { pattern } => write!(f, "No files match '{}'", pattern),
      InputError::AmbiguousMatch { pattern, matches } => {
        write!(f, "Pattern '{}' matched {} files where one was expected:", pattern, matches.len())?;
        for m in matches {
          write!(f, "\n  {}", m.display())?;
        }
        Ok(())
      }
      InputError::InvalidPattern { pattern, reason } => write!(f, "Invalid pattern '{}': {}", pattern, reason),
      InputError::FileNotFound { path } => write!(f, "File not found or not readable: {}", path.display()),
      InputError::OutOfRange { field, value, range } => {
        write!(f, "{} must be in {} (got {})", field, range, value)
      }
      InputError::InvalidFilter { value, reason } => {
        write!(f, "Invalid version-code filter '{}': {}", value, reason)
      }
      InputError::Conflict { message } => write!(f, "Conflicting parameters: {}", message),
    }
  }
}

/// Credential resolution errors
#[derive(Debug)]
pub enum AuthError {
  /// No credential source produced a token
  NoCredentials,

  /// Token file was configured but unusable
  TokenFile { path: PathBuf, reason: String },

  /// `gcloud` failed to print an access token
  Gcloud { reason: String },
}

impl AuthError {
  fn help_message(&self) -> Option<String> {
    match self {
      AuthError::NoCredentials | AuthError::Gcloud { .. } => Some(
        "Set PLAY_RAIL_TOKEN, configure [api] token_file in play.toml, or run `gcloud auth application-default login`."
          .to_string(),
      ),
      AuthError::TokenFile { path, .. } => Some(format!("Check that {} exists and holds a token", path.display())),
    }
  }
}

impl fmt::Display for AuthError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      AuthError::NoCredentials => write!(f, "No Google Play credentials found"),
      AuthError::TokenFile { path, reason } => {
        write!(f, "Failed to read token file {}: {}", path.display(), reason)
      }
      AuthError::Gcloud { reason } => write!(f, "gcloud could not provide an access token: {}", reason),
    }
  }
}

/// Remote step failures; each wraps the underlying API error
#[derive(Debug)]
pub enum RemoteError {
  EditOpen {
    package: String,
    source: ApiError,
  },
  ArtifactUpload {
    package: String,
    edit_id: String,
    path: PathBuf,
    source: ApiError,
  },
  ExpansionUpload {
    package: String,
    edit_id: String,
    version_code: u64,
    path: PathBuf,
    source: ApiError,
  },
  MappingUpload {
    package: String,
    edit_id: String,
    version_code: u64,
    path: PathBuf,
    source: ApiError,
  },
  ListingUpdate {
    package: String,
    edit_id: String,
    language: String,
    source: ApiError,
  },
  TrackFetch {
    package: String,
    edit_id: String,
    track: String,
    source: ApiError,
  },
  TrackUpdate {
    package: String,
    edit_id: String,
    track: String,
    version_codes: Vec<u64>,
    source: ApiError,
  },
  Commit {
    package: String,
    edit_id: String,
    source: ApiError,
  },
}

impl RemoteError {
  /// Operation name of the failed step
  pub fn step(&self) -> &'static str {
    match self {
      RemoteError::EditOpen { .. } => "open edit",
      RemoteError::ArtifactUpload { .. } => "upload artifact",
      RemoteError::ExpansionUpload { .. } => "upload expansion file",
      RemoteError::MappingUpload { .. } => "upload mapping file",
      RemoteError::ListingUpdate { .. } => "update listing",
      RemoteError::TrackFetch { .. } => "fetch track",
      RemoteError::TrackUpdate { .. } => "update track",
      RemoteError::Commit { .. } => "commit edit",
    }
  }

  /// The underlying API failure
  pub fn cause(&self) -> &ApiError {
    match self {
      RemoteError::EditOpen { source, .. }
      | RemoteError::ArtifactUpload { source, .. }
      | RemoteError::ExpansionUpload { source, .. }
      | RemoteError::MappingUpload { source, .. }
      | RemoteError::ListingUpdate { source, .. }
      | RemoteError::TrackFetch { source, .. }
      | RemoteError::TrackUpdate { source, .. }
      | RemoteError::Commit { source, .. } => source,
    }
  }

  fn help_message(&self) -> Option<String> {
    let status = self.cause().status();
    match (self, status) {
      (_, Some(401)) | (_, Some(403)) => Some(
        "The token was rejected. Check that the service account has release permissions for this app.".to_string(),
      ),
      (RemoteError::EditOpen { package, .. }, Some(404)) => Some(format!(
        "Package '{}' is unknown to Google Play. The first release must be uploaded through the Play Console.",
        package
      )),
      (RemoteError::TrackUpdate { .. }, _) => Some(
        "The edit was not committed. Check rollout fraction, priority and that every version code belongs to this edit."
          .to_string(),
      ),
      (RemoteError::Commit { .. }, _) => {
        Some("Nothing was published. The edit expires on its own; re-run once the cause is fixed.".to_string())
      }
      _ => None,
    }
  }
}

impl fmt::Display for RemoteError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      RemoteError::EditOpen { package, source } => {
        write!(f, "Failed to open edit for {}: {}", package, source)
      }
      RemoteError::ArtifactUpload {
        package,
        edit_id,
        path,
        source,
      } => write!(
        f,
        "Failed to upload {} to {} (edit {}): {}",
        path.display(),
        package,
        edit_id,
        source
      ),
      RemoteError::ExpansionUpload {
        package,
        edit_id,
        version_code,
        path,
        source,
      } => write!(
        f,
        "Failed to upload expansion file {} for version code {} of {} (edit {}): {}",
        path.display(),
        version_code,
        package,
        edit_id,
        source
      ),
      RemoteError::MappingUpload {
        package,
        edit_id,
        version_code,
        path,
        source,
      } => write!(
        f,
        "Failed to upload mapping file {} for version code {} of {} (edit {}): {}",
        path.display(),
        version_code,
        package,
        edit_id,
        source
      ),
      RemoteError::ListingUpdate {
        package,
        edit_id,
        language,
        source,
      } => write!(
        f,
        "Failed to update {} listing of {} (edit {}): {}",
        language, package, edit_id, source
      ),
      RemoteError::TrackFetch {
        package,
        edit_id,
        track,
        source,
      } => write!(
        f,
        "Failed to fetch track '{}' of {} (edit {}): {}",
        track, package, edit_id, source
      ),
      RemoteError::TrackUpdate {
        package,
        edit_id,
        track,
        version_codes,
        source,
      } => write!(
        f,
        "Failed to update track '{}' of {} with version codes {:?} (edit {}): {}",
        track, package, version_codes, edit_id, source
      ),
      RemoteError::Commit {
        package,
        edit_id,
        source,
      } => write!(f, "Failed to commit edit {} for {}: {}", edit_id, package, source),
    }
  }
}

/// Result type alias for play-rail
pub type PlayResult<T> = Result<T, PlayError>;

/// Helper trait to add context to Results
pub trait ResultExt<T> {
  /// Add context to an error result
  fn context(self, ctx: impl Into<String>) -> PlayResult<T>;

  /// Add context using a closure (lazy evaluation)
  fn with_context<F>(self, f: F) -> PlayResult<T>
  where
    F: FnOnce() -> String;
}

impl<T, E> ResultExt<T> for Result<T, E>
where
  E: Into<PlayError>,
{
  fn context(self, ctx: impl Into<String>) -> PlayResult<T> {
    self.map_err(|e| e.into().context(ctx))
  }

  fn with_context<F>(self, f: F) -> PlayResult<T>
  where
    F: FnOnce() -> String,
  {
    self.map_err(|e| e.into().context(f()))
  }
}

/// Pretty-print an error to stderr with help text
pub fn print_error(error: &PlayError) {
  eprintln!("\n❌ {}\n", error);

  if let Some(help) = error.help_message() {
    eprintln!("💡 Help: {}\n", help);
  }
}
