//! Remote client for the Google Play Developer API
//!
//! The publishing engine only talks to Google Play through the [`PlayApi`]
//! trait. Every call after `open_edit` is scoped to one [`EditRef`], which
//! carries the package name and the server-assigned edit id.
//!
//! - **types**: wire types (edits, tracks, releases, listings)
//! - **http**: reqwest implementation against `androidpublisher/v3`
//! - **auth**: bearer-token resolution

pub mod auth;
pub mod http;
pub mod types;

#[cfg(test)]
pub mod fake;

use async_trait::async_trait;
use std::path::Path;
use thiserror::Error;

pub use http::HttpPlayApi;
pub use types::{AppEdit, ArtifactKind, ExpansionFile, Listing, LocalizedText, ReleaseStatus, Track, TrackRelease};

/// Server-assigned version code of one uploaded artifact
pub type VersionCode = u64;

/// Request-scoped parameters attached to every call inside an edit
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditRef {
  pub package: String,
  pub edit_id: String,
}

impl EditRef {
  pub fn new(package: impl Into<String>, edit_id: impl Into<String>) -> Self {
    Self {
      package: package.into(),
      edit_id: edit_id.into(),
    }
  }
}

/// Failures of a single remote call
#[derive(Debug, Error)]
pub enum ApiError {
  #[error("HTTP error: {0}")]
  Http(#[from] reqwest::Error),

  #[error("HTTP {status}: {message}")]
  Status { status: u16, message: String },

  #[error("unexpected response body: {0}")]
  Decode(#[from] serde_json::Error),

  #[error("I/O error: {0}")]
  Io(#[from] std::io::Error),
}

impl ApiError {
  /// HTTP status code, when the server answered
  pub fn status(&self) -> Option<u16> {
    match self {
      ApiError::Status { status, .. } => Some(*status),
      ApiError::Http(err) => err.status().map(|s| s.as_u16()),
      _ => None,
    }
  }
}

pub type ApiResult<T> = Result<T, ApiError>;

/// Calls the edit transaction is built from
#[async_trait]
pub trait PlayApi: Send + Sync {
  /// Open a new edit for `package`
  async fn open_edit(&self, package: &str) -> ApiResult<AppEdit>;

  /// Upload a package or bundle; returns the version code the server assigned
  async fn upload_artifact(&self, edit: &EditRef, kind: ArtifactKind, path: &Path) -> ApiResult<VersionCode>;

  /// Upload `path` as the main expansion file of `version_code`
  async fn upload_expansion_file(
    &self,
    edit: &EditRef,
    version_code: VersionCode,
    path: &Path,
  ) -> ApiResult<ExpansionFile>;

  /// Upload a ProGuard/R8 mapping file for `version_code`
  async fn upload_mapping(&self, edit: &EditRef, version_code: VersionCode, path: &Path) -> ApiResult<()>;

  async fn get_track(&self, edit: &EditRef, track: &str) -> ApiResult<Track>;

  async fn update_track(&self, edit: &EditRef, track: &Track) -> ApiResult<Track>;

  async fn update_listing(&self, edit: &EditRef, listing: &Listing) -> ApiResult<Listing>;

  /// Commit the edit. With `changes_not_sent_for_review` the changes are held back from review.
  async fn commit(&self, edit: &EditRef, changes_not_sent_for_review: bool) -> ApiResult<AppEdit>;
}
