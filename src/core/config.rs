//! play.toml configuration
//!
//! Every field can also be given on the command line; flags win over the
//! file. The merged configuration is turned into a [`PublishPlan`] by
//! [`PlayConfig::resolve`], which performs all input validation before any
//! remote call is made.
//!
//! ```toml
//! [app]
//! package = "com.example.app"
//!
//! [release]
//! track = "beta"
//! rollout_fraction = 0.2
//! update_priority = 3
//! filter = "list"          # all | list | expression
//! filter_value = "101,102"
//!
//! [artifacts]
//! bundle = "app/build/outputs/bundle/release/*.aab"
//! mapping = "app/build/outputs/mapping/release/mapping.txt"
//!
//! [metadata]
//! attach = true
//! dir = "fastlane/metadata/android"
//! ```

use crate::api::http::DEFAULT_API_BASE;
use crate::core::error::{ConfigError, InputError, PlayError, PlayResult};
use crate::edit::{FilterKind, FilterPolicy, PublishPlan, TrackRequest};
use crate::inputs::artifacts::{ArtifactSlot, resolve_artifacts, resolve_pattern};
use crate::inputs::notes::{DEFAULT_LANGUAGE, NotesSource};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const DEFAULT_TRACK: &str = "internal";
pub const DEFAULT_TIMEOUT_SECS: u64 = 300;

/// Configuration for play-rail
/// Searched in order: play.toml, .play.toml, .config/play.toml
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayConfig {
  pub app: AppConfig,
  pub release: ReleaseConfig,
  pub artifacts: ArtifactsConfig,
  pub metadata: MetadataConfig,
  pub api: ApiConfig,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
  /// Application id, e.g. `com.example.app`
  pub package: Option<String>,
}

/// Release settings for the track update and the commit
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ReleaseConfig {
  /// Track name (default: internal)
  pub track: Option<String>,
  /// 0.0–1.0 (default: 1.0)
  pub rollout_fraction: Option<f64>,
  /// 0–5 (default: 0)
  pub update_priority: Option<i64>,
  pub filter: FilterKind,
  /// Comma-separated codes for `list`, a regular expression for `expression`
  pub filter_value: Option<String>,
  pub release_name: Option<String>,
  /// Create the release as a draft
  pub draft: bool,
  /// Commit without sending the changes for review
  pub changes_not_sent_for_review: bool,
}

/// Artifact patterns (globs, relative to the working directory)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ArtifactsConfig {
  pub apk: Option<String>,
  pub additional_apks: Vec<String>,
  pub bundle: Option<String>,
  pub additional_bundles: Vec<String>,
  /// Upload an expansion file for the primary apk
  pub apk_expansion: bool,
  /// Upload expansion files for additional apks
  pub additional_apk_expansion: bool,
  /// ProGuard/R8 mapping file
  pub mapping: Option<String>,
  /// Publish store metadata only, no binaries
  pub listing_only: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct MetadataConfig {
  /// Push listings and release notes from `dir`
  pub attach: bool,
  /// Per-locale metadata tree
  pub dir: Option<PathBuf>,
  /// Flat release-notes file, used when metadata is not attached
  pub changelog: Option<PathBuf>,
  /// Language of `changelog` (default: en-US)
  pub language: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
  /// API endpoint (default: https://androidpublisher.googleapis.com)
  pub base: Option<String>,
  /// File holding an OAuth access token
  pub token_file: Option<PathBuf>,
  /// Per-request timeout in seconds
  pub timeout_secs: Option<u64>,
  /// Fall back to `gcloud` for a token
  pub gcloud: bool,
}

impl Default for ApiConfig {
  fn default() -> Self {
    Self {
      base: None,
      token_file: None,
      timeout_secs: None,
      gcloud: true,
    }
  }
}

impl ApiConfig {
  pub fn base(&self) -> &str {
    self.base.as_deref().unwrap_or(DEFAULT_API_BASE)
  }

  pub fn timeout(&self) -> Duration {
    Duration::from_secs(self.timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS))
  }
}

impl PlayConfig {
  /// Find config file in search order: play.toml, .play.toml, .config/play.toml
  pub fn find_config_path(path: &Path) -> Option<PathBuf> {
    let candidates = vec![
      path.join("play.toml"),
      path.join(".play.toml"),
      path.join(".config").join("play.toml"),
    ];

    candidates.into_iter().find(|p| p.exists())
  }

  /// Load `explicit` if given, else the first file found under `dir`, else defaults
  pub fn load(dir: &Path, explicit: Option<&Path>) -> PlayResult<Self> {
    let config_path = match explicit {
      Some(path) if !path.exists() => {
        return Err(ConfigError::NotFound {
          path: path.to_path_buf(),
        }
        .into());
      }
      Some(path) => path.to_path_buf(),
      None => match Self::find_config_path(dir) {
        Some(path) => path,
        None => return Ok(Self::default()),
      },
    };

    let content = fs::read_to_string(&config_path).map_err(|e| ConfigError::Invalid {
      path: config_path.clone(),
      reason: e.to_string(),
    })?;
    Self::parse(&content).map_err(|e| {
      PlayError::Config(ConfigError::Invalid {
        path: config_path,
        reason: e.to_string(),
      })
    })
  }

  pub fn parse(content: &str) -> PlayResult<Self> {
    Ok(toml_edit::de::from_str(content)?)
  }

  /// Validate and resolve into a publish plan; paths are relative to `root`
  pub fn resolve(&self, root: &Path) -> PlayResult<PublishPlan> {
    let package = self
      .app
      .package
      .as_deref()
      .map(str::trim)
      .filter(|p| !p.is_empty())
      .ok_or_else(|| InputError::MissingField {
        field: "app.package (--package)".to_string(),
      })?
      .to_string();

    let track = self.track_request()?;
    let notes = self.notes_source(root)?;
    let listing_dir = match (&notes, self.metadata.attach) {
      (NotesSource::MetadataDir(dir), true) => Some(dir.clone()),
      _ => None,
    };

    let artifacts = if self.artifacts.listing_only {
      if self.has_artifact_patterns() {
        return Err(
          InputError::Conflict {
            message: "listing-only runs cannot upload apks or bundles".to_string(),
          }
          .into(),
        );
      }
      if listing_dir.is_none() {
        return Err(
          InputError::MissingField {
            field: "metadata.dir with metadata.attach (listing-only runs publish store metadata)".to_string(),
          }
          .into(),
        );
      }
      Vec::new()
    } else {
      let artifacts = resolve_artifacts(root, &self.package_slot(), &self.bundle_slot())?;
      if artifacts.is_empty() {
        return Err(
          InputError::MissingField {
            field: "artifacts.apk or artifacts.bundle".to_string(),
          }
          .into(),
        );
      }
      artifacts
    };

    let mapping_file = match &self.artifacts.mapping {
      Some(pattern) => {
        let mut matches = resolve_pattern(root, pattern)?;
        if matches.len() > 1 {
          return Err(
            InputError::AmbiguousMatch {
              pattern: pattern.clone(),
              matches,
            }
            .into(),
          );
        }
        Some(matches.remove(0))
      }
      None => None,
    };

    Ok(PublishPlan {
      package,
      artifacts,
      mapping_file,
      notes,
      listing_dir,
      track,
      changes_not_sent_for_review: self.release.changes_not_sent_for_review,
    })
  }

  fn track_request(&self) -> PlayResult<TrackRequest> {
    let release = &self.release;

    let rollout_fraction = release.rollout_fraction.unwrap_or(1.0);
    if !(0.0..=1.0).contains(&rollout_fraction) {
      return Err(
        InputError::OutOfRange {
          field: "release.rollout_fraction".to_string(),
          value: rollout_fraction.to_string(),
          range: "[0.0, 1.0]".to_string(),
        }
        .into(),
      );
    }

    let update_priority = release.update_priority.unwrap_or(0);
    if !(0..=5).contains(&update_priority) {
      return Err(
        InputError::OutOfRange {
          field: "release.update_priority".to_string(),
          value: update_priority.to_string(),
          range: "[0, 5]".to_string(),
        }
        .into(),
      );
    }

    let mut request = TrackRequest::new(release.track.as_deref().unwrap_or(DEFAULT_TRACK));
    request.policy = FilterPolicy::parse(release.filter, release.filter_value.as_deref())?;
    request.rollout_fraction = rollout_fraction;
    request.update_priority = update_priority as u8;
    request.release_name = release.release_name.clone().filter(|n| !n.trim().is_empty());
    request.draft = release.draft;
    Ok(request)
  }

  /// Metadata tree when attached, else the flat changelog
  fn notes_source(&self, root: &Path) -> PlayResult<NotesSource> {
    let metadata = &self.metadata;
    if metadata.attach {
      let dir = metadata.dir.as_ref().ok_or_else(|| InputError::MissingField {
        field: "metadata.dir (--metadata-dir)".to_string(),
      })?;
      return Ok(NotesSource::MetadataDir(root.join(dir)));
    }

    Ok(match &metadata.changelog {
      Some(path) => NotesSource::Changelog {
        path: root.join(path),
        language: metadata.language.clone().unwrap_or_else(|| DEFAULT_LANGUAGE.to_string()),
      },
      None => NotesSource::None,
    })
  }

  fn has_artifact_patterns(&self) -> bool {
    !self.package_slot().is_empty() || !self.bundle_slot().is_empty()
  }

  fn package_slot(&self) -> ArtifactSlot {
    ArtifactSlot {
      primary: self.artifacts.apk.clone(),
      additional: self.artifacts.additional_apks.clone(),
      expansion_for_primary: self.artifacts.apk_expansion,
      expansion_for_additional: self.artifacts.additional_apk_expansion,
    }
  }

  fn bundle_slot(&self) -> ArtifactSlot {
    ArtifactSlot {
      primary: self.artifacts.bundle.clone(),
      additional: self.artifacts.additional_bundles.clone(),
      ..Default::default()
    }
  }
}
