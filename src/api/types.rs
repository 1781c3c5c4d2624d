//! Wire types for the `androidpublisher/v3` edits resource
//!
//! int64 fields (version codes, file sizes) are sent by the API as decimal
//! strings. They are decoded leniently from either strings or numbers and
//! always encoded as strings.

use super::VersionCode;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// Binary artifact kinds accepted by the edits API
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ArtifactKind {
  /// Monolithic installable package (.apk)
  Package,
  /// Modular app bundle (.aab)
  Bundle,
}

impl ArtifactKind {
  /// Collection name in the upload URL
  pub fn collection(self) -> &'static str {
    match self {
      ArtifactKind::Package => "apks",
      ArtifactKind::Bundle => "bundles",
    }
  }

  pub fn content_type(self) -> &'static str {
    match self {
      ArtifactKind::Package => "application/vnd.android.package-archive",
      ArtifactKind::Bundle => "application/octet-stream",
    }
  }
}

impl fmt::Display for ArtifactKind {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      ArtifactKind::Package => write!(f, "apk"),
      ArtifactKind::Bundle => write!(f, "bundle"),
    }
  }
}

/// An open edit session
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppEdit {
  pub id: String,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub expiry_time_seconds: Option<String>,
}

impl AppEdit {
  /// When the server will discard the edit if it is never committed
  pub fn expires_at(&self) -> Option<DateTime<Utc>> {
    let secs = self.expiry_time_seconds.as_deref()?.parse::<i64>().ok()?;
    DateTime::from_timestamp(secs, 0)
  }
}

/// Response of an expansion-file upload
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExpansionFile {
  #[serde(default, deserialize_with = "lenient_u64::deserialize_opt")]
  pub file_size: Option<u64>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub references_version: Option<i64>,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct ExpansionFileResponse {
  #[serde(rename = "expansionFile", default)]
  pub expansion_file: ExpansionFile,
}

/// Release-notes text for one language
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocalizedText {
  pub language: String,
  pub text: String,
}

impl LocalizedText {
  pub fn new(language: impl Into<String>, text: impl Into<String>) -> Self {
    Self {
      language: language.into(),
      text: text.into(),
    }
  }
}

/// Release status on a track
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ReleaseStatus {
  Draft,
  InProgress,
  Halted,
  Completed,
  #[serde(other)]
  Unspecified,
}

/// One release on a track
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackRelease {
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub name: Option<String>,
  #[serde(default, with = "lenient_u64::seq")]
  pub version_codes: Vec<VersionCode>,
  #[serde(default, skip_serializing_if = "Vec::is_empty")]
  pub release_notes: Vec<LocalizedText>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub status: Option<ReleaseStatus>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub user_fraction: Option<f64>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub in_app_update_priority: Option<u8>,
}

/// A named release channel and its releases
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Track {
  pub track: String,
  #[serde(default)]
  pub releases: Vec<TrackRelease>,
}

impl Track {
  /// Version codes of every release, in server order
  pub fn active_version_codes(&self) -> Vec<VersionCode> {
    self
      .releases
      .iter()
      .flat_map(|r| r.version_codes.iter().copied())
      .collect()
  }
}

/// Store listing text for one language
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Listing {
  pub language: String,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub title: Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub short_description: Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub full_description: Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub video: Option<String>,
}

impl Listing {
  /// True when no text field is set
  pub fn is_empty(&self) -> bool {
    self.title.is_none() && self.short_description.is_none() && self.full_description.is_none() && self.video.is_none()
  }
}

/// Response of an apk upload (`Apk`) or bundle upload (`Bundle`)
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct UploadedBinary {
  #[serde(deserialize_with = "lenient_u64::deserialize")]
  pub version_code: VersionCode,
}

mod lenient_u64 {
  use super::*;

  #[derive(Deserialize)]
  #[serde(untagged)]
  enum Raw {
    Num(u64),
    Str(String),
  }

  impl Raw {
    fn into_u64<E: serde::de::Error>(self) -> Result<u64, E> {
      match self {
        Raw::Num(n) => Ok(n),
        Raw::Str(s) => s
          .parse()
          .map_err(|_| E::custom(format!("expected integer string, got '{}'", s))),
      }
    }
  }

  pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<u64, D::Error> {
    Raw::deserialize(d)?.into_u64()
  }

  pub fn deserialize_opt<'de, D: Deserializer<'de>>(d: D) -> Result<Option<u64>, D::Error> {
    Option::<Raw>::deserialize(d)?.map(Raw::into_u64).transpose()
  }

  pub mod seq {
    use super::*;

    pub fn serialize<S: Serializer>(codes: &[u64], s: S) -> Result<S::Ok, S::Error> {
      s.collect_seq(codes.iter().map(|c| c.to_string()))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Vec<u64>, D::Error> {
      Vec::<Raw>::deserialize(d)?.into_iter().map(Raw::into_u64).collect()
    }
  }
}
