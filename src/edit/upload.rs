//! Artifact uploader
//!
//! Uploads one artifact into an open edit and, for packages that asked for
//! it, the expansion file that belongs to it.

use super::expansion::find_expansion_file;
use crate::api::{ArtifactKind, EditRef, PlayApi, VersionCode};
use crate::core::error::{InputError, PlayResult, RemoteError};
use serde::Serialize;
use std::fs::File;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Whether an artifact was the slot's main file or one of its extras
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ArtifactRole {
  Primary,
  Additional,
}

/// A resolved local artifact
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifact {
  pub path: PathBuf,
  pub kind: ArtifactKind,
  pub role: ArtifactRole,
  /// Look for and upload a main expansion file after this artifact
  pub attach_expansion: bool,
}

impl Artifact {
  pub fn new(path: impl Into<PathBuf>, kind: ArtifactKind, role: ArtifactRole) -> Self {
    Self {
      path: path.into(),
      kind,
      role,
      attach_expansion: false,
    }
  }

  pub fn with_expansion(mut self, attach: bool) -> Self {
    self.attach_expansion = attach;
    self
  }
}

/// What one artifact upload produced
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Uploaded {
  pub path: PathBuf,
  pub kind: ArtifactKind,
  pub version_code: VersionCode,
  pub expansion_file: Option<PathBuf>,
}

/// Fail with an input error unless `path` is a readable file
pub fn ensure_readable(path: &Path) -> PlayResult<()> {
  if path.is_file() && File::open(path).is_ok() {
    Ok(())
  } else {
    Err(
      InputError::FileNotFound {
        path: path.to_path_buf(),
      }
      .into(),
    )
  }
}

/// Upload `artifact` and its expansion file
pub async fn upload_artifact<A>(api: &A, edit: &EditRef, artifact: &Artifact) -> PlayResult<Uploaded>
where
  A: PlayApi + ?Sized,
{
  ensure_readable(&artifact.path)?;

  debug!(path = %artifact.path.display(), kind = %artifact.kind, "uploading artifact");
  let version_code = api
    .upload_artifact(edit, artifact.kind, &artifact.path)
    .await
    .map_err(|source| RemoteError::ArtifactUpload {
      package: edit.package.clone(),
      edit_id: edit.edit_id.clone(),
      path: artifact.path.clone(),
      source,
    })?;

  let expansion_file = if artifact.kind == ArtifactKind::Package && artifact.attach_expansion {
    upload_expansion(api, edit, &artifact.path, version_code).await?
  } else {
    None
  };

  Ok(Uploaded {
    path: artifact.path.clone(),
    kind: artifact.kind,
    version_code,
    expansion_file,
  })
}

async fn upload_expansion<A>(
  api: &A,
  edit: &EditRef,
  artifact: &Path,
  version_code: VersionCode,
) -> PlayResult<Option<PathBuf>>
where
  A: PlayApi + ?Sized,
{
  let Some(path) = find_expansion_file(artifact, version_code, &edit.package)? else {
    debug!(artifact = %artifact.display(), "no expansion file found");
    return Ok(None);
  };

  let uploaded = api
    .upload_expansion_file(edit, version_code, &path)
    .await
    .map_err(|source| RemoteError::ExpansionUpload {
      package: edit.package.clone(),
      edit_id: edit.edit_id.clone(),
      version_code,
      path: path.clone(),
      source,
    })?;

  if uploaded.file_size == Some(0) {
    warn!(
      path = %path.display(),
      version_code,
      "expansion file was uploaded but the server reports a size of 0"
    );
  }

  Ok(Some(path))
}

/// Upload a deobfuscation mapping for `version_code`
pub async fn upload_mapping<A>(api: &A, edit: &EditRef, version_code: VersionCode, path: &Path) -> PlayResult<()>
where
  A: PlayApi + ?Sized,
{
  ensure_readable(path)?;
  api
    .upload_mapping(edit, version_code, path)
    .await
    .map_err(|source| RemoteError::MappingUpload {
      package: edit.package.clone(),
      edit_id: edit.edit_id.clone(),
      version_code,
      path: path.to_path_buf(),
      source,
    })?;
  Ok(())
}
