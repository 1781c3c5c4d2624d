//! Type-state handle over one remote edit
//!
//! ```text
//! EditSession<Open>   --finalize()-->   EditSession<Staged>
//!   upload / mapping / listing            update_track() | skip_track()
//!                                                 |
//!                                                 v
//!                                        EditSession<Ready> --commit()--> CommittedEdit
//! ```
//!
//! `commit` only exists on `EditSession<Ready>`, so an edit can only be
//! committed after uploads have been finalized and the track step has been
//! either performed or explicitly skipped. Dropping a session at any point
//! abandons the edit; the server expires it.

use super::track::{TrackRequest, update_track};
use super::upload::{Artifact, Uploaded, upload_artifact, upload_mapping};
use crate::api::{EditRef, Listing, PlayApi, Track, VersionCode};
use crate::core::error::{PlayResult, RemoteError};
use chrono::{DateTime, Utc};
use std::path::Path;
use tracing::info;

/// Accepting uploads
pub struct Open {
  uploaded: Vec<Uploaded>,
}

/// Uploads finished; version codes are fixed
pub struct Staged {
  uploaded: Vec<Uploaded>,
}

/// Track step done (or skipped); only commit remains
pub struct Ready {
  uploaded: Vec<Uploaded>,
  track: Option<Track>,
}

pub struct EditSession<'a, A: PlayApi + ?Sized, S> {
  api: &'a A,
  edit: EditRef,
  expires_at: Option<DateTime<Utc>>,
  state: S,
}

/// Outcome of a successful commit
#[derive(Debug, Clone)]
pub struct CommittedEdit {
  pub edit: EditRef,
  pub uploaded: Vec<Uploaded>,
  pub track: Option<Track>,
}

impl<A: PlayApi + ?Sized, S> EditSession<'_, A, S> {
  pub fn edit(&self) -> &EditRef {
    &self.edit
  }

  pub fn expires_at(&self) -> Option<DateTime<Utc>> {
    self.expires_at
  }
}

impl<'a, A: PlayApi + ?Sized> EditSession<'a, A, Open> {
  /// Open a new edit for `package`
  pub async fn open(api: &'a A, package: &str) -> PlayResult<Self> {
    let edit = api.open_edit(package).await.map_err(|source| RemoteError::EditOpen {
      package: package.to_string(),
      source,
    })?;
    info!(package, edit_id = %edit.id, "edit opened");

    Ok(Self {
      api,
      expires_at: edit.expires_at(),
      edit: EditRef::new(package, edit.id),
      state: Open { uploaded: Vec::new() },
    })
  }

  /// Upload one artifact; its version code joins the run's sequence
  pub async fn upload(&mut self, artifact: &Artifact) -> PlayResult<&Uploaded> {
    let uploaded = upload_artifact(self.api, &self.edit, artifact).await?;
    info!(path = %uploaded.path.display(), version_code = uploaded.version_code, "artifact uploaded");
    self.state.uploaded.push(uploaded);
    Ok(&self.state.uploaded[self.state.uploaded.len() - 1])
  }

  /// Attach a mapping file to the first produced version code.
  /// Returns that code, or `None` when nothing has been uploaded.
  pub async fn upload_mapping(&self, path: &Path) -> PlayResult<Option<VersionCode>> {
    let Some(first) = self.state.uploaded.first().map(|u| u.version_code) else {
      return Ok(None);
    };
    upload_mapping(self.api, &self.edit, first, path).await?;
    info!(path = %path.display(), version_code = first, "mapping file uploaded");
    Ok(Some(first))
  }

  pub async fn update_listing(&self, listing: &Listing) -> PlayResult<()> {
    self
      .api
      .update_listing(&self.edit, listing)
      .await
      .map_err(|source| RemoteError::ListingUpdate {
        package: self.edit.package.clone(),
        edit_id: self.edit.edit_id.clone(),
        language: listing.language.clone(),
        source,
      })?;
    Ok(())
  }

  /// Close the upload phase
  pub fn finalize(self) -> EditSession<'a, A, Staged> {
    EditSession {
      api: self.api,
      edit: self.edit,
      expires_at: self.expires_at,
      state: Staged {
        uploaded: self.state.uploaded,
      },
    }
  }
}

impl<'a, A: PlayApi + ?Sized> EditSession<'a, A, Staged> {
  pub fn version_codes(&self) -> Vec<VersionCode> {
    self.state.uploaded.iter().map(|u| u.version_code).collect()
  }

  /// Reconcile the track against this run's version codes
  pub async fn update_track(self, request: &TrackRequest) -> PlayResult<EditSession<'a, A, Ready>> {
    let codes = self.version_codes();
    let track = update_track(self.api, &self.edit, &codes, request).await?;
    info!(track = %track.track, "track updated");
    Ok(self.into_ready(Some(track)))
  }

  /// Leave every track untouched
  pub fn skip_track(self) -> EditSession<'a, A, Ready> {
    self.into_ready(None)
  }

  fn into_ready(self, track: Option<Track>) -> EditSession<'a, A, Ready> {
    EditSession {
      api: self.api,
      edit: self.edit,
      expires_at: self.expires_at,
      state: Ready {
        uploaded: self.state.uploaded,
        track,
      },
    }
  }
}

impl<A: PlayApi + ?Sized> EditSession<'_, A, Ready> {
  /// Commit every pending change of the edit
  pub async fn commit(self, changes_not_sent_for_review: bool) -> PlayResult<CommittedEdit> {
    self
      .api
      .commit(&self.edit, changes_not_sent_for_review)
      .await
      .map_err(|source| RemoteError::Commit {
        package: self.edit.package.clone(),
        edit_id: self.edit.edit_id.clone(),
        source,
      })?;
    info!(edit_id = %self.edit.edit_id, "edit committed");

    Ok(CommittedEdit {
      edit: self.edit,
      uploaded: self.state.uploaded,
      track: self.state.track,
    })
  }
}
