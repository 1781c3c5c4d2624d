//! Track reconciler: fetch, filter, update

use super::filter::{FilterPolicy, reconcile};
use crate::api::{EditRef, LocalizedText, PlayApi, ReleaseStatus, Track, TrackRelease, VersionCode};
use crate::core::error::{PlayResult, RemoteError};
use tracing::{debug, warn};

/// Maximum release-notes length Google Play accepts per language
pub const MAX_RELEASE_NOTES_CHARS: usize = 500;

/// Everything about the release except the version codes
#[derive(Debug, Clone)]
pub struct TrackRequest {
  pub track: String,
  pub policy: FilterPolicy,
  /// 0.0–1.0, 1.0 for a full rollout
  pub rollout_fraction: f64,
  /// 0–5
  pub update_priority: u8,
  pub release_notes: Vec<LocalizedText>,
  pub release_name: Option<String>,
  pub draft: bool,
}

impl TrackRequest {
  /// Full rollout to `track`, replacing its codes
  pub fn new(track: impl Into<String>) -> Self {
    Self {
      track: track.into(),
      policy: FilterPolicy::All,
      rollout_fraction: 1.0,
      update_priority: 0,
      release_notes: Vec::new(),
      release_name: None,
      draft: false,
    }
  }

  pub fn status(&self) -> ReleaseStatus {
    if self.draft {
      ReleaseStatus::Draft
    } else if self.rollout_fraction < 1.0 {
      ReleaseStatus::InProgress
    } else {
      ReleaseStatus::Completed
    }
  }

  /// Release body carrying `version_codes`
  pub fn release(&self, version_codes: Vec<VersionCode>) -> TrackRelease {
    let status = self.status();
    TrackRelease {
      name: self.release_name.clone(),
      version_codes,
      release_notes: self.release_notes.clone(),
      status: Some(status),
      // the API rejects a fraction on anything but a staged rollout
      user_fraction: (status == ReleaseStatus::InProgress).then_some(self.rollout_fraction),
      in_app_update_priority: Some(self.update_priority),
    }
  }
}

/// Reconcile and push the track's release
pub async fn update_track<A>(
  api: &A,
  edit: &EditRef,
  uploaded: &[VersionCode],
  request: &TrackRequest,
) -> PlayResult<Track>
where
  A: PlayApi + ?Sized,
{
  let current_active = if request.policy.needs_current_track() {
    let current = api
      .get_track(edit, &request.track)
      .await
      .map_err(|source| RemoteError::TrackFetch {
        package: edit.package.clone(),
        edit_id: edit.edit_id.clone(),
        track: request.track.clone(),
        source,
      })?;
    current.active_version_codes()
  } else {
    Vec::new()
  };

  let version_codes = reconcile(&current_active, uploaded, &request.policy);
  debug!(
    track = %request.track,
    policy = %request.policy,
    current = ?current_active,
    reconciled = ?version_codes,
    "reconciled version codes"
  );

  for note in &request.release_notes {
    let len = note.text.chars().count();
    if len > MAX_RELEASE_NOTES_CHARS {
      warn!(
        language = %note.language,
        chars = len,
        "release notes exceed {} characters and may be rejected",
        MAX_RELEASE_NOTES_CHARS
      );
    }
  }

  let body = Track {
    track: request.track.clone(),
    releases: vec![request.release(version_codes.clone())],
  };

  api
    .update_track(edit, &body)
    .await
    .map_err(|source| RemoteError::TrackUpdate {
      package: edit.package.clone(),
      edit_id: edit.edit_id.clone(),
      track: request.track.clone(),
      version_codes,
      source,
    })
    .map_err(Into::into)
}
