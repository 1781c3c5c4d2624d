//! In-memory `PlayApi` that records every call, for engine tests

use super::*;
use std::collections::{HashMap, VecDeque};
use std::path::PathBuf;
use std::sync::Mutex;

/// One recorded remote call
#[derive(Debug, Clone, PartialEq)]
pub enum Call {
  OpenEdit(String),
  UploadArtifact(ArtifactKind, PathBuf),
  UploadExpansion(VersionCode, PathBuf),
  UploadMapping(VersionCode, PathBuf),
  GetTrack(String),
  UpdateTrack(Track),
  UpdateListing(Listing),
  Commit(bool),
}

/// Step names that can be made to fail
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Step {
  OpenEdit,
  UploadArtifact,
  UploadExpansion,
  UploadMapping,
  GetTrack,
  UpdateTrack,
  UpdateListing,
  Commit,
}

#[derive(Default)]
struct State {
  calls: Vec<Call>,
  next_codes: VecDeque<VersionCode>,
  tracks: HashMap<String, Track>,
  failures: HashMap<Step, u16>,
  expansion_size: u64,
}

/// Recording fake; version codes are handed out from a queue
pub struct FakePlayApi {
  state: Mutex<State>,
}

impl FakePlayApi {
  pub fn new() -> Self {
    Self {
      state: Mutex::new(State {
        expansion_size: 1024,
        ..Default::default()
      }),
    }
  }

  /// Version codes returned by successive artifact uploads
  pub fn with_version_codes(self, codes: &[VersionCode]) -> Self {
    self.state.lock().unwrap().next_codes.extend(codes.iter().copied());
    self
  }

  /// Server-side state of a track
  pub fn with_track(self, track: Track) -> Self {
    self.state.lock().unwrap().tracks.insert(track.track.clone(), track);
    self
  }

  /// Make `step` answer with HTTP `status`
  pub fn failing(self, step: Step, status: u16) -> Self {
    self.state.lock().unwrap().failures.insert(step, status);
    self
  }

  pub fn with_expansion_size(self, size: u64) -> Self {
    self.state.lock().unwrap().expansion_size = size;
    self
  }

  pub fn calls(&self) -> Vec<Call> {
    self.state.lock().unwrap().calls.clone()
  }

  /// The last track body sent through `update_track`
  pub fn updated_track(&self) -> Option<Track> {
    self.calls().into_iter().rev().find_map(|c| match c {
      Call::UpdateTrack(t) => Some(t),
      _ => None,
    })
  }

  pub fn committed(&self) -> bool {
    self.calls().iter().any(|c| matches!(c, Call::Commit(_)))
  }

  fn record(&self, step: Step, call: Call) -> ApiResult<()> {
    let mut state = self.state.lock().unwrap();
    state.calls.push(call);
    match state.failures.get(&step) {
      Some(status) => Err(ApiError::Status {
        status: *status,
        message: format!("{:?} rejected", step),
      }),
      None => Ok(()),
    }
  }
}

#[async_trait]
impl PlayApi for FakePlayApi {
  async fn open_edit(&self, package: &str) -> ApiResult<AppEdit> {
    self.record(Step::OpenEdit, Call::OpenEdit(package.to_string()))?;
    Ok(AppEdit {
      id: "edit-1".to_string(),
      expiry_time_seconds: Some("1700000000".to_string()),
    })
  }

  async fn upload_artifact(&self, _edit: &EditRef, kind: ArtifactKind, path: &Path) -> ApiResult<VersionCode> {
    self.record(Step::UploadArtifact, Call::UploadArtifact(kind, path.to_path_buf()))?;
    let mut state = self.state.lock().unwrap();
    Ok(state.next_codes.pop_front().unwrap_or(1))
  }

  async fn upload_expansion_file(
    &self,
    _edit: &EditRef,
    version_code: VersionCode,
    path: &Path,
  ) -> ApiResult<ExpansionFile> {
    self.record(Step::UploadExpansion, Call::UploadExpansion(version_code, path.to_path_buf()))?;
    Ok(ExpansionFile {
      file_size: Some(self.state.lock().unwrap().expansion_size),
      references_version: None,
    })
  }

  async fn upload_mapping(&self, _edit: &EditRef, version_code: VersionCode, path: &Path) -> ApiResult<()> {
    self.record(Step::UploadMapping, Call::UploadMapping(version_code, path.to_path_buf()))
  }

  async fn get_track(&self, _edit: &EditRef, track: &str) -> ApiResult<Track> {
    self.record(Step::GetTrack, Call::GetTrack(track.to_string()))?;
    let state = self.state.lock().unwrap();
    Ok(state.tracks.get(track).cloned().unwrap_or_else(|| Track {
      track: track.to_string(),
      releases: Vec::new(),
    }))
  }

  async fn update_track(&self, _edit: &EditRef, track: &Track) -> ApiResult<Track> {
    self.record(Step::UpdateTrack, Call::UpdateTrack(track.clone()))?;
    Ok(track.clone())
  }

  async fn update_listing(&self, _edit: &EditRef, listing: &Listing) -> ApiResult<Listing> {
    self.record(Step::UpdateListing, Call::UpdateListing(listing.clone()))?;
    Ok(listing.clone())
  }

  async fn commit(&self, edit: &EditRef, changes_not_sent_for_review: bool) -> ApiResult<AppEdit> {
    self.record(Step::Commit, Call::Commit(changes_not_sent_for_review))?;
    Ok(AppEdit {
      id: edit.edit_id.clone(),
      expiry_time_seconds: None,
    })
  }
}
