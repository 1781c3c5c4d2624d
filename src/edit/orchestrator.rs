//! Edit transaction orchestrator
//!
//! Drives one publish run through a single edit:
//!
//! 1. open the edit
//! 2. upload every artifact in order (skipped for listing-only runs)
//! 3. attach the mapping file to the first produced version code
//! 4. push store listings (metadata mode)
//! 5. reconcile and update the track, when there are version codes or release notes
//! 6. commit
//!
//! The first failure ends the run. Nothing is committed after a failure and
//! already-uploaded artifacts are left in the uncommitted edit.

use super::filter::FilterPolicy;
use super::session::{CommittedEdit, EditSession};
use super::track::TrackRequest;
use super::upload::{Artifact, Uploaded};
use crate::api::{PlayApi, ReleaseStatus, VersionCode};
use crate::core::error::PlayResult;
use crate::inputs::listing::read_listings;
use crate::inputs::notes::{NotesSource, read_release_notes};
use serde::Serialize;
use std::path::PathBuf;
use tracing::{info, warn};

/// A validated publish run
#[derive(Debug, Clone)]
pub struct PublishPlan {
  pub package: String,
  /// Upload order
  pub artifacts: Vec<Artifact>,
  pub mapping_file: Option<PathBuf>,
  pub notes: NotesSource,
  /// Metadata tree whose listing text is pushed before the track update
  pub listing_dir: Option<PathBuf>,
  /// Release settings; `release_notes` is filled in during the run
  pub track: TrackRequest,
  pub changes_not_sent_for_review: bool,
}

impl PublishPlan {
  /// No binaries: only listings and notes change
  pub fn is_listing_only(&self) -> bool {
    self.artifacts.is_empty()
  }
}

/// Progress notifications during a run
pub trait RunObserver {
  fn artifact_started(&mut self, _index: usize, _artifact: &Artifact) {}
  fn artifact_uploaded(&mut self, _index: usize, _uploaded: &Uploaded) {}
}

/// Observer that ignores everything
pub struct Silent;

impl RunObserver for Silent {}

/// Summary of a committed run
#[derive(Debug, Clone, Serialize)]
pub struct PublishReport {
  pub package: String,
  pub edit_id: String,
  pub uploaded: Vec<Uploaded>,
  pub mapping_version_code: Option<VersionCode>,
  pub listings_updated: Vec<String>,
  pub release_notes_languages: Vec<String>,
  /// Track that was updated, if the track step ran
  pub track: Option<String>,
  pub active_version_codes: Vec<VersionCode>,
  pub status: Option<ReleaseStatus>,
  pub rollout_fraction: Option<f64>,
  pub sent_for_review: bool,
}

impl PublishReport {
  fn new(committed: CommittedEdit, request: &TrackRequest, changes_not_sent_for_review: bool) -> Self {
    let release = committed.track.as_ref().and_then(|t| t.releases.first());
    Self {
      package: committed.edit.package,
      edit_id: committed.edit.edit_id,
      uploaded: committed.uploaded,
      mapping_version_code: None,
      listings_updated: Vec::new(),
      release_notes_languages: request.release_notes.iter().map(|n| n.language.clone()).collect(),
      track: committed.track.as_ref().map(|t| t.track.clone()),
      active_version_codes: release.map(|r| r.version_codes.clone()).unwrap_or_default(),
      status: release.and_then(|r| r.status),
      rollout_fraction: release.map(|_| request.rollout_fraction),
      sent_for_review: !changes_not_sent_for_review,
    }
  }
}

/// Run `plan` against `api`
pub async fn run<A>(api: &A, plan: &PublishPlan, observer: &mut dyn RunObserver) -> PlayResult<PublishReport>
where
  A: PlayApi + ?Sized,
{
  let mut session = EditSession::open(api, &plan.package).await?;
  if let Some(expiry) = session.expires_at() {
    info!(edit_id = %session.edit().edit_id, expires = %expiry.to_rfc3339(), "edit expiry");
  }

  for (index, artifact) in plan.artifacts.iter().enumerate() {
    observer.artifact_started(index, artifact);
    let uploaded = session.upload(artifact).await?;
    observer.artifact_uploaded(index, uploaded);
  }

  let mapping_version_code = match &plan.mapping_file {
    Some(path) => session.upload_mapping(path).await?,
    None => None,
  };

  let mut listings_updated = Vec::new();
  if let Some(dir) = &plan.listing_dir {
    for listing in read_listings(dir)? {
      session.update_listing(&listing).await?;
      listings_updated.push(listing.language);
    }
  }

  let staged = session.finalize();
  let version_codes = staged.version_codes();

  let mut track = plan.track.clone();
  track.release_notes = read_release_notes(&plan.notes, &version_codes)?;

  let ready = if !version_codes.is_empty() || !track.release_notes.is_empty() {
    if version_codes.is_empty() && matches!(track.policy, FilterPolicy::All) {
      warn!(
        track = %track.track,
        "release notes without uploads under filter 'all' leave the release with no version codes; \
         use an exclude filter to keep the current ones"
      );
    }
    staged.update_track(&track).await?
  } else {
    info!("no version codes or release notes; track left unchanged");
    staged.skip_track()
  };

  let committed = ready.commit(plan.changes_not_sent_for_review).await?;

  let mut report = PublishReport::new(committed, &track, plan.changes_not_sent_for_review);
  report.mapping_version_code = mapping_version_code;
  report.listings_updated = listings_updated;
  Ok(report)
}
