//! Upload progress for publish runs
//!
//! Uses `linya` for the bar; it draws to stderr so `--json` output on stdout
//! stays parseable.

use crate::edit::RunObserver;
use crate::edit::upload::{Artifact, Uploaded};
use linya::{Bar, Progress};

/// One bar across all artifacts of a run, advanced per finished upload
pub struct UploadProgress {
  progress: Progress,
  bar: Bar,
}

impl UploadProgress {
  pub fn new(total: usize) -> Self {
    let mut progress = Progress::new();
    let bar = progress.bar(total, format!("Uploading {} artifact(s)", total));
    Self { progress, bar }
  }

  /// A bar only pays off with more than one upload
  pub fn wanted(artifacts: usize, json: bool) -> bool {
    !json && artifacts > 1
  }
}

impl RunObserver for UploadProgress {
  fn artifact_started(&mut self, _index: usize, artifact: &Artifact) {
    eprintln!("   ⬆️  {} ({})", artifact.path.display(), artifact.kind);
  }

  fn artifact_uploaded(&mut self, _index: usize, uploaded: &Uploaded) {
    match &uploaded.expansion_file {
      Some(obb) => eprintln!("   ✅ version code {} (+ {})", uploaded.version_code, obb.display()),
      None => eprintln!("   ✅ version code {}", uploaded.version_code),
    }
    self.progress.inc_and_draw(&self.bar, 1);
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_bar_only_for_several_artifacts() {
    assert!(!UploadProgress::wanted(0, false));
    assert!(!UploadProgress::wanted(1, false));
    assert!(UploadProgress::wanted(2, false));
    assert!(!UploadProgress::wanted(3, true));
  }
}
