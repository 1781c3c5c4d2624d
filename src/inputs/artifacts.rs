//! Resolve artifact patterns to an ordered upload list
//!
//! Order is fixed: packages before bundles; within a kind, the primary file
//! first, then additional files in pattern order (matches of one pattern
//! sorted by path). A path already scheduled is not scheduled twice.

use crate::api::ArtifactKind;
use crate::core::error::{InputError, PlayResult};
use crate::edit::upload::{Artifact, ArtifactRole};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Patterns for one artifact kind
#[derive(Debug, Clone, Default)]
pub struct ArtifactSlot {
  pub primary: Option<String>,
  pub additional: Vec<String>,
  /// Attach expansion files to the primary artifact
  pub expansion_for_primary: bool,
  /// Attach expansion files to each additional artifact
  pub expansion_for_additional: bool,
}

impl ArtifactSlot {
  pub fn is_empty(&self) -> bool {
    self.primary.is_none() && self.additional.is_empty()
  }
}

/// Resolve `pattern` relative to `root`
pub fn resolve_pattern(root: &Path, pattern: &str) -> PlayResult<Vec<PathBuf>> {
  let full = if Path::new(pattern).is_absolute() {
    pattern.to_string()
  } else {
    root.join(pattern).to_string_lossy().into_owned()
  };

  let paths = glob::glob(&full).map_err(|e| InputError::InvalidPattern {
    pattern: pattern.to_string(),
    reason: e.to_string(),
  })?;

  let mut matches: Vec<PathBuf> = paths.filter_map(Result::ok).filter(|p| p.is_file()).collect();
  matches.sort();

  if matches.is_empty() {
    return Err(
      InputError::NoMatch {
        pattern: pattern.to_string(),
      }
      .into(),
    );
  }
  Ok(matches)
}

/// Resolve one slot; the primary pattern must match exactly one file
pub fn resolve_slot(root: &Path, kind: ArtifactKind, slot: &ArtifactSlot) -> PlayResult<Vec<Artifact>> {
  let slot_name = match kind {
    ArtifactKind::Package => "package",
    ArtifactKind::Bundle => "bundle",
  };

  if slot.expansion_for_primary && slot.primary.is_none() {
    return Err(
      InputError::ExpansionWithoutArtifact {
        slot: format!("primary {}", slot_name),
      }
      .into(),
    );
  }
  if slot.expansion_for_additional && slot.additional.is_empty() {
    return Err(
      InputError::ExpansionWithoutArtifact {
        slot: format!("additional {}", slot_name),
      }
      .into(),
    );
  }

  let mut artifacts: Vec<Artifact> = Vec::new();

  if let Some(pattern) = &slot.primary {
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
    let path = matches.remove(0);
    artifacts.push(Artifact::new(path, kind, ArtifactRole::Primary).with_expansion(slot.expansion_for_primary));
  }

  for pattern in &slot.additional {
    for path in resolve_pattern(root, pattern)? {
      if artifacts.iter().any(|a| a.path == path) {
        debug!(path = %path.display(), "artifact already scheduled");
        continue;
      }
      artifacts
        .push(Artifact::new(path, kind, ArtifactRole::Additional).with_expansion(slot.expansion_for_additional));
    }
  }

  Ok(artifacts)
}

/// Full upload list: packages, then bundles
pub fn resolve_artifacts(root: &Path, packages: &ArtifactSlot, bundles: &ArtifactSlot) -> PlayResult<Vec<Artifact>> {
  let mut artifacts = resolve_slot(root, ArtifactKind::Package, packages)?;
  for artifact in resolve_slot(root, ArtifactKind::Bundle, bundles)? {
    if !artifacts.iter().any(|a| a.path == artifact.path) {
      artifacts.push(artifact);
    }
  }
  Ok(artifacts)
}
