//! Expansion-file (.obb) discovery next to a package artifact
//!
//! Search order:
//! 1. the artifact's parent's parent directory: any `*.obb`, regardless of name
//! 2. the artifact's own directory: exactly `main.<versionCode>.<package>.obb`
//!
//! When several files qualify in step 1, the lexicographically smallest file
//! name is taken so the choice does not depend on directory-listing order.

use crate::api::VersionCode;
use crate::core::error::{PlayResult, ResultExt};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

pub const EXPANSION_EXTENSION: &str = "obb";

/// Locate the expansion file for an uploaded package, if any
pub fn find_expansion_file(artifact: &Path, version_code: VersionCode, package: &str) -> PlayResult<Option<PathBuf>> {
  let artifact = std::path::absolute(artifact)
    .with_context(|| format!("Failed to resolve artifact path {}", artifact.display()))?;

  let own_dir = artifact.parent();

  if let Some(grandparent) = own_dir.and_then(Path::parent)
    && let Some(found) = first_expansion_in(grandparent)
  {
    debug!(path = %found.display(), "expansion file found next to artifact directory");
    return Ok(Some(found));
  }

  if let Some(dir) = own_dir {
    let named = dir.join(format!("main.{}.{}.{}", version_code, package, EXPANSION_EXTENSION));
    if named.is_file() {
      debug!(path = %named.display(), "expansion file found by name");
      return Ok(Some(named));
    }
  }

  Ok(None)
}

fn first_expansion_in(dir: &Path) -> Option<PathBuf> {
  let entries = match fs::read_dir(dir) {
    Ok(entries) => entries,
    Err(e) => {
      debug!(dir = %dir.display(), error = %e, "cannot list directory for expansion files");
      return None;
    }
  };

  entries
    .filter_map(Result::ok)
    .map(|entry| entry.path())
    .filter(|path| path.is_file() && path.extension().is_some_and(|ext| ext == EXPANSION_EXTENSION))
    .min_by(|a, b| a.file_name().cmp(&b.file_name()))
}
