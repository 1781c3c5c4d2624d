//! Local inputs of a publish run
//!
//! - **artifacts**: glob patterns → ordered artifact list
//! - **notes**: release notes from a metadata tree or a flat changelog
//! - **listing**: store-listing text from a metadata tree
//!
//! Metadata trees use one directory per locale:
//!
//! ```text
//! metadata/
//!   en-US/
//!     title.txt
//!     short_description.txt
//!     full_description.txt
//!     video.txt
//!     changelogs/
//!       1042.txt
//!       default.txt
//!   de-DE/
//!     ...
//! ```

pub mod artifacts;
pub mod listing;
pub mod notes;

use std::fs;
use std::path::{Path, PathBuf};

/// Locale directories of a metadata tree, sorted by name
pub(crate) fn locale_dirs(root: &Path) -> std::io::Result<Vec<(String, PathBuf)>> {
  let mut dirs: Vec<(String, PathBuf)> = fs::read_dir(root)?
    .filter_map(Result::ok)
    .filter(|entry| entry.path().is_dir())
    .filter_map(|entry| {
      let name = entry.file_name().to_str()?.to_string();
      (!name.starts_with('.')).then(|| (name, entry.path()))
    })
    .collect();
  dirs.sort_by(|a, b| a.0.cmp(&b.0));
  Ok(dirs)
}

/// Trimmed file content, `None` when missing or blank
pub(crate) fn read_text(path: &Path) -> std::io::Result<Option<String>> {
  match fs::read_to_string(path) {
    Ok(content) => {
      let trimmed = content.trim();
      Ok((!trimmed.is_empty()).then(|| trimmed.to_string()))
    }
    Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
    Err(e) => Err(e),
  }
}
