//! Release-notes readers

use super::{locale_dirs, read_text};
use crate::api::{LocalizedText, VersionCode};
use crate::core::error::{InputError, PlayResult, ResultExt};
use std::path::{Path, PathBuf};
use tracing::debug;

pub const DEFAULT_LANGUAGE: &str = "en-US";

/// Where release notes come from; exactly one per run
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NotesSource {
  None,
  /// Per-locale metadata tree
  MetadataDir(PathBuf),
  /// One file applied to one language
  Changelog { path: PathBuf, language: String },
}

/// Read release notes for a run that produced `version_codes`
pub fn read_release_notes(source: &NotesSource, version_codes: &[VersionCode]) -> PlayResult<Vec<LocalizedText>> {
  match source {
    NotesSource::None => Ok(Vec::new()),
    NotesSource::Changelog { path, language } => {
      if !path.is_file() {
        return Err(InputError::FileNotFound { path: path.clone() }.into());
      }
      let text = read_text(path).with_context(|| format!("Failed to read changelog {}", path.display()))?;
      Ok(
        text
          .map(|t| vec![LocalizedText::new(language.clone(), t)])
          .unwrap_or_default(),
      )
    }
    NotesSource::MetadataDir(root) => read_metadata_notes(root, version_codes),
  }
}

/// Per locale, the first `changelogs/<code>.txt` in upload order, else `changelogs/default.txt`
fn read_metadata_notes(root: &Path, version_codes: &[VersionCode]) -> PlayResult<Vec<LocalizedText>> {
  if !root.is_dir() {
    return Err(InputError::FileNotFound { path: root.to_path_buf() }.into());
  }

  let mut notes = Vec::new();
  for (language, dir) in
    locale_dirs(root).with_context(|| format!("Failed to list metadata directory {}", root.display()))?
  {
    let changelogs = dir.join("changelogs");
    let candidates = version_codes
      .iter()
      .map(|code| changelogs.join(format!("{}.txt", code)))
      .chain(std::iter::once(changelogs.join("default.txt")));

    for candidate in candidates {
      let text = read_text(&candidate).with_context(|| format!("Failed to read {}", candidate.display()))?;
      if let Some(text) = text {
        debug!(language = %language, file = %candidate.display(), "release notes found");
        notes.push(LocalizedText::new(language.clone(), text));
        break;
      }
    }
  }

  Ok(notes)
}
