//! Store-listing text from a metadata tree

use super::{locale_dirs, read_text};
use crate::api::Listing;
use crate::core::error::{InputError, PlayResult, ResultExt};
use std::path::Path;

/// One listing per locale directory that has at least one text file
pub fn read_listings(root: &Path) -> PlayResult<Vec<Listing>> {
  if !root.is_dir() {
    return Err(InputError::FileNotFound { path: root.to_path_buf() }.into());
  }

  let mut listings = Vec::new();
  for (language, dir) in
    locale_dirs(root).with_context(|| format!("Failed to list metadata directory {}", root.display()))?
  {
    let field = |name: &str| {
      let path = dir.join(name);
      read_text(&path).with_context(|| format!("Failed to read {}", path.display()))
    };

    let listing = Listing {
      title: field("title.txt")?,
      short_description: field("short_description.txt")?,
      full_description: field("full_description.txt")?,
      video: field("video.txt")?,
      language,
    };

    if !listing.is_empty() {
      listings.push(listing);
    }
  }

  Ok(listings)
}
