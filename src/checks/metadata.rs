//! Metadata tree and release-notes sanity

use super::trait_def::{Check, CheckContext, CheckResult};
use crate::core::config::PlayConfig;
use crate::core::error::PlayResult;
use crate::edit::track::MAX_RELEASE_NOTES_CHARS;
use crate::inputs::listing::read_listings;
use crate::inputs::notes::{DEFAULT_LANGUAGE, NotesSource, read_release_notes};
use serde_json::json;

pub struct MetadataCheck;

impl Check for MetadataCheck {
  fn name(&self) -> &str {
    "metadata"
  }

  fn description(&self) -> &str {
    "Reads store listings and release notes"
  }

  fn run(&self, ctx: &CheckContext) -> PlayResult<CheckResult> {
    let Ok(config) = PlayConfig::load(&ctx.root, ctx.config_path.as_deref()) else {
      return Ok(CheckResult::pass(self.name(), "No usable play.toml, skipped"));
    };

    let (notes_source, listing_dir) = match (&config.metadata.dir, config.metadata.attach) {
      (Some(dir), true) => {
        let dir = ctx.root.join(dir);
        (NotesSource::MetadataDir(dir.clone()), Some(dir))
      }
      _ => match &config.metadata.changelog {
        Some(path) => (
          NotesSource::Changelog {
            path: ctx.root.join(path),
            language: config
              .metadata
              .language
              .clone()
              .unwrap_or_else(|| DEFAULT_LANGUAGE.to_string()),
          },
          None,
        ),
        None => return Ok(CheckResult::pass(self.name(), "No metadata attached")),
      },
    };

    let listings = match &listing_dir {
      Some(dir) => match read_listings(dir) {
        Ok(listings) => listings,
        Err(e) => return Ok(CheckResult::error(self.name(), e.to_string(), e.help_message())),
      },
      None => Vec::new(),
    };

    // only default notes are known before the upload assigns version codes
    let notes = match read_release_notes(&notes_source, &[]) {
      Ok(notes) => notes,
      Err(e) => return Ok(CheckResult::error(self.name(), e.to_string(), e.help_message())),
    };

    let too_long: Vec<String> = notes
      .iter()
      .filter(|n| n.text.chars().count() > MAX_RELEASE_NOTES_CHARS)
      .map(|n| n.language.clone())
      .collect();

    let details = json!({
      "listings": listings.iter().map(|l| l.language.clone()).collect::<Vec<_>>(),
      "release_notes": notes.iter().map(|n| n.language.clone()).collect::<Vec<_>>(),
    });

    if !too_long.is_empty() {
      return Ok(
        CheckResult::warning(
          self.name(),
          format!(
            "Release notes longer than {} characters: {}",
            MAX_RELEASE_NOTES_CHARS,
            too_long.join(", ")
          ),
          Some("The store rejects or truncates long release notes; shorten them"),
        )
        .with_details(details),
      );
    }

    Ok(
      CheckResult::pass(
        self.name(),
        format!("{} listing(s), {} release-notes language(s)", listings.len(), notes.len()),
      )
      .with_details(details),
    )
  }
}
