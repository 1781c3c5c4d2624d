//! `play-rail publish`: one edit, open to commit

use crate::api::auth::CredentialSources;
use crate::api::HttpPlayApi;
use crate::core::config::PlayConfig;
use crate::core::error::{PlayError, PlayResult, ResultExt};
use crate::edit::orchestrator::{self, Silent};
use crate::edit::{FilterKind, PublishPlan, PublishReport, RunObserver};
use crate::ui::progress::UploadProgress;
use clap::Args;
use std::env;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Flags for `publish`; each one overrides the matching play.toml value
#[derive(Debug, Clone, Default, Args)]
pub struct PublishArgs {
  /// Config file (default: play.toml, .play.toml or .config/play.toml)
  #[arg(long)]
  pub config: Option<PathBuf>,

  /// Application id, e.g. com.example.app
  #[arg(long)]
  pub package: Option<String>,

  // ==========================================================================
  // Artifacts
  // ==========================================================================
  /// Primary apk (path or glob matching exactly one file)
  #[arg(long)]
  pub apk: Option<String>,
  /// Additional apks (path or glob, repeatable)
  #[arg(long = "additional-apk")]
  pub additional_apks: Vec<String>,
  /// Primary app bundle (path or glob matching exactly one file)
  #[arg(long)]
  pub bundle: Option<String>,
  /// Additional app bundles (path or glob, repeatable)
  #[arg(long = "additional-bundle")]
  pub additional_bundles: Vec<String>,
  /// Upload an expansion file with the primary apk
  #[arg(long)]
  pub apk_expansion: bool,
  /// Upload expansion files with additional apks
  #[arg(long)]
  pub additional_apk_expansion: bool,
  /// ProGuard/R8 mapping file, attached to the first uploaded version code
  #[arg(long)]
  pub mapping: Option<String>,
  /// Publish listings and release notes only
  #[arg(long)]
  pub listing_only: bool,

  // ==========================================================================
  // Release
  // ==========================================================================
  /// Track to update (default: internal)
  #[arg(long)]
  pub track: Option<String>,
  /// Fraction of users receiving the release, 0.0 to 1.0
  #[arg(long)]
  pub rollout: Option<f64>,
  /// In-app update priority, 0 to 5
  #[arg(long, allow_negative_numbers = true)]
  pub priority: Option<i64>,
  /// Which of the track's current version codes survive the update
  #[arg(long, value_enum)]
  pub filter: Option<FilterKind>,
  /// Version codes (list) or regular expression (expression) to exclude
  #[arg(long)]
  pub filter_value: Option<String>,
  /// Release name shown in the console
  #[arg(long)]
  pub release_name: Option<String>,
  /// Create the release as a draft
  #[arg(long)]
  pub draft: bool,
  /// Commit without sending the changes for review
  #[arg(long)]
  pub changes_not_sent_for_review: bool,

  // ==========================================================================
  // Metadata
  // ==========================================================================
  /// Push listings and release notes from the metadata directory
  #[arg(long)]
  pub metadata: bool,
  /// Per-locale metadata tree
  #[arg(long)]
  pub metadata_dir: Option<PathBuf>,
  /// Flat release-notes file (used without --metadata)
  #[arg(long)]
  pub changelog: Option<PathBuf>,
  /// Language of --changelog (default: en-US)
  #[arg(long)]
  pub language: Option<String>,

  // ==========================================================================
  // API
  // ==========================================================================
  /// API endpoint
  #[arg(long)]
  pub api_base: Option<String>,
  /// File holding an OAuth access token
  #[arg(long)]
  pub token_file: Option<PathBuf>,
  /// Never fall back to gcloud for a token
  #[arg(long)]
  pub no_gcloud: bool,
  /// Per-request timeout in seconds
  #[arg(long)]
  pub timeout: Option<u64>,

  /// Output the report in JSON format
  #[arg(long)]
  pub json: bool,
}

impl PublishArgs {
  /// Lay flags over file values
  pub fn apply_to(&self, config: &mut PlayConfig) {
    if let Some(package) = &self.package {
      config.app.package = Some(package.clone());
    }

    let artifacts = &mut config.artifacts;
    if let Some(apk) = &self.apk {
      artifacts.apk = Some(apk.clone());
    }
    if !self.additional_apks.is_empty() {
      artifacts.additional_apks = self.additional_apks.clone();
    }
    if let Some(bundle) = &self.bundle {
      artifacts.bundle = Some(bundle.clone());
    }
    if !self.additional_bundles.is_empty() {
      artifacts.additional_bundles = self.additional_bundles.clone();
    }
    artifacts.apk_expansion |= self.apk_expansion;
    artifacts.additional_apk_expansion |= self.additional_apk_expansion;
    if let Some(mapping) = &self.mapping {
      artifacts.mapping = Some(mapping.clone());
    }
    artifacts.listing_only |= self.listing_only;

    let release = &mut config.release;
    if let Some(track) = &self.track {
      release.track = Some(track.clone());
    }
    if let Some(rollout) = self.rollout {
      release.rollout_fraction = Some(rollout);
    }
    if let Some(priority) = self.priority {
      release.update_priority = Some(priority);
    }
    if let Some(filter) = self.filter {
      release.filter = filter;
    }
    if let Some(value) = &self.filter_value {
      release.filter_value = Some(value.clone());
    }
    if let Some(name) = &self.release_name {
      release.release_name = Some(name.clone());
    }
    release.draft |= self.draft;
    release.changes_not_sent_for_review |= self.changes_not_sent_for_review;

    let metadata = &mut config.metadata;
    metadata.attach |= self.metadata;
    if let Some(dir) = &self.metadata_dir {
      metadata.dir = Some(dir.clone());
    }
    if let Some(changelog) = &self.changelog {
      metadata.changelog = Some(changelog.clone());
    }
    if let Some(language) = &self.language {
      metadata.language = Some(language.clone());
    }

    let api = &mut config.api;
    if let Some(base) = &self.api_base {
      api.base = Some(base.clone());
    }
    if let Some(file) = &self.token_file {
      api.token_file = Some(file.clone());
    }
    if self.no_gcloud {
      api.gcloud = false;
    }
    if let Some(timeout) = self.timeout {
      api.timeout_secs = Some(timeout);
    }
  }
}

/// Run the publish command
pub fn run_publish(args: PublishArgs) -> PlayResult<()> {
  let root = env::current_dir().context("Failed to get current directory")?;

  let mut config = PlayConfig::load(&root, args.config.as_deref())?;
  args.apply_to(&mut config);

  // all local validation happens before credentials and before the edit is opened
  let plan = config.resolve(&root)?;

  let token_file = config.api.token_file.as_ref().map(|p| root.join(p));
  let token = CredentialSources::from_env(token_file.as_deref(), config.api.gcloud).resolve()?;

  let api = HttpPlayApi::new(config.api.base(), token, config.api.timeout())
    .map_err(|e| PlayError::message(format!("Failed to build HTTP client: {}", e)))?;
  debug!(base = config.api.base(), "publishing API");

  let runtime = tokio::runtime::Builder::new_current_thread()
    .enable_all()
    .build()
    .context("Failed to start async runtime")?;

  if !args.json {
    print_plan(&plan);
  }

  let mut observer: Box<dyn RunObserver> = if UploadProgress::wanted(plan.artifacts.len(), args.json) {
    Box::new(UploadProgress::new(plan.artifacts.len()))
  } else {
    Box::new(Silent)
  };

  let report = runtime.block_on(orchestrator::run(&api, &plan, observer.as_mut()))?;

  if args.json {
    println!(
      "{}",
      serde_json::to_string_pretty(&report).map_err(|e| PlayError::message(format!("Serialization error: {}", e)))?
    );
  } else {
    print_report(&report, &root);
  }

  Ok(())
}

fn print_plan(plan: &PublishPlan) {
  println!("🚀 Publishing {} to '{}'", plan.package, plan.track.track);
  if plan.is_listing_only() {
    println!("   listing only, no binaries");
  } else {
    println!("   {} artifact(s), filter: {}", plan.artifacts.len(), plan.track.policy);
  }
}

fn print_report(report: &PublishReport, root: &Path) {
  println!("\n✅ Committed edit {} for {}", report.edit_id, report.package);

  for uploaded in &report.uploaded {
    let path = uploaded.path.strip_prefix(root).unwrap_or(&uploaded.path);
    println!("   📦 {} → version code {}", path.display(), uploaded.version_code);
    if let Some(obb) = &uploaded.expansion_file {
      let obb = obb.strip_prefix(root).unwrap_or(obb);
      println!("      + expansion file {}", obb.display());
    }
  }

  if let Some(code) = report.mapping_version_code {
    println!("   🗺️  mapping file attached to {}", code);
  }
  if !report.listings_updated.is_empty() {
    println!("   📝 listings: {}", report.listings_updated.join(", "));
  }
  if !report.release_notes_languages.is_empty() {
    println!("   📝 release notes: {}", report.release_notes_languages.join(", "));
  }

  match &report.track {
    Some(track) => {
      let codes: Vec<String> = report.active_version_codes.iter().map(|c| c.to_string()).collect();
      println!("   🛤️  {}: [{}]", track, codes.join(", "));
      if let Some(status) = report.status {
        let fraction = report.rollout_fraction.unwrap_or(1.0);
        println!("      status {:?}, rollout {:.0}%", status, fraction * 100.0);
      }
    }
    None => println!("   🛤️  track unchanged"),
  }

  if !report.sent_for_review {
    println!("   ⏸️  changes not sent for review");
  }
}
