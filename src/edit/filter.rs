//! Version-code filter: which codes stay active on a track
//!
//! `reconcile` is pure. Given the codes currently active on a track (in the
//! order the server reports them), the codes uploaded in this run (in upload
//! order) and a [`FilterPolicy`], it returns the codes the track should carry
//! after the update.

use crate::api::VersionCode;
use crate::core::error::InputError;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// How existing track codes are treated
#[derive(Debug, Clone)]
pub enum FilterPolicy {
  /// Replace the track's codes with the uploaded ones
  All,
  /// Keep current codes except these, then add the uploaded ones
  ExcludeList(BTreeSet<VersionCode>),
  /// Keep current codes whose decimal form does not fully match, then add the uploaded ones
  ExcludeExpression(VersionCodePattern),
}

/// Selector used in flags and config files
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum FilterKind {
  #[default]
  All,
  List,
  Expression,
}

/// Regular expression matched against the whole decimal string of a code
#[derive(Debug, Clone)]
pub struct VersionCodePattern {
  source: String,
  regex: Regex,
}

impl VersionCodePattern {
  pub fn new(pattern: &str) -> Result<Self, InputError> {
    let regex = Regex::new(&format!("^(?:{})$", pattern)).map_err(|e| InputError::InvalidFilter {
      value: pattern.to_string(),
      reason: e.to_string(),
    })?;
    Ok(Self {
      source: pattern.to_string(),
      regex,
    })
  }

  /// True when the code's base-10 string matches end to end
  pub fn matches(&self, code: VersionCode) -> bool {
    self.regex.is_match(&code.to_string())
  }

  pub fn as_str(&self) -> &str {
    &self.source
  }
}

impl FilterPolicy {
  /// Build a policy from its selector and raw value
  pub fn parse(kind: FilterKind, value: Option<&str>) -> Result<Self, InputError> {
    match kind {
      FilterKind::All => Ok(FilterPolicy::All),
      FilterKind::List => {
        let raw = required_value(kind, value)?;
        parse_code_list(raw).map(FilterPolicy::ExcludeList)
      }
      FilterKind::Expression => {
        let raw = required_value(kind, value)?;
        VersionCodePattern::new(raw).map(FilterPolicy::ExcludeExpression)
      }
    }
  }

  /// Whether reconciling needs the track's current codes
  pub fn needs_current_track(&self) -> bool {
    !matches!(self, FilterPolicy::All)
  }

  fn excludes(&self, code: VersionCode) -> bool {
    match self {
      FilterPolicy::All => true,
      FilterPolicy::ExcludeList(codes) => codes.contains(&code),
      FilterPolicy::ExcludeExpression(pattern) => pattern.matches(code),
    }
  }
}

impl fmt::Display for FilterPolicy {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      FilterPolicy::All => write!(f, "all"),
      FilterPolicy::ExcludeList(codes) => {
        let list: Vec<String> = codes.iter().map(|c| c.to_string()).collect();
        write!(f, "exclude [{}]", list.join(", "))
      }
      FilterPolicy::ExcludeExpression(pattern) => write!(f, "exclude /^{}$/", pattern.as_str()),
    }
  }
}

fn required_value(kind: FilterKind, value: Option<&str>) -> Result<&str, InputError> {
  match value.map(str::trim) {
    Some(v) if !v.is_empty() => Ok(v),
    _ => Err(InputError::MissingField {
      field: format!("version-code filter value for '{:?}' filter", kind).to_lowercase(),
    }),
  }
}

/// Parse a comma-separated list of positive version codes
pub fn parse_code_list(raw: &str) -> Result<BTreeSet<VersionCode>, InputError> {
  raw
    .split(',')
    .map(str::trim)
    .filter(|s| !s.is_empty())
    .map(|s| match s.parse::<VersionCode>() {
      Ok(0) | Err(_) => Err(InputError::InvalidFilter {
        value: s.to_string(),
        reason: "version codes must be positive integers".to_string(),
      }),
      Ok(code) => Ok(code),
    })
    .collect()
}

/// Compute the codes a track should carry
pub fn reconcile(current_active: &[VersionCode], uploaded: &[VersionCode], policy: &FilterPolicy) -> Vec<VersionCode> {
  if let FilterPolicy::All = policy {
    return uploaded.to_vec();
  }

  let mut kept: Vec<VersionCode> = current_active
    .iter()
    .copied()
    .filter(|code| !policy.excludes(*code))
    .collect();

  for code in uploaded {
    if !kept.contains(code) {
      kept.push(*code);
    }
  }

  kept
}
