//! Pre-publish diagnostics
//!
//! All checks implement the `Check` trait and run locally; none of them
//! opens an edit.
//!
//! # Built-in Checks
//!
//! - **config**: play.toml parses and resolves into a publish plan
//! - **credentials**: an access token can be resolved
//! - **metadata**: listings and release notes can be read
//!
//! # Example
//!
//! ```rust,ignore
//! use play_rail::checks::{CheckContext, create_default_runner};
//!
//! let ctx = CheckContext {
//!   root: PathBuf::from("."),
//!   config_path: None,
//! };
//!
//! for result in create_default_runner().run_all(&ctx) {
//!   if !result.passed {
//!     println!("❌ {}: {}", result.check_name, result.message);
//!   }
//! }
//! ```

mod config;
mod credentials;
mod metadata;
mod runner;
mod trait_def;

pub use runner::create_default_runner;
pub use trait_def::{CheckContext, CheckResult, Severity};
