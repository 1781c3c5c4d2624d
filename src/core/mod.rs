//! Core building blocks shared by every command
//!
//! - **config**: play.toml discovery, parsing and validation into a publish plan
//! - **error**: error taxonomy with exit codes and contextual help messages

pub mod config;
pub mod error;
