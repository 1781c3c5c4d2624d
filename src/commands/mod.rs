//! CLI commands for play-rail
//!
//! - **publish**: open an edit, upload, update the track, commit
//! - **doctor**: validate configuration, credentials and metadata locally

pub mod doctor;
pub mod publish;

pub use doctor::run_doctor;
pub use publish::{PublishArgs, run_publish};
