//! Edit transaction and track reconciliation engine
//!
//! - **filter**: pure version-code reconciliation under a `FilterPolicy`
//! - **expansion**: expansion-file discovery next to a package
//! - **upload**: artifact uploader
//! - **track**: track reconciler (fetch, filter, update)
//! - **session**: type-state handle over one remote edit
//! - **orchestrator**: one publish run, open to commit
//!
//! Everything here is sequential: each remote call is awaited before the
//! next one is issued, and the first failure ends the run without a commit.

pub mod expansion;
pub mod filter;
pub mod orchestrator;
pub mod session;
pub mod track;
pub mod upload;

pub use filter::{FilterKind, FilterPolicy};
pub use orchestrator::{PublishPlan, PublishReport, RunObserver};
pub use track::TrackRequest;
