//! Incremental sync engine.
//!
//! - [`replay`] rediscovers the pages covered by the recorded scopes
//! - [`orchestrator`] drives one load/discover/classify/apply pass
//! - [`report`] formats the git-status-style summary

pub mod orchestrator;
pub mod replay;
pub mod report;

pub use orchestrator::{
    resolve_within, PageOutcome, SyncOptions, SyncOrchestrator, SyncOutcome,
};
pub use replay::replay_scopes;
pub use report::{format_counts, format_sync_report};
