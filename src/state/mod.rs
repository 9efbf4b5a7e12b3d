//! Export state management.
//!
//! This module provides the persistent state that makes repeated exports
//! incremental: tracked page versions, recorded scopes, and the delta
//! between stored state and what Confluence currently reports.

pub mod change_detection;
pub mod scope;
pub mod store;

pub use change_detection::{
    compute_delta, ChangeDetector, ChangeStatus, ModifiedReason, SyncDelta, UNKNOWN_VERSION,
};
pub use scope::{add_scope, guard_export, parse_page_id, ScopeAddition, ScopeEntry, ScopeKind};
pub use store::{ExportState, PageRecord, PageStatus, StatusSummary, STATE_FILENAME};
