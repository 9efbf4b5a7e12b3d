//! Change detection between stored state and live Confluence versions.
//!
//! This module provides the [`ChangeDetector`] for classifying pages, the
//! [`ChangeStatus`] enum for a single page's classification, and
//! [`SyncDelta`] for the full classified change set.

use chrono::{DateTime, Utc};
use std::collections::BTreeMap;

use super::{ExportState, PageRecord};

/// Version reported for a page whose metadata could not be read.
pub const UNKNOWN_VERSION: u64 = 0;

/// Classification of a page present in the live descriptors.
///
/// Deletions are found by [`ChangeDetector::compute_delta`] from tracked
/// pages missing upstream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeStatus {
    /// Not tracked, or tracked only as deleted.
    New,

    /// Tracked as active and needs re-export.
    Modified(ModifiedReason),

    /// Tracked as active, same version, not stale.
    Unchanged,
}

/// Why a page was classified as modified.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModifiedReason {
    /// Confluence reports a newer version.
    VersionChanged,
    /// Exported before the force marker.
    Stale,
    /// The live version could not be determined.
    Unverified,
}

/// Classified change set, one entry per page id in either input.
///
/// Every list is sorted by page id.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncDelta {
    pub new: Vec<String>,
    pub modified: Vec<String>,
    pub deleted: Vec<String>,
    pub unchanged: Vec<String>,
}

impl SyncDelta {
    /// Pages that need to be (re-)exported, in processing order.
    pub fn to_export(&self) -> impl Iterator<Item = &String> {
        self.new.iter().chain(self.modified.iter())
    }

    /// Whether applying this delta would change anything.
    pub fn has_changes(&self) -> bool {
        !(self.new.is_empty() && self.modified.is_empty() && self.deleted.is_empty())
    }

    /// Total number of classified pages.
    pub fn len(&self) -> usize {
        self.new.len() + self.modified.len() + self.deleted.len() + self.unchanged.len()
    }

    /// Whether no page was classified at all.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Classifies pages against stored state.
pub struct ChangeDetector<'a> {
    pages: &'a BTreeMap<String, PageRecord>,
    min_export_timestamp: Option<DateTime<Utc>>,
}

impl<'a> ChangeDetector<'a> {
    /// Create a new change detector.
    pub fn new(state: &'a ExportState) -> Self {
        Self {
            pages: &state.pages,
            min_export_timestamp: state.min_export_timestamp,
        }
    }

    /// Classify one page that is present in the live descriptors.
    pub fn check_page(&self, page_id: &str, live_version: u64) -> ChangeStatus {
        let stored = match self.pages.get(page_id) {
            Some(record) if record.is_active() => record,
            _ => return ChangeStatus::New,
        };

        if live_version == UNKNOWN_VERSION {
            return ChangeStatus::Modified(ModifiedReason::Unverified);
        }

        if live_version > stored.version {
            return ChangeStatus::Modified(ModifiedReason::VersionChanged);
        }

        match self.min_export_timestamp {
            Some(marker) if stored.last_exported < marker => {
                ChangeStatus::Modified(ModifiedReason::Stale)
            }
            _ => ChangeStatus::Unchanged,
        }
    }

    /// Compute the delta between stored state and live versions.
    pub fn compute_delta(&self, live: &BTreeMap<String, u64>) -> SyncDelta {
        let mut delta = SyncDelta::default();

        for (page_id, &version) in live {
            match self.check_page(page_id, version) {
                ChangeStatus::New => delta.new.push(page_id.clone()),
                ChangeStatus::Modified(reason) => {
                    tracing::debug!("Page {} modified ({:?})", page_id, reason);
                    delta.modified.push(page_id.clone());
                }
                ChangeStatus::Unchanged => delta.unchanged.push(page_id.clone()),
            }
        }

        delta.deleted.extend(
            self.pages
                .iter()
                .filter(|(id, record)| record.is_active() && !live.contains_key(*id))
                .map(|(id, _)| id.clone()),
        );
        delta.deleted.sort();

        delta
    }
}

/// Convenience wrapper around [`ChangeDetector::compute_delta`].
pub fn compute_delta(state: &ExportState, live: &BTreeMap<String, u64>) -> SyncDelta {
    ChangeDetector::new(state).compute_delta(live)
}
