//! Scope replay.
//!
//! Replays every recorded scope against a [`PageSource`] to find out which
//! pages the export currently covers and at which version.

use std::collections::BTreeMap;

use crate::error::Result;
use crate::source::PageSource;
use crate::state::{ScopeEntry, UNKNOWN_VERSION};

/// Replay scopes and merge the discovered versions by page id.
///
/// When a page appears in several scopes the highest version wins. An
/// unknown version never replaces a known one. Scopes with an unrecognised
/// command are skipped with a warning.
pub fn replay_scopes(source: &dyn PageSource, scopes: &[ScopeEntry]) -> Result<BTreeMap<String, u64>> {
    let mut merged: BTreeMap<String, u64> = BTreeMap::new();

    for scope in scopes {
        let Some(kind) = scope.kind() else {
            tracing::warn!("Unknown scope command: {}", scope.command);
            continue;
        };

        tracing::debug!("Replaying scope: {}", scope);
        let pages = source.list_pages(kind, &scope.args)?;
        tracing::debug!("Scope {} covers {} pages", scope, pages.len());

        for page in pages {
            match merged.get(&page.id) {
                Some(_) if page.version == UNKNOWN_VERSION => {}
                Some(&existing) if existing != UNKNOWN_VERSION && existing >= page.version => {}
                _ => {
                    merged.insert(page.id, page.version);
                }
            }
        }
    }

    Ok(merged)
}
