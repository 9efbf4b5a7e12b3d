//! Git-status-style sync report.

use crate::state::{ExportState, SyncDelta};

/// Format one line per changed page followed by a summary line.
///
/// ```text
///   new:  Space/New Page.md
///   mod:  Space/Changed.md
///   del:  Space/Removed.md
/// 1 new, 1 modified, 1 deleted, 12 unchanged
/// ```
///
/// Pages without a recorded output path (new pages in a dry run) are shown
/// by id.
pub fn format_sync_report(delta: &SyncDelta, state: &ExportState) -> String {
    let mut lines = Vec::new();

    let sections = [
        ("new", &delta.new),
        ("mod", &delta.modified),
        ("del", &delta.deleted),
    ];
    for (label, ids) in sections {
        for page_id in ids {
            lines.push(format!("  {}:  {}", label, display_path(state, page_id)));
        }
    }

    lines.push(format_counts(delta));
    lines.join("\n")
}

/// Aggregate counts line.
pub fn format_counts(delta: &SyncDelta) -> String {
    format!(
        "{} new, {} modified, {} deleted, {} unchanged",
        delta.new.len(),
        delta.modified.len(),
        delta.deleted.len(),
        delta.unchanged.len()
    )
}

fn display_path(state: &ExportState, page_id: &str) -> String {
    state
        .page(page_id)
        .map(|record| record.output_path.clone())
        .unwrap_or_else(|| format!("page {}", page_id))
}
