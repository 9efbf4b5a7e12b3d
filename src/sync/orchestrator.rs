//! Sync orchestration.
//!
//! One [`SyncOrchestrator::run`] call is one sync pass:
//!
//! 1. Load the state and check it belongs to the configured instance
//! 2. Optionally set the force marker
//! 3. Replay scopes and classify the result
//! 4. Print the report
//! 5. Apply deletions, then exports, saving state after every page
//!
//! Single-page failures are recorded in the [`SyncOutcome`] and the run
//! continues. A failed state save aborts the run.

use std::fs;
use std::path::{Component, Path, PathBuf};

use crate::error::{CmeError, Result};
use crate::source::{FetchError, PageRenderer, PageSource};
use crate::state::{compute_delta, ExportState, SyncDelta};
use crate::ui::UserInterface;

use super::replay::replay_scopes;
use super::report::format_sync_report;

/// Options for a sync pass.
#[derive(Debug, Clone, Copy, Default)]
pub struct SyncOptions {
    /// Treat every page exported before now as stale.
    pub force: bool,
    /// Discover, classify and report only.
    pub dry_run: bool,
}

/// What happened to a single page during apply.
#[derive(Debug)]
pub enum PageOutcome {
    /// Written to `path` and tracked.
    Exported { path: String },
    /// Artifact removed and record marked deleted.
    Deleted,
    /// Not accessible and never tracked; nothing recorded.
    Skipped,
    /// Fetch, render or write failed; the page stays stale.
    Failed(CmeError),
}

/// Result of a sync pass.
#[derive(Debug, Default)]
pub struct SyncOutcome {
    pub delta: SyncDelta,
    pub exported: usize,
    pub deleted: usize,
    pub failed: usize,
    pub skipped: usize,
}

impl SyncOutcome {
    /// Count one page outcome.
    pub fn record(&mut self, outcome: &PageOutcome) {
        match outcome {
            PageOutcome::Exported { .. } => self.exported += 1,
            PageOutcome::Deleted => self.deleted += 1,
            PageOutcome::Skipped => self.skipped += 1,
            PageOutcome::Failed(_) => self.failed += 1,
        }
    }

    /// Closing summary line.
    pub fn summary(&self) -> String {
        format!(
            "{} exported, {} deleted, {} failed, {} skipped",
            self.exported, self.deleted, self.failed, self.skipped
        )
    }
}

/// Drives sync passes for one output directory.
pub struct SyncOrchestrator<'a> {
    source: &'a dyn PageSource,
    renderer: &'a dyn PageRenderer,
    output_dir: PathBuf,
}

impl<'a> SyncOrchestrator<'a> {
    /// Create an orchestrator for an output directory.
    pub fn new(
        source: &'a dyn PageSource,
        renderer: &'a dyn PageRenderer,
        output_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            source,
            renderer,
            output_dir: output_dir.into(),
        }
    }

    /// The output directory this orchestrator writes into.
    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Run one sync pass.
    pub fn run(
        &self,
        source_identity: &str,
        options: SyncOptions,
        ui: &mut dyn UserInterface,
    ) -> Result<SyncOutcome> {
        let mut state = ExportState::load_required(&self.output_dir)?;
        state.validate_identity(source_identity)?;

        if options.force && !options.dry_run {
            state.force_stale();
            state.save(&self.output_dir)?;
            tracing::info!("Force marker set; all tracked pages will be re-exported");
        } else if options.force {
            // Classify as if forced without touching the state file.
            state.force_stale();
        }

        let delta = self.plan(&state, ui)?;
        ui.message(&format_sync_report(&delta, &state));

        let mut outcome = SyncOutcome {
            delta,
            ..Default::default()
        };

        if options.dry_run {
            tracing::debug!("Dry run; skipping apply");
            return Ok(outcome);
        }

        self.apply(&mut state, &mut outcome, ui)?;
        Ok(outcome)
    }

    /// Discover and classify without applying anything.
    pub fn plan(&self, state: &ExportState, ui: &mut dyn UserInterface) -> Result<SyncDelta> {
        let mut spinner = ui.start_spinner("Discovering pages...");
        let live = match replay_scopes(self.source, &state.scopes) {
            Ok(live) => live,
            Err(e) => {
                spinner.finish_error("Discovery failed");
                return Err(e);
            }
        };
        spinner.finish_clear();

        tracing::debug!("Discovered {} pages across {} scopes", live.len(), state.scopes.len());
        Ok(compute_delta(state, &live))
    }

    fn apply(
        &self,
        state: &mut ExportState,
        outcome: &mut SyncOutcome,
        ui: &mut dyn UserInterface,
    ) -> Result<()> {
        for page_id in &outcome.delta.deleted.clone() {
            self.delete_page(state, page_id)?;
            outcome.record(&PageOutcome::Deleted);
        }

        let to_export: Vec<String> = outcome.delta.to_export().cloned().collect();
        let total = to_export.len();
        let mut spinner = ui.start_spinner("Exporting pages...");

        for (index, page_id) in to_export.iter().enumerate() {
            spinner.set_message(&format!("Exporting page {} ({}/{})", page_id, index + 1, total));
            let result = self.export_and_track(state, page_id)?;
            if let PageOutcome::Failed(e) = &result {
                ui.warning(&e.to_string());
            }
            outcome.record(&result);
        }

        if outcome.failed > 0 {
            spinner.finish_error(&format!("{} pages failed", outcome.failed));
        } else {
            spinner.finish_clear();
        }
        Ok(())
    }

    /// Fetch, render and write one page, then record it and save state.
    ///
    /// Only a failed state save is returned as an error; every other
    /// problem is reported through the [`PageOutcome`].
    pub fn export_and_track(&self, state: &mut ExportState, page_id: &str) -> Result<PageOutcome> {
        let document = match self.source.fetch_content(page_id) {
            Ok(document) => document,
            Err(FetchError::Forbidden) | Err(FetchError::NotFound) => {
                return self.handle_unreachable(state, page_id);
            }
            Err(FetchError::Failed(message)) => {
                tracing::warn!("Fetching page {} failed: {}", page_id, message);
                return Ok(PageOutcome::Failed(CmeError::PageFetch {
                    page_id: page_id.to_string(),
                    message,
                }));
            }
        };

        let relative = self.renderer.output_path(&document);
        let written = self
            .renderer
            .render(&document)
            .and_then(|markdown| self.renderer.write(&self.output_dir, &relative, &markdown));
        if let Err(e) = written {
            tracing::warn!("Writing page {} failed: {}", page_id, e);
            return Ok(PageOutcome::Failed(CmeError::PageFetch {
                page_id: page_id.to_string(),
                message: e.to_string(),
            }));
        }

        let previous_path = state
            .page(page_id)
            .filter(|record| record.is_active() && record.output_path != relative)
            .map(|record| record.output_path.clone());

        state.upsert_page(page_id, document.version, relative.clone());
        state.save(&self.output_dir)?;

        if let Some(old) = previous_path {
            tracing::debug!("Page {} moved from {} to {}", page_id, old, relative);
            if state.path_claimed_by_other(&old, page_id) {
                tracing::debug!("Keeping {}; another page now writes there", old);
            } else {
                self.remove_artifact(&old);
            }
        }

        tracing::debug!("Exported page {} (v{}) to {}", page_id, document.version, relative);
        Ok(PageOutcome::Exported { path: relative })
    }

    fn handle_unreachable(&self, state: &mut ExportState, page_id: &str) -> Result<PageOutcome> {
        if state.page(page_id).is_some_and(|record| record.is_active()) {
            tracing::info!("Page {} is no longer accessible; removing", page_id);
            self.delete_page(state, page_id)?;
            Ok(PageOutcome::Deleted)
        } else {
            let reason = CmeError::PageForbidden {
                page_id: page_id.to_string(),
            };
            tracing::warn!("{}; skipping", reason);
            Ok(PageOutcome::Skipped)
        }
    }

    fn delete_page(&self, state: &mut ExportState, page_id: &str) -> Result<()> {
        if let Some(path) = state.page(page_id).map(|record| record.output_path.clone()) {
            if !state.path_claimed_by_other(&path, page_id) {
                self.remove_artifact(&path);
            }
        }
        state.mark_deleted(page_id);
        state.save(&self.output_dir)?;
        tracing::debug!("Marked page {} deleted", page_id);
        Ok(())
    }

    fn remove_artifact(&self, relative: &str) {
        let Some(path) = resolve_within(&self.output_dir, relative) else {
            tracing::warn!("Refusing to delete file outside export directory: {}", relative);
            return;
        };

        match fs::remove_file(&path) {
            Ok(()) => tracing::debug!("Deleted {}", path.display()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!("Already gone: {}", path.display())
            }
            Err(e) => tracing::warn!("Could not delete {}: {}", path.display(), e),
        }
    }
}

/// Join a relative artifact path onto `root`, rejecting anything that would
/// land outside it.
///
/// The path is normalized lexically, so it works for files that no longer
/// exist. When `root` exists on disk, the deepest existing directory on the
/// way to the target is also resolved through symlinks and must stay under
/// the resolved root.
pub fn resolve_within(root: &Path, relative: &str) -> Option<PathBuf> {
    let mut parts: Vec<&std::ffi::OsStr> = Vec::new();

    for component in Path::new(relative).components() {
        match component {
            Component::Normal(part) => parts.push(part),
            Component::CurDir => {}
            Component::ParentDir => {
                parts.pop()?;
            }
            Component::RootDir | Component::Prefix(_) => return None,
        }
    }

    if parts.is_empty() {
        return None;
    }

    let mut path = root.to_path_buf();
    path.extend(parts);

    if escapes_through_links(root, &path) {
        return None;
    }
    Some(path)
}

fn escapes_through_links(root: &Path, path: &Path) -> bool {
    let Ok(real_root) = root.canonicalize() else {
        return false;
    };
    let Some(existing) = path.ancestors().skip(1).find(|dir| dir.exists()) else {
        return false;
    };

    match existing.canonicalize() {
        Ok(real) => !real.starts_with(&real_root),
        Err(_) => true,
    }
}
