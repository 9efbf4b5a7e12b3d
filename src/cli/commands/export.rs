//! Export commands.
//!
//! `cme pages`, `cme pages-with-descendants`, `cme spaces` and
//! `cme all-spaces` record their scope in the state file, then export every
//! page the scope currently covers.

use std::collections::HashSet;

use anyhow::anyhow;

use crate::cli::args::ExportRequest;
use crate::confluence::ConfluenceClient;
use crate::error::{CmeError, Result};
use crate::render::MarkdownRenderer;
use crate::source::{PageRenderer, PageSource};
use crate::state::{guard_export, parse_page_id, ExportState, ScopeEntry, ScopeKind};
use crate::sync::{PageOutcome, SyncOrchestrator, SyncOutcome};
use crate::ui::UserInterface;

use super::dispatcher::{Command, CommandContext, CommandResult};

/// The export command implementation.
pub struct ExportCommand {
    context: CommandContext,
    request: ExportRequest,
}

impl ExportCommand {
    /// Create a new export command.
    pub fn new(context: CommandContext, request: ExportRequest) -> Self {
        Self { context, request }
    }

    /// The scope this export records.
    ///
    /// Page URLs are reduced to their ids.
    pub fn scope(&self) -> Result<ScopeEntry> {
        let args = match self.request.kind {
            ScopeKind::Pages | ScopeKind::PagesWithDescendants => self
                .request
                .args
                .iter()
                .map(|arg| {
                    parse_page_id(arg).ok_or_else(|| {
                        CmeError::Other(anyhow!("'{}' is not a page id or page URL", arg))
                    })
                })
                .collect::<Result<Vec<_>>>()?,
            ScopeKind::Spaces | ScopeKind::AllSpaces => self.request.args.clone(),
        };
        Ok(ScopeEntry::for_kind(self.request.kind, args))
    }

    /// Run the export against explicit collaborators.
    pub fn run(
        &self,
        source: &dyn PageSource,
        renderer: &dyn PageRenderer,
        ui: &mut dyn UserInterface,
    ) -> Result<CommandResult> {
        let identity = self.context.source_identity()?;
        let output_dir = self
            .context
            .output_dir(self.request.target.output_path.as_deref());
        let scope = self.scope()?;

        let existing = ExportState::load(&output_dir)?;
        let mut state = guard_export(
            existing,
            &output_dir,
            scope.clone(),
            &identity,
            self.request.target.append,
        )?;
        state.save(&output_dir)?;

        ui.show_header(&format!("Exporting {}", scope));

        let mut spinner = ui.start_spinner("Discovering pages...");
        let pages = match source.list_pages(self.request.kind, &scope.args) {
            Ok(pages) => pages,
            Err(e) => {
                spinner.finish_error("Discovery failed");
                return Err(e);
            }
        };
        spinner.finish_clear();

        let mut seen = HashSet::new();
        let page_ids: Vec<String> = pages
            .into_iter()
            .filter(|page| seen.insert(page.id.clone()))
            .map(|page| page.id)
            .collect();
        tracing::debug!("Scope {} covers {} pages", scope, page_ids.len());

        let orchestrator = SyncOrchestrator::new(source, renderer, output_dir.clone());
        let mut outcome = SyncOutcome::default();
        let mut spinner = ui.start_spinner("Exporting pages...");

        for (index, page_id) in page_ids.iter().enumerate() {
            spinner.set_message(&format!(
                "Exporting page {} ({}/{})",
                page_id,
                index + 1,
                page_ids.len()
            ));
            let result = orchestrator.export_and_track(&mut state, page_id)?;
            match &result {
                PageOutcome::Exported { path } if ui.output_mode().shows_details() => {
                    ui.message(&format!("  {}", path));
                }
                PageOutcome::Failed(e) => ui.warning(&e.to_string()),
                _ => {}
            }
            outcome.record(&result);
        }
        spinner.finish_clear();

        ui.success(&format!(
            "Exported {} pages to {}",
            outcome.exported,
            output_dir.display()
        ));
        if outcome.failed > 0 {
            ui.warning(&format!(
                "{} pages failed; run 'cme sync' to retry them",
                outcome.failed
            ));
        }

        Ok(CommandResult::success())
    }
}

impl Command for ExportCommand {
    fn execute(&self, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        let client = ConfluenceClient::from_settings(&self.context.settings.confluence)?;
        let renderer = MarkdownRenderer::new(&self.context.settings.export);
        self.run(&client, &renderer, ui)
    }
}
