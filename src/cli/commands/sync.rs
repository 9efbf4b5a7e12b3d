//! Sync command implementation.
//!
//! The `cme sync` command brings an existing export up to date.

use std::time::Instant;

use crate::cli::args::SyncArgs;
use crate::confluence::ConfluenceClient;
use crate::error::Result;
use crate::render::MarkdownRenderer;
use crate::source::{PageRenderer, PageSource};
use crate::sync::{SyncOptions, SyncOrchestrator};
use crate::ui::{format_duration, UserInterface};

use super::dispatcher::{Command, CommandContext, CommandResult};

/// The sync command implementation.
pub struct SyncCommand {
    context: CommandContext,
    args: SyncArgs,
}

impl SyncCommand {
    /// Create a new sync command.
    pub fn new(context: CommandContext, args: SyncArgs) -> Self {
        Self { context, args }
    }

    /// Get the command arguments.
    pub fn args(&self) -> &SyncArgs {
        &self.args
    }

    /// Run the sync against explicit collaborators.
    pub fn run(
        &self,
        source: &dyn PageSource,
        renderer: &dyn PageRenderer,
        ui: &mut dyn UserInterface,
    ) -> Result<CommandResult> {
        let identity = self.context.source_identity()?;
        let output_dir = self.context.output_dir(self.args.output_path.as_deref());
        let options = SyncOptions {
            force: self.args.force,
            dry_run: self.args.dry_run,
        };

        ui.show_header(&format!("Syncing {}", output_dir.display()));
        let started = Instant::now();

        let orchestrator = SyncOrchestrator::new(source, renderer, output_dir);
        let outcome = orchestrator.run(&identity, options, ui)?;

        if options.dry_run {
            ui.message("Dry run: no files or state were changed");
        } else if !outcome.delta.has_changes() {
            ui.success("Already up to date");
        } else {
            ui.success(&format!(
                "{} in {}",
                outcome.summary(),
                format_duration(started.elapsed())
            ));
        }

        if outcome.failed > 0 {
            ui.warning(&format!(
                "{} pages could not be exported and will be retried on the next sync",
                outcome.failed
            ));
        }

        Ok(CommandResult::success())
    }
}

impl Command for SyncCommand {
    fn execute(&self, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        let client = ConfluenceClient::from_settings(&self.context.settings.confluence)?;
        let renderer = MarkdownRenderer::new(&self.context.settings.export);
        self.run(&client, &renderer, ui)
    }
}
