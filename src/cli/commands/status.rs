//! Status command implementation.
//!
//! The `cme status` command summarises an export directory's state file.
//! It never talks to Confluence.

use crate::cli::args::StatusArgs;
use crate::error::Result;
use crate::state::ExportState;
use crate::ui::{format_relative_time, UserInterface};

use super::dispatcher::{Command, CommandContext, CommandResult};

/// The status command implementation.
pub struct StatusCommand {
    context: CommandContext,
    args: StatusArgs,
}

impl StatusCommand {
    /// Create a new status command.
    pub fn new(context: CommandContext, args: StatusArgs) -> Self {
        Self { context, args }
    }

    /// Get the command arguments.
    pub fn args(&self) -> &StatusArgs {
        &self.args
    }
}

impl Command for StatusCommand {
    fn execute(&self, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        let output_dir = self.context.output_dir(self.args.output_path.as_deref());
        let state = ExportState::load_required(&output_dir)?;

        ui.show_header(&format!("Export status: {}", output_dir.display()));

        ui.message(&format!("Confluence:     {}", state.source_identity));
        if let Some(configured) = self.context.settings.confluence.url.as_deref() {
            if state.validate_identity(configured).is_err() {
                ui.warning(&format!(
                    "Configured URL '{}' does not match this export; sync will refuse to run",
                    configured
                ));
            }
        }
        ui.message(&format!("Schema version: {}", state.schema_version));

        ui.message("Scopes:");
        if state.scopes.is_empty() {
            ui.message("  (none)");
        }
        for scope in &state.scopes {
            ui.message(&format!("  {}", scope));
        }

        let summary = state.status_summary();
        ui.message(&format!(
            "Pages:          {} tracked ({} active, {} deleted)",
            summary.total, summary.active, summary.deleted
        ));

        if let Some(marker) = state.min_export_timestamp {
            ui.message(&format!(
                "Force marker:   {}",
                marker.format("%Y-%m-%d %H:%M:%S UTC")
            ));
        }

        match summary.last_exported {
            Some(last) => ui.message(&format!(
                "Last export:    {} ({})",
                last.format("%Y-%m-%d %H:%M"),
                format_relative_time(last)
            )),
            None => ui.message("Last export:    never"),
        }

        Ok(CommandResult::success())
    }
}
