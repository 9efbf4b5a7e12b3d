//! Command dispatching.
//!
//! This module provides the core command infrastructure:
//! - [`Command`] trait for implementing commands
//! - [`CommandResult`] for uniform result reporting
//! - [`CommandContext`] for the settings every command resolves against
//! - [`CommandDispatcher`] for routing CLI subcommands

use std::path::{Path, PathBuf};

use crate::cli::args::{Cli, Commands, ExportRequest, ExportTarget};
use crate::config::{load_settings, validate, Settings};
use crate::error::Result;
use crate::state::ScopeKind;
use crate::ui::UserInterface;

/// Trait for command implementations.
///
/// Each CLI subcommand implements this trait to provide its execution logic.
pub trait Command {
    /// Execute the command.
    ///
    /// # Arguments
    ///
    /// * `ui` - User interface for displaying output
    ///
    /// # Returns
    ///
    /// A [`CommandResult`] indicating success/failure and exit code.
    fn execute(&self, ui: &mut dyn UserInterface) -> Result<CommandResult>;
}

/// Result of command execution.
#[derive(Debug)]
pub struct CommandResult {
    /// Whether the command succeeded.
    pub success: bool,

    /// Exit code to use (0 for success, non-zero for failure).
    pub exit_code: i32,
}

impl CommandResult {
    /// Create a successful result.
    pub fn success() -> Self {
        Self {
            success: true,
            exit_code: 0,
        }
    }

    /// Create a failure result.
    pub fn failure(exit_code: i32) -> Self {
        Self {
            success: false,
            exit_code,
        }
    }
}

/// Resolved settings shared by the commands.
#[derive(Debug, Clone, Default)]
pub struct CommandContext {
    pub settings: Settings,
}

impl CommandContext {
    pub fn new(settings: Settings) -> Self {
        Self { settings }
    }

    /// Output directory, preferring a command-line override.
    pub fn output_dir(&self, override_path: Option<&Path>) -> PathBuf {
        override_path
            .map(Path::to_path_buf)
            .unwrap_or_else(|| self.settings.export.output_path.clone())
    }

    /// The configured Confluence URL, after validating the settings.
    pub fn source_identity(&self) -> Result<String> {
        validate(&self.settings)?;
        Ok(self
            .settings
            .confluence
            .url
            .as_deref()
            .map(str::trim)
            .unwrap_or_default()
            .to_string())
    }
}

/// Dispatches CLI commands to their implementations.
pub struct CommandDispatcher {
    config_path: Option<PathBuf>,
}

impl CommandDispatcher {
    /// Create a dispatcher reading settings from `config_path` (or the
    /// default location).
    pub fn new(config_path: Option<PathBuf>) -> Self {
        Self { config_path }
    }

    fn context(&self) -> Result<CommandContext> {
        Ok(CommandContext::new(load_settings(self.config_path.as_deref())?))
    }

    /// Dispatch and execute a command.
    ///
    /// Routes the CLI subcommand to the appropriate command implementation
    /// and executes it.
    pub fn dispatch(&self, cli: &Cli, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        match &cli.command {
            Commands::Pages(args) => {
                self.export(ScopeKind::Pages, &args.pages, &args.target, ui)
            }
            Commands::PagesWithDescendants(args) => self.export(
                ScopeKind::PagesWithDescendants,
                &args.pages,
                &args.target,
                ui,
            ),
            Commands::Spaces(args) => self.export(ScopeKind::Spaces, &args.keys, &args.target, ui),
            Commands::AllSpaces(args) => self.export(ScopeKind::AllSpaces, &[], &args.target, ui),
            Commands::Sync(args) => {
                let cmd = super::sync::SyncCommand::new(self.context()?, args.clone());
                cmd.execute(ui)
            }
            Commands::Status(args) => {
                let cmd = super::status::StatusCommand::new(self.context()?, args.clone());
                cmd.execute(ui)
            }
            Commands::Config(args) => {
                let cmd = super::config::ConfigCommand::new(
                    self.context()?,
                    self.config_path.clone(),
                    args.clone(),
                );
                cmd.execute(ui)
            }
            Commands::Completions(args) => {
                let cmd = super::completions::CompletionsCommand::new(args.clone());
                cmd.execute(ui)
            }
        }
    }

    fn export(
        &self,
        kind: ScopeKind,
        args: &[String],
        target: &ExportTarget,
        ui: &mut dyn UserInterface,
    ) -> Result<CommandResult> {
        let request = ExportRequest {
            kind,
            args: args.to_vec(),
            target: target.clone(),
        };
        let cmd = super::export::ExportCommand::new(self.context()?, request);
        cmd.execute(ui)
    }
}
