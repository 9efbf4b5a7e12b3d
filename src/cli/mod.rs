//! Command-line interface for cme.
//!
//! - [`args`] - Argument definitions using clap derive macros
//! - [`commands`] - Command implementations

pub mod args;
pub mod commands;

pub use args::{
    AllSpacesArgs, Cli, Commands, CompletionsArgs, ConfigArgs, ExportArgs, ExportRequest,
    ExportTarget, SpacesArgs, StatusArgs, SyncArgs,
};
pub use commands::{Command, CommandContext, CommandDispatcher, CommandResult};
