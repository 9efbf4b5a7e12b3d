//! CLI command implementations.
//!
//! Each command implements the [`Command`] trait, which provides a uniform
//! interface for executing commands and reporting results. Commands are
//! routed by [`CommandDispatcher`].

pub mod completions;
pub mod config;
pub mod dispatcher;
pub mod export;
pub mod status;
pub mod sync;

pub use dispatcher::{Command, CommandContext, CommandDispatcher, CommandResult};
