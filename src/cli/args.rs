//! CLI argument definitions.
//!
//! This module defines all CLI arguments using clap's derive macros.
//! The main entry point is the [`Cli`] struct.

use clap::{Parser, Subcommand};
use clap_complete::Shell;
use std::path::PathBuf;

use crate::state::ScopeKind;

/// cme - Export Confluence pages to Markdown with incremental sync.
#[derive(Debug, Parser)]
#[command(name = "cme")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to settings file (overrides ~/.cme/config.yml)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Show verbose output
    #[arg(short, long, global = true, conflicts_with = "quiet")]
    pub verbose: bool,

    /// Minimal output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Enable debug logging
    #[arg(long, global = true)]
    pub debug: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Export individual pages
    Pages(ExportArgs),

    /// Export pages and all of their descendants
    PagesWithDescendants(ExportArgs),

    /// Export every page of one or more spaces
    Spaces(SpacesArgs),

    /// Export every page of every global space
    AllSpaces(AllSpacesArgs),

    /// Bring an existing export up to date
    Sync(SyncArgs),

    /// Show what an export directory contains (no network access)
    Status(StatusArgs),

    /// Show resolved settings
    Config(ConfigArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

/// Options shared by every export command.
#[derive(Debug, Clone, Default, clap::Args)]
pub struct ExportTarget {
    /// Output directory (overrides export.output_path)
    #[arg(short, long)]
    pub output_path: Option<PathBuf>,

    /// Add this export to an existing state file
    #[arg(long)]
    pub append: bool,
}

/// Arguments for `pages` and `pages-with-descendants`.
#[derive(Debug, Clone, clap::Args)]
pub struct ExportArgs {
    /// Page ids or page URLs
    #[arg(required = true, value_name = "PAGE")]
    pub pages: Vec<String>,

    #[command(flatten)]
    pub target: ExportTarget,
}

/// Arguments for `spaces`.
#[derive(Debug, Clone, clap::Args)]
pub struct SpacesArgs {
    /// Space keys
    #[arg(required = true, value_name = "KEY")]
    pub keys: Vec<String>,

    #[command(flatten)]
    pub target: ExportTarget,
}

/// Arguments for `all-spaces`.
#[derive(Debug, Clone, Default, clap::Args)]
pub struct AllSpacesArgs {
    #[command(flatten)]
    pub target: ExportTarget,
}

/// Arguments for the `sync` command.
#[derive(Debug, Clone, Default, clap::Args)]
pub struct SyncArgs {
    /// Output directory (overrides export.output_path)
    #[arg(short, long)]
    pub output_path: Option<PathBuf>,

    /// Re-export every tracked page
    #[arg(short, long)]
    pub force: bool,

    /// Show what would change without writing anything
    #[arg(long)]
    pub dry_run: bool,
}

/// Arguments for the `status` command.
#[derive(Debug, Clone, Default, clap::Args)]
pub struct StatusArgs {
    /// Output directory (overrides export.output_path)
    #[arg(short, long)]
    pub output_path: Option<PathBuf>,
}

/// Arguments for the `config` command.
#[derive(Debug, Clone, Default, clap::Args)]
pub struct ConfigArgs {
    /// Output as JSON instead of YAML
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the `completions` command.
#[derive(Debug, Clone, clap::Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    pub shell: Shell,
}

/// A parsed export request.
#[derive(Debug, Clone)]
pub struct ExportRequest {
    pub kind: ScopeKind,
    pub args: Vec<String>,
    pub target: ExportTarget,
}
