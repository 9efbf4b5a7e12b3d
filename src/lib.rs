//! cme - Export Confluence pages to Markdown with incremental sync.
//!
//! An export records what it was asked for (its scope) and what it wrote in
//! a state file inside the output directory. `cme sync` replays those
//! scopes, works out which pages are new, modified, deleted or unchanged,
//! and applies only that delta.
//!
//! # Modules
//!
//! - [`cli`] - Command-line interface and argument parsing
//! - [`config`] - Settings loading, parsing, and validation
//! - [`confluence`] - Confluence REST client
//! - [`error`] - Error types and result aliases
//! - [`render`] - Markdown conversion and output paths
//! - [`source`] - Page source and renderer interfaces
//! - [`state`] - Export state, scopes, and change detection
//! - [`sync`] - The sync engine
//! - [`ui`] - Spinners and terminal output
//!
//! # Example
//!
//! ```
//! use cme::state::{compute_delta, ExportState};
//! use std::collections::BTreeMap;
//!
//! let mut state = ExportState::new("https://wiki.example.com");
//! state.upsert_page("12345", 3, "Docs/Home.md");
//!
//! let live: BTreeMap<String, u64> =
//!     [("12345".to_string(), 4), ("67890".to_string(), 1)].into_iter().collect();
//! let delta = compute_delta(&state, &live);
//!
//! assert_eq!(delta.modified, vec!["12345"]);
//! assert_eq!(delta.new, vec!["67890"]);
//! ```

pub mod cli;
pub mod config;
pub mod confluence;
pub mod error;
pub mod render;
pub mod source;
pub mod state;
pub mod sync;
pub mod ui;

pub use error::{CmeError, Result};
