//! Collaborator interfaces for the sync engine.
//!
//! The engine never talks to Confluence or the filesystem layout directly.
//! It discovers and fetches pages through a [`PageSource`] and produces
//! output through a [`PageRenderer`], so tests can substitute in-memory
//! implementations.

use std::path::Path;
use thiserror::Error;

use crate::error::Result;
use crate::state::ScopeKind;

/// Lightweight page metadata returned by scope discovery.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageDescriptor {
    pub id: String,
    /// Confluence version, or [`crate::state::UNKNOWN_VERSION`] if it
    /// could not be read.
    pub version: u64,
}

/// Full page content as fetched for rendering.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Document {
    pub id: String,
    pub title: String,
    pub version: u64,
    pub space_key: String,
    pub space_name: String,
    /// Ancestor titles, root first.
    pub ancestors: Vec<String>,
    pub labels: Vec<String>,
    /// Rendered view HTML of the page body.
    pub body_html: String,
}

/// Why a page's content could not be fetched.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    #[error("page not found")]
    NotFound,
    #[error("access denied")]
    Forbidden,
    #[error("{0}")]
    Failed(String),
}

impl PageDescriptor {
    pub fn new(id: impl Into<String>, version: u64) -> Self {
        Self {
            id: id.into(),
            version,
        }
    }
}

/// Where pages come from.
pub trait PageSource {
    /// List the pages a scope currently covers, metadata only.
    ///
    /// Pages that are gone or not visible are omitted.
    fn list_pages(&self, kind: ScopeKind, args: &[String]) -> Result<Vec<PageDescriptor>>;

    /// Fetch a page's full content.
    fn fetch_content(&self, page_id: &str) -> std::result::Result<Document, FetchError>;
}

/// Turns documents into files.
pub trait PageRenderer {
    /// Output path for a document, relative to the output directory, with
    /// `/` separators.
    fn output_path(&self, document: &Document) -> String;

    /// Render a document to Markdown.
    fn render(&self, document: &Document) -> Result<String>;

    /// Write rendered Markdown, replacing any existing file.
    fn write(&self, output_dir: &Path, relative_path: &str, markdown: &str) -> Result<()>;
}
