//! Markdown output.
//!
//! - [`path`] builds sanitized output paths
//! - [`markdown`] converts page HTML and assembles the file
//! - [`writer`] implements [`crate::source::PageRenderer`]

pub mod markdown;
pub mod path;
pub mod writer;

pub use markdown::{front_matter, html_to_markdown, render_document};
pub use path::{page_path, FilenameRules};
pub use writer::MarkdownRenderer;
