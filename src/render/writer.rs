//! The production [`PageRenderer`].

use std::fs;
use std::path::Path;

use anyhow::anyhow;

use crate::config::ExportSettings;
use crate::error::Result;
use crate::source::{Document, PageRenderer};
use crate::sync::resolve_within;

use super::markdown::render_document;
use super::path::{page_path, FilenameRules};

/// Renders documents to Markdown files under the output directory.
#[derive(Debug, Clone, Default)]
pub struct MarkdownRenderer {
    rules: FilenameRules,
    include_breadcrumbs: bool,
}

impl MarkdownRenderer {
    pub fn new(settings: &ExportSettings) -> Self {
        Self {
            rules: FilenameRules::from_settings(settings),
            include_breadcrumbs: settings.include_breadcrumbs,
        }
    }
}

impl PageRenderer for MarkdownRenderer {
    fn output_path(&self, document: &Document) -> String {
        page_path(&self.rules, document)
    }

    fn render(&self, document: &Document) -> Result<String> {
        Ok(render_document(document, self.include_breadcrumbs))
    }

    fn write(&self, output_dir: &Path, relative_path: &str, markdown: &str) -> Result<()> {
        let target = resolve_within(output_dir, relative_path).ok_or_else(|| {
            anyhow!("refusing to write outside the output directory: {}", relative_path)
        })?;

        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&target, markdown)?;

        tracing::debug!("Wrote {}", target.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn write_creates_parents_and_overwrites() {
        let temp = TempDir::new().unwrap();
        let renderer = MarkdownRenderer::default();

        renderer.write(temp.path(), "Space/Sub/Page.md", "one").unwrap();
        renderer.write(temp.path(), "Space/Sub/Page.md", "two").unwrap();

        let content = fs::read_to_string(temp.path().join("Space/Sub/Page.md")).unwrap();
        assert_eq!(content, "two");
    }

    #[test]
    fn write_refuses_escape() {
        let temp = TempDir::new().unwrap();
        let renderer = MarkdownRenderer::default();

        assert!(renderer.write(temp.path(), "../outside.md", "x").is_err());
        assert!(!temp.path().parent().unwrap().join("outside.md").exists());
    }

    #[test]
    fn renderer_uses_settings() {
        let settings = ExportSettings {
            include_breadcrumbs: false,
            filename_length: 3,
            ..Default::default()
        };
        let renderer = MarkdownRenderer::new(&settings);
        let doc = Document {
            id: "1".into(),
            title: "Longer".into(),
            space_key: "DOCS".into(),
            ancestors: vec!["Home".into()],
            ..Default::default()
        };

        assert_eq!(renderer.output_path(&doc), "DOC/Hom/Lon.md");
        assert!(!renderer.render(&doc).unwrap().contains("Home"));
    }
}
