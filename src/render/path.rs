//! Output path construction and filename sanitizing.

use std::collections::BTreeMap;

use crate::config::ExportSettings;
use crate::source::Document;

const MARKDOWN_EXT: &str = ".md";

const RESERVED: [&str; 22] = [
    "CON", "PRN", "AUX", "NUL", "COM1", "COM2", "COM3", "COM4", "COM5", "COM6", "COM7", "COM8",
    "COM9", "LPT1", "LPT2", "LPT3", "LPT4", "LPT5", "LPT6", "LPT7", "LPT8", "LPT9",
];

/// Rules applied to every path segment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilenameRules {
    encoding: BTreeMap<char, String>,
    max_length: usize,
}

impl Default for FilenameRules {
    fn default() -> Self {
        Self {
            encoding: BTreeMap::new(),
            max_length: 255,
        }
    }
}

impl FilenameRules {
    /// Build rules from export settings.
    ///
    /// Encoding keys longer than one character are ignored.
    pub fn from_settings(settings: &ExportSettings) -> Self {
        let encoding = settings
            .filename_encoding
            .iter()
            .filter_map(|(key, value)| {
                let mut chars = key.chars();
                match (chars.next(), chars.next()) {
                    (Some(c), None) => Some((c, value.clone())),
                    _ => {
                        tracing::warn!("Ignoring filename_encoding key '{}': not a single character", key);
                        None
                    }
                }
            })
            .collect();

        Self {
            encoding,
            max_length: settings.filename_length.max(1),
        }
    }

    /// Sanitize one path segment.
    ///
    /// Mapped characters are replaced first. Path separators and control
    /// characters that survive the map become `_`. Trailing spaces and dots
    /// are trimmed, reserved device names get a `_` suffix, and the result
    /// is cut to the maximum length and trimmed again.
    pub fn sanitize(&self, name: &str) -> String {
        self.sanitize_to(name, self.max_length)
    }

    /// File name for a page title, `.md` included in the length limit.
    pub fn file_name(&self, title: &str, fallback: &str) -> String {
        let limit = self.max_length.saturating_sub(MARKDOWN_EXT.len()).max(1);
        let stem = match self.sanitize_to(title, limit) {
            stem if is_usable(&stem) => stem,
            _ => fallback.chars().take(limit).collect(),
        };
        format!("{}{}", stem, MARKDOWN_EXT)
    }

    fn sanitize_to(&self, name: &str, limit: usize) -> String {
        let mut out = String::with_capacity(name.len());
        for c in name.chars() {
            match self.encoding.get(&c) {
                Some(replacement) => out.push_str(replacement),
                None if c == '/' || c == '\\' || c.is_control() => out.push('_'),
                None => out.push(c),
            }
        }

        let mut out = out.trim_end_matches([' ', '.']).to_string();

        let stem = out.split('.').next().unwrap_or_default().to_uppercase();
        if RESERVED.contains(&stem.as_str()) {
            out.push('_');
        }

        let truncated: String = out.chars().take(limit).collect();
        truncated.trim_end_matches([' ', '.']).to_string()
    }

    fn segment(&self, name: &str, fallback: &str) -> String {
        let sanitized = self.sanitize(name);
        if is_usable(&sanitized) {
            sanitized
        } else {
            fallback.to_string()
        }
    }
}

fn is_usable(segment: &str) -> bool {
    !segment.is_empty() && segment != "." && segment != ".."
}

/// Relative output path for a document, `/`-separated.
///
/// `<space>/<ancestor titles...>/<title>.md`
pub fn page_path(rules: &FilenameRules, document: &Document) -> String {
    let mut segments = Vec::new();

    let space = if document.space_name.is_empty() {
        &document.space_key
    } else {
        &document.space_name
    };
    if !space.is_empty() {
        segments.push(rules.segment(space, "space"));
    }

    segments.extend(
        document
            .ancestors
            .iter()
            .map(|title| rules.segment(title, "untitled")),
    );

    let fallback = format!("page-{}", document.id);
    segments.push(rules.file_name(&document.title, &fallback));

    segments.join("/")
}
