//! Settings schema.
//!
//! ```yaml
//! confluence:
//!   url: https://example.atlassian.net/wiki
//!   username: me@example.com
//!   api_token: ...
//!   personal_access_token: ...
//!   timeout_secs: 30
//! export:
//!   output_path: ./confluence-export
//!   filename_length: 255
//!   filename_encoding: {}
//!   include_breadcrumbs: true
//! ```

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;

/// Shown instead of secret values.
const MASK: &str = "********";

/// Root settings object.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub confluence: ConfluenceSettings,
    pub export: ExportSettings,
}

/// How to reach the Confluence instance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConfluenceSettings {
    /// Base URL; also the identity recorded in state files.
    pub url: Option<String>,

    /// Basic auth user.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,

    /// Basic auth token.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_token: Option<String>,

    /// Bearer token, used when no basic auth pair is set.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub personal_access_token: Option<String>,

    /// Request timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for ConfluenceSettings {
    fn default() -> Self {
        Self {
            url: None,
            username: None,
            api_token: None,
            personal_access_token: None,
            timeout_secs: 30,
        }
    }
}

/// Where and how files are written.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportSettings {
    /// Output directory; holds the state file.
    pub output_path: PathBuf,

    /// Maximum characters per path segment.
    pub filename_length: usize,

    /// Character replacements applied to every path segment.
    pub filename_encoding: BTreeMap<String, String>,

    /// Emit an ancestor breadcrumb line above the title.
    pub include_breadcrumbs: bool,
}

impl Default for ExportSettings {
    fn default() -> Self {
        Self {
            output_path: PathBuf::from("./confluence-export"),
            filename_length: 255,
            filename_encoding: BTreeMap::new(),
            include_breadcrumbs: true,
        }
    }
}

impl Settings {
    /// Copy with secret values replaced by a mask, for display.
    pub fn masked(&self) -> Self {
        let mask = |value: &Option<String>| value.as_ref().map(|_| MASK.to_string());

        let mut masked = self.clone();
        masked.confluence.api_token = mask(&self.confluence.api_token);
        masked.confluence.personal_access_token = mask(&self.confluence.personal_access_token);
        masked
    }
}
