//! Settings discovery and loading.
//!
//! The settings file is found in this order:
//! 1. `--config <file>`
//! 2. `CME_CONFIG`
//! 3. `$HOME/.cme/config.yml`
//!
//! Environment overrides are applied on top of whatever the file said.

use std::fs;
use std::path::{Path, PathBuf};

use crate::config::schema::Settings;
use crate::error::{CmeError, Result};

/// Environment variable naming the settings file.
pub const CONFIG_ENV: &str = "CME_CONFIG";

/// Environment variables that override individual settings.
pub const ENV_OVERRIDES: [&str; 5] = [
    "CME_CONFLUENCE_URL",
    "CME_USERNAME",
    "CME_API_TOKEN",
    "CME_PAT",
    "CME_OUTPUT_PATH",
];

/// Default settings file location, if a home directory is known.
pub fn default_config_path() -> Option<PathBuf> {
    let home = std::env::var_os("HOME").filter(|h| !h.is_empty())?;
    Some(PathBuf::from(home).join(".cme").join("config.yml"))
}

/// Pick the settings file path.
///
/// An explicit path wins, then `CME_CONFIG`, then the default location.
pub fn resolve_config_path(explicit: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit {
        return Some(path.to_path_buf());
    }
    if let Some(path) = std::env::var_os(CONFIG_ENV).filter(|p| !p.is_empty()) {
        return Some(PathBuf::from(path));
    }
    default_config_path()
}

/// Load one settings file.
///
/// # Errors
///
/// Returns `ConfigNotFound` if the file doesn't exist.
/// Returns `ConfigParseError` if the YAML is invalid.
pub fn load_settings_file(path: &Path) -> Result<Settings> {
    let content = fs::read_to_string(path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            CmeError::ConfigNotFound {
                path: path.to_path_buf(),
            }
        } else {
            CmeError::Io(e)
        }
    })?;

    parse_settings(&content, path)
}

/// Parse YAML content into settings.
pub fn parse_settings(content: &str, source_path: &Path) -> Result<Settings> {
    if content.trim().is_empty() {
        return Ok(Settings::default());
    }

    serde_yaml::from_str(content).map_err(|e| CmeError::ConfigParseError {
        path: source_path.to_path_buf(),
        message: e.to_string(),
    })
}

/// Apply environment overrides using `lookup` to read variables.
pub fn apply_env_overrides<F>(settings: &mut Settings, lookup: F)
where
    F: Fn(&str) -> Option<String>,
{
    let get = |name: &str| lookup(name).filter(|v| !v.is_empty());

    if let Some(url) = get("CME_CONFLUENCE_URL") {
        settings.confluence.url = Some(url);
    }
    if let Some(username) = get("CME_USERNAME") {
        settings.confluence.username = Some(username);
    }
    if let Some(token) = get("CME_API_TOKEN") {
        settings.confluence.api_token = Some(token);
    }
    if let Some(pat) = get("CME_PAT") {
        settings.confluence.personal_access_token = Some(pat);
    }
    if let Some(output) = get("CME_OUTPUT_PATH") {
        settings.export.output_path = PathBuf::from(output);
    }
}

/// Load settings from the resolved file and the process environment.
///
/// A missing file is only an error when it was named explicitly; otherwise
/// defaults plus environment overrides are used.
pub fn load_settings(explicit: Option<&Path>) -> Result<Settings> {
    let mut settings = match resolve_config_path(explicit) {
        Some(path) => match load_settings_file(&path) {
            Ok(settings) => {
                tracing::debug!("Loaded settings from {}", path.display());
                settings
            }
            Err(CmeError::ConfigNotFound { .. }) if explicit.is_none() => {
                tracing::debug!("No settings file at {}; using defaults", path.display());
                Settings::default()
            }
            Err(e) => return Err(e),
        },
        None => Settings::default(),
    };

    apply_env_overrides(&mut settings, |name| std::env::var(name).ok());
    Ok(settings)
}
