//! Error types for cme operations.
//!
//! This module defines [`CmeError`], the primary error type used throughout
//! the application, and a [`Result`] type alias for convenience.
//!
//! # Error Handling Strategy
//!
//! - Use `CmeError` for domain-specific errors that need distinct handling
//! - Use `anyhow::Error` (via `CmeError::Other`) for unexpected errors
//! - All errors should provide actionable messages for users
//!
//! Only [`CmeError::PageFetch`] and [`CmeError::PageForbidden`] are recovered
//! locally (the sync run skips the page and continues). Everything else
//! aborts the command.

use std::path::PathBuf;
use thiserror::Error;

/// Core error type for cme operations.
#[derive(Debug, Error)]
pub enum CmeError {
    /// The state file belongs to a different Confluence instance.
    #[error(
        "Confluence URL mismatch: state file has '{stored}' but current configuration has '{current}'. \
         Point the export at the original instance or use a fresh output directory."
    )]
    IdentityMismatch { stored: String, current: String },

    /// No state file exists where one is required.
    #[error(
        "No state file found in {path}. Run an export command first to create the initial state."
    )]
    MissingState { path: PathBuf },

    /// An export targets a directory that already has a state file.
    #[error(
        "A state file already exists in {path}. Use 'cme sync' to incrementally update, \
         or pass '--append' to add a new scope to the existing state."
    )]
    ScopeConflict { path: PathBuf },

    /// The state file was written with a schema this build does not understand.
    #[error("Unsupported state schema version {found} in {path} (expected {expected})")]
    UnsupportedSchema {
        path: PathBuf,
        found: u32,
        expected: u32,
    },

    /// The state file exists but cannot be parsed.
    #[error("Failed to parse state file {path}: {message}")]
    StateParse { path: PathBuf, message: String },

    /// A single page could not be fetched or written.
    #[error("Failed to export page {page_id}: {message}")]
    PageFetch { page_id: String, message: String },

    /// A single page is no longer visible to the configured user.
    #[error("Page {page_id} is not accessible")]
    PageForbidden { page_id: String },

    /// Writing the state file failed; state integrity can't be guaranteed.
    #[error("Failed to persist state to {path}: {source}")]
    Persist {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Configuration file not found at expected location.
    #[error("Configuration not found: {path}")]
    ConfigNotFound { path: PathBuf },

    /// Failed to parse configuration file.
    #[error("Failed to parse config at {path}: {message}")]
    ConfigParseError { path: PathBuf, message: String },

    /// Invalid configuration structure or values.
    #[error("Invalid configuration: {message}")]
    ConfigValidationError { message: String },

    /// Confluence answered with a non-success status.
    #[error("Confluence API returned HTTP {status} for {url}")]
    Api { status: u16, url: String },

    /// Transport-level HTTP failure.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// IO error wrapper.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic wrapped error for anyhow interop.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Result type alias for cme operations.
pub type Result<T> = std::result::Result<T, CmeError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identity_mismatch_displays_both_urls() {
        let err = CmeError::IdentityMismatch {
            stored: "https://old.example.com".into(),
            current: "https://new.example.com".into(),
        };
        let msg = err.to_string();
        assert!(msg.contains("https://old.example.com"));
        assert!(msg.contains("https://new.example.com"));
    }

    #[test]
    fn missing_state_points_at_export() {
        let err = CmeError::MissingState {
            path: PathBuf::from("/out"),
        };
        let msg = err.to_string();
        assert!(msg.contains("/out"));
        assert!(msg.contains("export command"));
    }

    #[test]
    fn scope_conflict_suggests_sync_and_append() {
        let err = CmeError::ScopeConflict {
            path: PathBuf::from("/out"),
        };
        let msg = err.to_string();
        assert!(msg.contains("cme sync"));
        assert!(msg.contains("--append"));
    }

    #[test]
    fn unsupported_schema_displays_versions() {
        let err = CmeError::UnsupportedSchema {
            path: PathBuf::from("/out/.cme-state.json"),
            found: 7,
            expected: 1,
        };
        let msg = err.to_string();
        assert!(msg.contains('7'));
        assert!(msg.contains("expected 1"));
    }

    #[test]
    fn persist_keeps_io_source() {
        let err = CmeError::Persist {
            path: PathBuf::from("/out/.cme-state.json"),
            source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        };
        assert!(std::error::Error::source(&err).is_some());
        assert!(err.to_string().contains("denied"));
    }

    #[test]
    fn api_error_displays_status() {
        let err = CmeError::Api {
            status: 500,
            url: "https://wiki/rest/api/space".into(),
        };
        assert!(err.to_string().contains("500"));
    }

    #[test]
    fn io_error_converts_from_std() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file missing");
        let err: CmeError = io_err.into();
        assert!(matches!(err, CmeError::Io(_)));
    }
}
