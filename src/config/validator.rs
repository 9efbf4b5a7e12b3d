//! Settings validation.

use crate::config::schema::Settings;
use crate::error::{CmeError, Result};

/// A single validation problem.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    pub field: &'static str,
    pub message: String,
}

/// Collect every problem with the settings.
pub fn validate_settings(settings: &Settings) -> Vec<ValidationError> {
    let mut errors = Vec::new();

    match settings.confluence.url.as_deref().map(str::trim) {
        None | Some("") => errors.push(ValidationError {
            field: "confluence.url",
            message: "is required (set it in the config file or CME_CONFLUENCE_URL)".into(),
        }),
        Some(url) if !(url.starts_with("http://") || url.starts_with("https://")) => {
            errors.push(ValidationError {
                field: "confluence.url",
                message: format!("must start with http:// or https:// (got '{}')", url),
            })
        }
        Some(_) => {}
    }

    if settings.export.filename_length == 0 {
        errors.push(ValidationError {
            field: "export.filename_length",
            message: "must be greater than 0".into(),
        });
    }

    errors
}

/// Validate settings, returning the first problems as one error.
///
/// # Errors
///
/// Returns `ConfigValidationError` if any validation rules fail.
pub fn validate(settings: &Settings) -> Result<()> {
    let errors = validate_settings(settings);
    if errors.is_empty() {
        return Ok(());
    }

    let message = errors
        .iter()
        .map(|e| format!("{} {}", e.field, e.message))
        .collect::<Vec<_>>()
        .join("; ");
    Err(CmeError::ConfigValidationError { message })
}
