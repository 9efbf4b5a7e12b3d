//! Settings loading, parsing, and validation.
//!
//! - Schema definitions in [`schema`]
//! - File discovery, loading and environment overrides in [`loader`]
//! - Validation in [`validator`]
//!
//! # Example
//!
//! ```
//! use cme::config::{parse_settings, validate};
//! use std::path::Path;
//!
//! let settings = parse_settings(
//!     "confluence:\n  url: https://wiki.example.com\n",
//!     Path::new("config.yml"),
//! )
//! .unwrap();
//! validate(&settings).unwrap();
//! assert_eq!(settings.export.filename_length, 255);
//! ```

pub mod loader;
pub mod schema;
pub mod validator;

pub use loader::{
    apply_env_overrides, default_config_path, load_settings, load_settings_file, parse_settings,
    resolve_config_path, CONFIG_ENV, ENV_OVERRIDES,
};
pub use schema::{ConfluenceSettings, ExportSettings, Settings};
pub use validator::{validate, validate_settings, ValidationError};
