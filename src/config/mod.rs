//! Configuration loading, parsing, and validation.
//!
//! - Schema definitions in [`schema`]
//! - File discovery and loading in [`loader`]
//! - Layering in [`merger`]
//! - Validation in [`validator`]
//!
//! # Example
//!
//! ```
//! use envtrace::config::{load_config, OutputFormat};
//! use tempfile::TempDir;
//! use std::fs;
//!
//! let temp = TempDir::new().unwrap();
//! fs::write(temp.path().join(".envtrace.yml"), "settings:\n  format: json\n").unwrap();
//!
//! let config = load_config(temp.path(), None).unwrap();
//! assert_eq!(config.settings.format, OutputFormat::Json);
//! assert!(config.conda.trace_pip);
//! ```

pub mod loader;
pub mod merger;
pub mod schema;
pub mod validator;

pub use schema::{CondaSettings, OutputFormat, Settings, TraceConfig};

pub use loader::{
    find_config_file, load_config, load_config_value, ConfigPaths, CONFIG_FILE_NAME,
};

pub use merger::{deep_merge, merge_configs};

pub use validator::{validate, validate_config, ValidationError};
