//! Error types for envtrace operations.
//!
//! This module defines [`TraceError`], the error type used throughout the
//! crate, and a [`Result`] type alias for convenience.
//!
//! # Error Handling Strategy
//!
//! - Discovery never fails as a whole: command and parse failures inside a
//!   tracer are turned into diagnostics and the offending record is skipped
//! - `TraceError` is propagated only by the outer layers (sessions, config
//!   loading, the CLI)
//! - Use `anyhow::Error` (via `TraceError::Other`) for unexpected errors

use std::path::PathBuf;
use thiserror::Error;

/// Core error type for envtrace operations.
#[derive(Debug, Error)]
pub enum TraceError {
    /// Configuration file not found at expected location.
    #[error("Configuration not found: {path}")]
    ConfigNotFound { path: PathBuf },

    /// Failed to parse configuration file.
    #[error("Failed to parse config at {path}: {message}")]
    ConfigParseError { path: PathBuf, message: String },

    /// Invalid configuration values.
    #[error("Invalid configuration: {message}")]
    ConfigValidationError { message: String },

    /// Command exited unsuccessfully.
    ///
    /// The captured stderr is part of the message so callers can match on
    /// tool-specific diagnostics.
    #[error("Command failed with exit code {code:?}: {command}: {stderr}")]
    CommandFailed {
        command: String,
        code: Option<i32>,
        stderr: String,
    },

    /// A package manifest could not be parsed or was incomplete.
    #[error("Invalid manifest {path}: {message}")]
    ManifestParse { path: PathBuf, message: String },

    /// IO error wrapper.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic wrapped error for anyhow interop.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Result type alias for envtrace operations.
pub type Result<T> = std::result::Result<T, TraceError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_not_found_displays_path() {
        let err = TraceError::ConfigNotFound {
            path: PathBuf::from("/foo/.envtrace.yml"),
        };
        assert!(err.to_string().contains("/foo/.envtrace.yml"));
    }

    #[test]
    fn config_parse_error_displays_path_and_message() {
        let err = TraceError::ConfigParseError {
            path: PathBuf::from("/config.yml"),
            message: "invalid syntax".into(),
        };
        let msg = err.to_string();
        assert!(msg.contains("/config.yml"));
        assert!(msg.contains("invalid syntax"));
    }

    #[test]
    fn command_failed_includes_stderr() {
        let err = TraceError::CommandFailed {
            command: "conda-env export -p /opt/conda".into(),
            code: Some(2),
            stderr: "error: unrecognized arguments: -p".into(),
        };
        let msg = err.to_string();
        assert!(msg.contains("conda-env export"));
        assert!(msg.contains("Some(2)"));
        assert!(msg.contains("unrecognized arguments: -p"));
    }

    #[test]
    fn manifest_parse_displays_path_and_message() {
        let err = TraceError::ManifestParse {
            path: PathBuf::from("/opt/conda/conda-meta/xz-5.2.json"),
            message: "missing field `build`".into(),
        };
        let msg = err.to_string();
        assert!(msg.contains("xz-5.2.json"));
        assert!(msg.contains("missing field"));
    }

    #[test]
    fn io_error_converts_from_std() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file missing");
        let err: TraceError = io_err.into();
        assert!(matches!(err, TraceError::Io(_)));
    }

    #[test]
    fn result_type_alias_works() {
        fn returns_error() -> Result<()> {
            Err(TraceError::ConfigValidationError {
                message: "conda.name must not be empty".into(),
            })
        }
        assert!(returns_error().is_err());
    }
}
