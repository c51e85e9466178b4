//! Configuration validation rules.
//!
//! - The conda distribution name must not be empty
//! - The pip batch size must be at least one

use crate::config::schema::TraceConfig;
use crate::error::{Result, TraceError};

/// Validation error with context.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    /// Rule identifier
    pub rule: String,
    /// Human-readable error message
    pub message: String,
}

/// Validate a configuration and return all errors.
pub fn validate_config(config: &TraceConfig) -> Vec<ValidationError> {
    let mut errors = Vec::new();

    if config.conda.name.trim().is_empty() {
        errors.push(ValidationError {
            rule: "empty-name".to_string(),
            message: "conda.name must not be empty".to_string(),
        });
    }

    if config.conda.pip_batch_size == 0 {
        errors.push(ValidationError {
            rule: "zero-batch".to_string(),
            message: "conda.pip_batch_size must be at least 1".to_string(),
        });
    }

    errors
}

/// Validate a configuration, failing with all messages joined.
pub fn validate(config: &TraceConfig) -> Result<()> {
    let errors = validate_config(config);

    if errors.is_empty() {
        Ok(())
    } else {
        let messages: Vec<_> = errors.iter().map(|e| e.message.clone()).collect();
        Err(TraceError::ConfigValidationError {
            message: messages.join("; "),
        })
    }
}
