//! Configuration loading and validation errors.

use super::error_code::{self, FwdetectErrorCode};

/// Errors raised while reading or validating `fwdetect.toml`.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Config file not found: {path}")]
    FileNotFound { path: String },

    #[error("Failed to parse {path}: {message}")]
    ParseError { path: String, message: String },

    #[error("Invalid value for {field}: {message}")]
    InvalidValue { field: String, message: String },

    #[error("Validation failed for {field}: {message}")]
    ValidationFailed { field: String, message: String },
}

impl FwdetectErrorCode for ConfigError {
    fn error_code(&self) -> &'static str {
        error_code::CONFIG_ERROR
    }
}
