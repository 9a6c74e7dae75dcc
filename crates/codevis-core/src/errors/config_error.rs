//! Configuration errors.

use super::error_code::{self, CodevisErrorCode};

/// Failures reading `codevis.toml` or applying command line overrides.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Config file not readable: {path}")]
    FileNotFound { path: String },

    #[error("Config parse error in {path}: {message}")]
    ParseError { path: String, message: String },

    #[error("Config validation failed for {field}: {message}")]
    ValidationFailed { field: String, message: String },
}

impl CodevisErrorCode for ConfigError {
    fn error_code(&self) -> &'static str {
        error_code::CONFIG_ERROR
    }
}
