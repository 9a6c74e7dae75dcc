//! Scanner errors.

use std::path::PathBuf;

use super::error_code::{self, CodevisErrorCode};

/// Errors that can occur while scanning a single translation unit.
#[derive(Debug, thiserror::Error)]
pub enum ScanError {
    #[error("IO error scanning {path}: {source}")]
    IoError {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Tree-sitter error parsing {path}: {message}")]
    ParserError { path: PathBuf, message: String },

    #[error("Scan cancelled")]
    Cancelled,
}

impl CodevisErrorCode for ScanError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::Cancelled => error_code::CANCELLED,
            _ => error_code::SCAN_ERROR,
        }
    }
}
