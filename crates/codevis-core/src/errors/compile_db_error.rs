//! Compilation database errors.

use std::path::PathBuf;

use super::error_code::{self, CodevisErrorCode};

#[derive(Debug, thiserror::Error)]
pub enum CompilationDatabaseError {
    #[error("Error loading compilation database {path}: {message}")]
    ErrorLoadingFromFile { path: PathBuf, message: String },

    #[error("Compilation database {path} contains no files")]
    CompileCommandsContainsNoFiles { path: PathBuf },

    #[error("Compilation database {path} contains no commands")]
    CompileCommandsContainsNoCommands { path: PathBuf },
}

impl CodevisErrorCode for CompilationDatabaseError {
    fn error_code(&self) -> &'static str {
        error_code::COMPILE_DB_ERROR
    }
}
