//! Errors surfaced by the command line tools.

use std::path::PathBuf;

use codevis_core::errors::{
    error_code, CodevisErrorCode, CompilationDatabaseError, ConfigError, ExecutorError, LoaderError, MergeError,
    StorageError,
};

pub const USAGE_ERROR: &str = "USAGE_ERROR";

#[derive(Debug, thiserror::Error)]
pub enum CliError {
    #[error("{0}")]
    Usage(String),

    #[error("{path} already exists. Use --force to overwrite it")]
    OutputExists { path: PathBuf },

    #[error("IO error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    CompilationDatabase(#[from] CompilationDatabaseError),

    #[error(transparent)]
    Executor(#[from] ExecutorError),

    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error(transparent)]
    Merge(#[from] MergeError),

    #[error(transparent)]
    Loader(#[from] LoaderError),
}

impl CliError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

impl CodevisErrorCode for CliError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::Usage(_) | Self::OutputExists { .. } => USAGE_ERROR,
            Self::Io { .. } => error_code::STORAGE_ERROR,
            Self::Config(e) => e.error_code(),
            Self::CompilationDatabase(e) => e.error_code(),
            Self::Executor(e) => e.error_code(),
            Self::Storage(e) => e.error_code(),
            Self::Merge(e) => e.error_code(),
            Self::Loader(e) => e.error_code(),
        }
    }
}
