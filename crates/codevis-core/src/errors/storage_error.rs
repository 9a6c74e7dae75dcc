//! Storage errors.

use std::path::PathBuf;

use super::error_code::{self, CodevisErrorCode};

/// Errors raised while reading or writing a persisted code database.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("SQLite error: {message}")]
    SqliteError { message: String },

    #[error("Migration failed at version {version}: {message}")]
    MigrationFailed { version: u32, message: String },

    #[error("Database not found: {path}")]
    NotFound { path: PathBuf },

    #[error("Unsupported schema version {found} (newest known is {supported})")]
    SchemaVersion { found: u32, supported: u32 },

    #[error("Dangling reference in {table}: id {id} does not exist")]
    DanglingReference { table: &'static str, id: i64 },

    #[error("IO error on {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
}

impl StorageError {
    pub fn sqlite(e: impl std::fmt::Display) -> Self {
        Self::SqliteError {
            message: e.to_string(),
        }
    }
}

impl CodevisErrorCode for StorageError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::MigrationFailed { .. } => error_code::MIGRATION_FAILED,
            Self::NotFound { .. } => error_code::DB_NOT_FOUND,
            Self::SchemaVersion { .. } | Self::DanglingReference { .. } => error_code::SCHEMA_ERROR,
            _ => error_code::STORAGE_ERROR,
        }
    }
}
