//! Merge errors.

use std::path::PathBuf;

use super::error_code::{self, CodevisErrorCode};
use super::StorageError;

/// A failed merge names the source that broke it. Sources merged before
/// the failure stay in the output database.
#[derive(Debug, thiserror::Error)]
pub enum MergeError {
    #[error("Error opening database {path}: {source}")]
    ReadFailed {
        path: PathBuf,
        #[source]
        source: StorageError,
    },

    #[error("Error writing {source_path} into {output}: {source}")]
    WriteFailed {
        source_path: PathBuf,
        output: PathBuf,
        #[source]
        source: StorageError,
    },

    #[error("Nothing to merge")]
    NoSources,
}

impl CodevisErrorCode for MergeError {
    fn error_code(&self) -> &'static str {
        error_code::MERGE_ERROR
    }
}
