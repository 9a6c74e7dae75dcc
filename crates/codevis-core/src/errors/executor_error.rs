//! Tool executor errors.

use super::error_code::{self, CodevisErrorCode};

/// Errors surfaced by a whole executor run.
#[derive(Debug, thiserror::Error)]
pub enum ExecutorError {
    /// Per-task failures, joined into one message in completion order.
    #[error("{failed} of {total} translation units failed:\n{message}")]
    TasksFailed {
        failed: usize,
        total: usize,
        message: String,
    },

    #[error("Failed to build worker pool: {message}")]
    PoolBuild { message: String },

    #[error("Run cancelled after {completed} of {total} translation units")]
    Cancelled { completed: usize, total: usize },
}

impl CodevisErrorCode for ExecutorError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::Cancelled { .. } => error_code::CANCELLED,
            _ => error_code::EXECUTOR_ERROR,
        }
    }
}
