//! Physical loader errors.

use super::error_code::{self, CodevisErrorCode};

#[derive(Debug, thiserror::Error)]
pub enum LoaderError {
    #[error("No {kind} named '{qualified_name}' in the database")]
    NodeNotFound {
        kind: &'static str,
        qualified_name: String,
    },
}

impl CodevisErrorCode for LoaderError {
    fn error_code(&self) -> &'static str {
        error_code::LOADER_ERROR
    }
}
