use std::sync::Arc;

use crate::enums::{ErrorKind, NodeKind};
use crate::lockable::{Entity, EntityState};

/// A diagnostic recorded during extraction.
#[derive(Default)]
pub struct ErrorData {
    pub kind: ErrorKind,
    pub message: String,
    pub file_name: String,
}

impl EntityState for ErrorData {
    const KIND: NodeKind = NodeKind::Error;
}

pub type ErrorObject = Entity<ErrorData>;
pub type ErrorRef = Arc<ErrorObject>;
