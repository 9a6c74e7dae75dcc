//! Seams between the object store and a persisted database.

use std::path::Path;

use codevis_core::errors::StorageError;

use crate::store::Registry;

/// Populates a registry from a database file.
pub trait DatabaseReader {
    fn read_into(&self, path: &Path, registry: &mut Registry) -> Result<(), StorageError>;
}

/// Writes a whole registry into an open database.
pub trait DatabaseWriter {
    fn write_from(&mut self, registry: &Registry) -> Result<(), StorageError>;
}
