//! `codevis_dump_database`: sorted text report of one database.

use std::io::Write;
use std::path::Path;

use codevis_model::dump::dump_store;
use codevis_model::ObjectStore;
use codevis_storage::SqliteReader;

use crate::CliError;

pub fn dump_database(path: &Path, out: &mut dyn Write) -> Result<(), CliError> {
    let store = ObjectStore::new();
    store.read_from_database(&SqliteReader::new(), path)?;
    dump_store(&store, out).map_err(|e| CliError::io(path, e))
}
