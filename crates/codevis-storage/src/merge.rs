//! Folds several code databases into one.
//!
//! Sources are merged one at a time: each is read into a fresh store and
//! upserted into the output by qualified name. Every source write is its own
//! transaction, so a failure part way leaves the sources merged so far.

use std::path::{Path, PathBuf};

use codevis_core::errors::MergeError;
use codevis_core::tracing::metrics;
use codevis_model::ObjectStore;
use tracing::{info, info_span};

use crate::reader::SqliteReader;
use crate::writer::SqliteWriter;

/// Merges `sources` into `output`, calling `progress(index, total, source)`
/// before each source is written. The output is created if missing.
pub fn merge_databases(
    sources: &[PathBuf],
    output: &Path,
    mut progress: impl FnMut(usize, usize, &Path),
) -> Result<(), MergeError> {
    if sources.is_empty() {
        return Err(MergeError::NoSources);
    }
    let _span = info_span!("merge_databases", output = %output.display(), sources = sources.len()).entered();
    let total = sources.len();

    for (idx, source) in sources.iter().enumerate() {
        let store = ObjectStore::new();
        store
            .read_from_database(&SqliteReader::new(), source)
            .map_err(|source_err| MergeError::ReadFailed {
                path: source.clone(),
                source: source_err,
            })?;

        progress(idx, total, source);

        let write_failed = |err| MergeError::WriteFailed {
            source_path: source.clone(),
            output: output.to_path_buf(),
            source: err,
        };
        let mut writer = SqliteWriter::create_or_open(output).map_err(write_failed)?;
        store.write_to_database(&mut writer).map_err(write_failed)?;

        info!({ metrics::MERGE_INDEX } = idx, source = %source.display(), "source merged");
    }
    Ok(())
}

/// [`merge_databases`] without progress reporting.
pub fn merge_databases_silent(sources: &[PathBuf], output: &Path) -> Result<(), MergeError> {
    merge_databases(sources, output, |_, _, _| {})
}
