//! `codevis_merge_databases`: fold several databases into one.

use std::io::Write;
use std::path::{Path, PathBuf};

use codevis_storage::merge_databases;

use crate::{prepare_output, CliError};

#[derive(Debug, Clone)]
pub struct MergeOptions {
    pub databases: Vec<PathBuf>,
    pub output: PathBuf,
    pub force: bool,
    pub silent: bool,
}

/// Output names must end in `db` and have something before the extension.
pub fn validate_output_name(output: &Path) -> Result<(), CliError> {
    let name = output.to_string_lossy();
    if name.len() <= 3 || !name.ends_with("db") {
        return Err(CliError::Usage(format!(
            "Output file must be a database ending in .db, got '{name}'"
        )));
    }
    Ok(())
}

/// Merges every input into the output. A failure part way leaves the sources
/// merged so far in the output file.
pub fn merge(options: &MergeOptions, out: &mut dyn Write) -> Result<(), CliError> {
    if options.databases.is_empty() {
        return Err(CliError::Usage("At least one --database is required".to_string()));
    }
    validate_output_name(&options.output)?;
    prepare_output(&options.output, options.force)?;

    let mut write_error = None;
    merge_databases(&options.databases, &options.output, |index, total, source| {
        if options.silent || write_error.is_some() {
            return;
        }
        if let Err(e) = writeln!(out, "[{} of {}] Loading data from {}", index + 1, total, source.display()) {
            write_error = Some(e);
        }
    })?;
    match write_error {
        Some(e) => Err(CliError::io(&options.output, e)),
        None => Ok(()),
    }
}
