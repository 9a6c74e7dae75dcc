//! Shared implementation of the codevis command line tools. Each binary
//! parses its arguments with clap and calls into one module here.

pub mod create;
pub mod dump;
pub mod error;
pub mod loader;
pub mod merge;

use std::path::Path;
use std::process::ExitCode;

use codevis_core::errors::CodevisErrorCode;

pub use error::CliError;

/// Prints `[CODE] message` to stderr and returns a failing exit code.
pub fn report_failure(error: &CliError) -> ExitCode {
    eprintln!("{}", error.coded_string());
    ExitCode::FAILURE
}

/// Removes an existing `output` when `force` is set, refuses otherwise.
pub fn prepare_output(output: &Path, force: bool) -> Result<(), CliError> {
    if !output.exists() {
        return Ok(());
    }
    if !force {
        return Err(CliError::OutputExists {
            path: output.to_path_buf(),
        });
    }
    std::fs::remove_file(output).map_err(|e| CliError::io(output, e))
}
