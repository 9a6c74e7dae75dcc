//! Prints a sorted, diffable text report of a code database.

use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use codevis_cli::dump::dump_database;
use codevis_cli::{report_failure, CliError};
use codevis_core::tracing::init_tracing;

#[derive(Parser)]
#[command(name = "codevis_dump_database")]
#[command(version, about = "Dump a code database as sorted text", long_about = None)]
struct Cli {
    /// Database to dump.
    database: PathBuf,
}

fn main() -> ExitCode {
    init_tracing();
    let cli = Cli::parse();
    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    let result = dump_database(&cli.database, &mut out)
        .and_then(|()| out.flush().map_err(|e| CliError::Io { path: cli.database.clone(), source: e }));
    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => report_failure(&e),
    }
}
