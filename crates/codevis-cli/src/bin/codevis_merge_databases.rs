//! Merges several code databases into one.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use codevis_cli::merge::{merge, MergeOptions};
use codevis_cli::report_failure;
use codevis_core::tracing::init_tracing;

#[derive(Parser)]
#[command(name = "codevis_merge_databases")]
#[command(version, about = "Merge code databases", long_about = None)]
struct Cli {
    /// Input database. May be given more than once.
    #[arg(long = "database", required = true)]
    databases: Vec<PathBuf>,

    /// Output database; must end in `db`.
    #[arg(long)]
    output: PathBuf,

    /// Overwrite an existing output file.
    #[arg(long)]
    force: bool,

    /// Do not print progress.
    #[arg(long)]
    silent: bool,
}

fn main() -> ExitCode {
    init_tracing();
    let cli = Cli::parse();
    let options = MergeOptions {
        databases: cli.databases,
        output: cli.output,
        force: cli.force,
        silent: cli.silent,
    };
    match merge(&options, &mut std::io::stdout()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => report_failure(&e),
    }
}
