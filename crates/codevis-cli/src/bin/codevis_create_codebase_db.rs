//! Scans a compilation database and writes a code database.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use codevis_cli::create::{create_codebase_db, CreateOptions};
use codevis_cli::{report_failure, CliError};
use codevis_core::tracing::init_tracing;

#[derive(Parser)]
#[command(name = "codevis_create_codebase_db")]
#[command(version, about = "Create a code database from compile_commands.json", long_about = None)]
struct Cli {
    /// Path to a compile_commands.json file. May be given more than once.
    #[arg(long = "compile-commands", visible_alias = "compile-commands-json", required = true)]
    compile_commands: Vec<PathBuf>,

    /// Output database file; `.db` is appended when missing.
    #[arg(long, short = 'o')]
    output: PathBuf,

    /// Source root. Defaults to the common parent of every translation unit.
    #[arg(long)]
    source_path: Option<PathBuf>,

    /// Ignore files whose name matches this glob. May be given more than once.
    /// Defaults to `*.t.cpp` when no glob is configured.
    #[arg(long)]
    ignore: Vec<String>,

    /// Treat packages under this directory as part of the non-lakosian group.
    #[arg(long = "non-lakosian")]
    non_lakosian: Vec<PathBuf>,

    /// Map paths matching a regex to a package group, as `REGEX:GROUP`.
    #[arg(long)]
    pkgmap: Vec<String>,

    /// Number of worker threads.
    #[arg(long, short = 'j')]
    jobs: Option<usize>,

    /// Only look for physical entities and relationships.
    #[arg(long)]
    physical_only: bool,

    /// Make every directory a package instead of following Lakosian rules.
    #[arg(long = "no-lakos-rules")]
    no_lakos_rules: bool,

    /// Update an existing output database, scanning only what changed.
    #[arg(long, conflicts_with = "force")]
    update: bool,

    /// Replace an existing output database.
    #[arg(long, visible_alias = "replace")]
    force: bool,

    /// Suppress progress output.
    #[arg(long)]
    silent: bool,
}

fn parse_mapping(mapping: &str) -> Result<(String, String), CliError> {
    match mapping.rsplit_once(':') {
        Some((pattern, group)) if !pattern.is_empty() && !group.is_empty() => Ok((
            pattern.trim_matches('"').to_string(),
            group.trim_matches('"').to_string(),
        )),
        _ => Err(CliError::Usage(format!("Invalid --pkgmap '{mapping}', expected REGEX:GROUP"))),
    }
}

fn run(cli: Cli) -> Result<(), CliError> {
    let package_mappings = cli
        .pkgmap
        .iter()
        .map(|m| parse_mapping(m))
        .collect::<Result<Vec<_>, _>>()?;
    let options = CreateOptions {
        compile_commands: cli.compile_commands,
        output: cli.output,
        source_path: cli.source_path,
        ignore: cli.ignore,
        non_lakosian: cli.non_lakosian,
        package_mappings,
        jobs: cli.jobs,
        physical_only: cli.physical_only,
        no_lakos_rules: cli.no_lakos_rules,
        update: cli.update,
        force: cli.force,
        silent: cli.silent,
    };
    let report = create_codebase_db(&options)?;
    if let Some(failures) = &report.failures {
        eprintln!("{failures}");
    }
    if let (Some(changes), false) = (&report.changes, options.silent) {
        println!(
            "{} new, {} modified, {} deleted files",
            changes.new_files.len(),
            changes.modified_files.len(),
            changes.deleted_files.len()
        );
    }
    if !options.silent {
        println!(
            "Wrote {} ({} translation units, {} files, {} types)",
            report.output.display(),
            report.translation_units,
            report.files,
            report.types
        );
    }
    Ok(())
}

fn main() -> ExitCode {
    init_tracing();
    match run(Cli::parse()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => report_failure(&e),
    }
}
