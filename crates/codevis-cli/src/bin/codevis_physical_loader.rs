//! Loads the physical graph around a component, package or package group
//! and prints its vertices and edges.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{ArgGroup, Parser};
use codevis_cli::loader::print_physical_graph;
use codevis_cli::{report_failure, CliError};
use codevis_core::tracing::init_tracing;
use codevis_model::loader::{LoadFlags, LoadTarget};

#[derive(Parser)]
#[command(name = "codevis_physical_loader")]
#[command(version, about = "Print the physical graph around one node", long_about = None)]
#[command(group(ArgGroup::new("target").required(true).args(["component", "package", "group"])))]
struct Cli {
    /// Database to load from.
    database: PathBuf,

    /// Qualified name of a component.
    #[arg(long)]
    component: Option<String>,

    /// Qualified name of a package.
    #[arg(long)]
    package: Option<String>,

    /// Qualified name of a package group.
    #[arg(long)]
    group: Option<String>,

    /// Also load the direct providers.
    #[arg(long = "fwdDeps")]
    fwd_deps: bool,

    /// Also load the direct clients.
    #[arg(long = "revDeps")]
    rev_deps: bool,

    /// Also load what the children depend on outside the node.
    #[arg(long = "extDeps")]
    ext_deps: bool,
}

fn main() -> ExitCode {
    init_tracing();
    let cli = Cli::parse();
    let (target, name) = match (cli.component, cli.package, cli.group) {
        (Some(name), _, _) => (LoadTarget::Component, name),
        (_, Some(name), _) => (LoadTarget::Package, name),
        (_, _, Some(name)) => (LoadTarget::Group, name),
        (None, None, None) => {
            return report_failure(&CliError::Usage(
                "One of --component, --package or --group is required".to_string(),
            ))
        }
    };
    let flags = LoadFlags {
        fwd_deps: cli.fwd_deps,
        rev_deps: cli.rev_deps,
        ext_deps: cli.ext_deps,
    };
    match print_physical_graph(&cli.database, target, &name, flags, &mut std::io::stdout()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => report_failure(&e),
    }
}
