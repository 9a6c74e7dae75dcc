//! `codevis_physical_loader`: print the physical graph around one node.

use std::io::Write;
use std::path::Path;

use codevis_model::loader::{LoadFlags, LoadTarget, PhysicalLoader};
use codevis_model::ObjectStore;
use codevis_storage::SqliteReader;

use crate::CliError;

pub fn print_physical_graph(
    database: &Path,
    target: LoadTarget,
    qualified_name: &str,
    flags: LoadFlags,
    out: &mut dyn Write,
) -> Result<(), CliError> {
    let store = ObjectStore::new();
    store.read_from_database(&SqliteReader::new(), database)?;
    let graph = PhysicalLoader::new(&store).load_by_name(target, qualified_name, flags)?;

    let write = |e| CliError::io(database, e);
    writeln!(out, "Vertices ({}):", graph.vertex_count()).map_err(write)?;
    for (kind, name) in graph.vertices() {
        writeln!(out, "  {kind:?} {name}").map_err(write)?;
    }
    writeln!(out, "Edges ({}):", graph.edge_count()).map_err(write)?;
    for (source, target, kind) in graph.edges() {
        writeln!(out, "  {source} -> {target} [{kind:?}]").map_err(write)?;
    }
    Ok(())
}
