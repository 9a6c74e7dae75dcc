//! `codevis_create_codebase_db`: scan a compilation database into a new
//! code database, or update one written by an earlier scan.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use codevis_analysis::{loaded_state, scan_changes, CompilationDatabase, FileChanges, Tool};
use codevis_core::config::{CliOverrides, CodevisConfig};
use codevis_core::errors::ExecutorError;
use codevis_core::Diagnostics;
use codevis_model::ObjectStore;
use codevis_storage::{SqliteReader, SqliteWriter};
use tracing::{info, warn};

use crate::{prepare_output, CliError};

#[derive(Debug, Clone, Default)]
pub struct CreateOptions {
    pub compile_commands: Vec<PathBuf>,
    pub output: PathBuf,
    /// Source root. Defaults to the deepest directory holding every file.
    pub source_path: Option<PathBuf>,
    pub ignore: Vec<String>,
    pub non_lakosian: Vec<PathBuf>,
    /// `(path regex, group)` pairs.
    pub package_mappings: Vec<(String, String)>,
    pub jobs: Option<usize>,
    pub physical_only: bool,
    /// Package by directory instead of by Lakosian naming rules.
    pub no_lakos_rules: bool,
    /// Bring an existing output database up to date instead of refusing it.
    pub update: bool,
    pub force: bool,
    pub silent: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CreateReport {
    pub output: PathBuf,
    pub translation_units: usize,
    pub files: usize,
    pub types: usize,
    /// Combined message of the translation units that failed.
    pub failures: Option<String>,
    /// What an update found changed. None when the database was built afresh.
    pub changes: Option<FileChanges>,
}

/// Appends `.db` unless the name already has it.
pub fn database_path(output: &Path) -> PathBuf {
    if output.to_string_lossy().ends_with(".db") {
        output.to_path_buf()
    } else {
        let mut name = output.as_os_str().to_os_string();
        name.push(".db");
        PathBuf::from(name)
    }
}

/// Deepest directory that contains every path. Empty when they share nothing.
pub fn common_parent<'a>(paths: impl IntoIterator<Item = &'a Path>) -> PathBuf {
    let mut common: Option<PathBuf> = None;
    for path in paths {
        let dir = path.parent().unwrap_or(path);
        common = Some(match common {
            None => dir.to_path_buf(),
            Some(current) => current
                .components()
                .zip(dir.components())
                .take_while(|(a, b)| a == b)
                .map(|(a, _)| a)
                .collect(),
        });
    }
    common.unwrap_or_default()
}

/// Runs the scan and writes the database. Translation units that fail are
/// reported in the result; everything else that goes wrong is an error.
pub fn create_codebase_db(options: &CreateOptions) -> Result<CreateReport, CliError> {
    if options.compile_commands.is_empty() {
        return Err(CliError::Usage("--compile-commands is required".to_string()));
    }
    if options.update && options.force {
        return Err(CliError::Usage("--update and --force cannot be set together".to_string()));
    }
    let output = database_path(&options.output);
    let updating = options.update && output.exists();
    if !updating {
        prepare_output(&output, options.force)?;
    }

    let mut database = CompilationDatabase::new();
    for path in &options.compile_commands {
        database.add_compilation_database(path)?;
    }

    let source_path = match &options.source_path {
        Some(path) => Some(std::fs::canonicalize(path).map_err(|_| {
            CliError::Usage(format!("Given source path doesn't exist: '{}'", path.display()))
        })?),
        None => None,
    };
    let prefix = source_path.clone().unwrap_or_else(|| common_parent(database.files()));
    let overrides = CliOverrides {
        scan_threads: options.jobs,
        scan_prefix: Some(prefix.clone()),
        scan_ignore_globs: options.ignore.clone(),
        scan_physical_only: options.physical_only.then_some(true),
        scan_lakosian_rules: options.no_lakos_rules.then_some(false),
        output_database: Some(output.clone()),
        output_force: Some(options.force),
    };
    let mut config = CodevisConfig::load(&prefix, Some(&overrides))?;
    config.scan.non_lakosian_dirs.extend(options.non_lakosian.iter().cloned());
    config.scan.third_party_dirs.extend(options.package_mappings.iter().cloned());

    let mut diagnostics = Diagnostics::new().with_debug_output(config.scan.effective_debug_output());
    if !options.silent {
        diagnostics = diagnostics.with_callback(|message, _thread| println!("{message}"));
    }
    let tool = Tool::from_config(database, &config.scan, Arc::new(diagnostics))?;
    info!(
        translation_units = tool.database().len(),
        threads = tool.threads(),
        prefix = %prefix.display(),
        "scanning"
    );

    let store = ObjectStore::new();
    let (result, changes) = if updating {
        store.read_from_database(&SqliteReader::new(), &output)?;
        store.set_state(loaded_state(&store));
        let changes = scan_changes(&store, tool.database(), tool.constants());
        (tool.run_update(&store, &changes), Some(changes))
    } else {
        (tool.run_full(&store), None)
    };
    let failures = match result {
        Ok(_) => None,
        Err(ExecutorError::TasksFailed { message, .. }) => {
            warn!("some translation units failed; writing what was extracted");
            Some(message)
        }
        Err(e) => return Err(e.into()),
    };

    if updating {
        replace_database(&store, &output)?;
    } else {
        let mut writer = SqliteWriter::create_or_open(&output)?;
        store.write_to_database(&mut writer)?;
    }

    Ok(CreateReport {
        output,
        translation_units: tool.database().len(),
        files: store.files().len(),
        types: store.types().len(),
        failures,
        changes,
    })
}

/// Writes the store to a fresh file next to `output`, then moves it over
/// `output`. Rows of removed entities would otherwise survive in place.
fn replace_database(store: &ObjectStore, output: &Path) -> Result<(), CliError> {
    let mut staging = output.as_os_str().to_os_string();
    staging.push(".partial");
    let staging = PathBuf::from(staging);
    if staging.exists() {
        std::fs::remove_file(&staging).map_err(|e| CliError::io(&staging, e))?;
    }
    {
        let mut writer = SqliteWriter::create_or_open(&staging)?;
        store.write_to_database(&mut writer)?;
    }
    std::fs::rename(&staging, output).map_err(|e| CliError::io(output, e))?;
    info!(output = %output.display(), "database updated");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn db_extension_is_added_once() {
        assert_eq!(database_path(Path::new("out")), PathBuf::from("out.db"));
        assert_eq!(database_path(Path::new("out.db")), PathBuf::from("out.db"));
    }

    #[test]
    fn common_parent_of_files() {
        let files = [
            Path::new("/src/groups/abc/abcx/abcx_thing.cpp"),
            Path::new("/src/groups/def/defy/defy_widget.cpp"),
        ];
        assert_eq!(common_parent(files), PathBuf::from("/src/groups"));
        assert_eq!(common_parent([Path::new("/src/a.cpp")]), PathBuf::from("/src"));
        assert_eq!(common_parent(Vec::<&Path>::new()), PathBuf::new());
    }
}
