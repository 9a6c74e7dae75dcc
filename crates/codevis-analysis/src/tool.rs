//! End-to-end extraction pipeline.

use std::sync::Arc;

use codevis_core::config::ScanConfig;
use codevis_core::errors::{ConfigError, ExecutorError};
use codevis_core::Diagnostics;
use codevis_model::{ObjectStore, State};
use tracing::{info, warn};

use crate::compile_db::CompilationDatabase;
use crate::constants::ToolConstants;
use crate::executor::{ExecutionSummary, ToolExecutor};
use crate::incremental::{affected_commands, drop_stale_files, FileChanges};
use crate::logical::LogicalScanner;
use crate::physical::PhysicalScanner;
use crate::postprocess::postprocess;

/// Runs the physical pass, the logical pass and post-processing over a
/// compilation database, filling an [`ObjectStore`] and keeping its
/// [`State`] current.
pub struct Tool {
    database: CompilationDatabase,
    constants: ToolConstants,
    diagnostics: Arc<Diagnostics>,
    executor: ToolExecutor,
    physical_only: bool,
}

impl Tool {
    pub fn new(
        database: CompilationDatabase,
        constants: ToolConstants,
        threads: usize,
        diagnostics: Arc<Diagnostics>,
    ) -> Self {
        Self {
            database,
            constants,
            executor: ToolExecutor::new(threads, Arc::clone(&diagnostics)),
            diagnostics,
            physical_only: false,
        }
    }

    pub fn from_config(
        database: CompilationDatabase,
        scan: &ScanConfig,
        diagnostics: Arc<Diagnostics>,
    ) -> Result<Self, ConfigError> {
        let constants = ToolConstants::from_config(scan)?;
        Ok(Self::new(database, constants, scan.effective_threads(), diagnostics)
            .with_physical_only(scan.effective_physical_only()))
    }

    pub fn with_physical_only(mut self, physical_only: bool) -> Self {
        self.physical_only = physical_only;
        self
    }

    pub fn database(&self) -> &CompilationDatabase {
        &self.database
    }

    pub fn constants(&self) -> &ToolConstants {
        &self.constants
    }

    pub fn threads(&self) -> usize {
        self.executor.threads()
    }

    /// Skips every translation unit of the current run that has not started.
    /// A cancel issued between runs applies to the next one.
    pub fn cancel_run(&self) {
        self.executor.cancel_run();
    }

    /// Files, packages, components and their include-derived dependencies.
    pub fn run_physical(&self, store: &ObjectStore) -> Result<ExecutionSummary, ExecutorError> {
        self.physical_pass(store, &self.database)
    }

    /// The physical pass followed, unless the tool is physical-only, by the
    /// logical pass and post-processing. Translation units that fail either
    /// pass do not stop the others: the state records the first pass that
    /// failed and every failure is returned after post-processing. A
    /// cancelled logical pass leaves the physical state in place.
    pub fn run_full(&self, store: &ObjectStore) -> Result<ExecutionSummary, ExecutorError> {
        self.run_passes(store, &self.database, &self.database)
    }

    /// Brings a store loaded from an earlier run up to date: drops the files
    /// in `changes` and everything that includes them, then scans only the
    /// translation units that lost data. The logical pass covers every
    /// translation unit when the store held no logical data before.
    pub fn run_update(&self, store: &ObjectStore, changes: &FileChanges) -> Result<ExecutionSummary, ExecutorError> {
        let old_state = store.state();
        let rescan = drop_stale_files(store, changes);
        let affected = affected_commands(&self.database, &self.constants, &rescan);
        info!(
            removed = rescan.len(),
            translation_units = affected.len(),
            "incremental update"
        );

        let physical = if matches!(old_state, State::PhysicalReady | State::AllReady | State::LogicalError) {
            &affected
        } else {
            &self.database
        };
        let logical = if old_state == State::AllReady { &affected } else { &self.database };
        self.run_passes(store, physical, logical)
    }

    fn physical_pass(
        &self,
        store: &ObjectStore,
        database: &CompilationDatabase,
    ) -> Result<ExecutionSummary, ExecutorError> {
        let scanner = PhysicalScanner::new(store, &self.constants, &self.diagnostics);
        let result = self.executor.execute(database, &scanner);
        match &result {
            Ok(_) => {
                if !matches!(store.state(), State::AllReady | State::LogicalError) {
                    store.set_state(State::PhysicalReady);
                }
            }
            Err(ExecutorError::Cancelled { .. }) => store.set_state(State::NoneReady),
            Err(e) => {
                warn!(error = %e, "physical pass failed");
                store.set_state(State::PhysicalError);
            }
        }
        result
    }

    fn run_passes(
        &self,
        store: &ObjectStore,
        physical_database: &CompilationDatabase,
        logical_database: &CompilationDatabase,
    ) -> Result<ExecutionSummary, ExecutorError> {
        let physical_failure = match self.physical_pass(store, physical_database) {
            Ok(summary) if self.physical_only => return Ok(summary),
            Ok(_) => None,
            Err(e @ ExecutorError::TasksFailed { .. }) if self.physical_only => return Err(e),
            Err(e @ ExecutorError::TasksFailed { .. }) => Some(e),
            Err(e) => return Err(e),
        };

        let scanner = LogicalScanner::new(store, &self.constants, &self.diagnostics);
        let logical = match self.executor.execute(logical_database, &scanner) {
            Ok(summary) => {
                if physical_failure.is_none() {
                    store.set_state(State::AllReady);
                }
                Ok(summary)
            }
            Err(e @ ExecutorError::Cancelled { .. }) => return Err(e),
            Err(e @ ExecutorError::TasksFailed { .. }) => {
                warn!(error = %e, "logical pass failed");
                if physical_failure.is_none() {
                    store.set_state(State::LogicalError);
                }
                Err(e)
            }
            Err(e) => {
                if physical_failure.is_none() {
                    store.set_state(State::LogicalError);
                }
                return Err(e);
            }
        };

        postprocess(store, &self.diagnostics);
        info!(
            translation_units = logical_database.len(),
            warnings = self.diagnostics.warning_count(),
            "extraction finished"
        );
        match (physical_failure, logical) {
            (None, logical) => logical,
            (Some(physical), Ok(_)) => Err(physical),
            (Some(physical), Err(logical)) => Err(combine_failures(physical, logical)),
        }
    }
}

/// Folds the physical pass failures into the logical pass failures.
fn combine_failures(physical: ExecutorError, logical: ExecutorError) -> ExecutorError {
    match (physical, logical) {
        (
            ExecutorError::TasksFailed {
                failed: physical_failed,
                total: physical_total,
                message: physical_message,
            },
            ExecutorError::TasksFailed { failed, total, message },
        ) => ExecutorError::TasksFailed {
            failed: physical_failed + failed,
            total: physical_total + total,
            message: physical_message + &message,
        },
        (_, logical) => logical,
    }
}

#[cfg(test)]
mod tests {
    use std::fs;
    use std::path::Path;

    use super::*;
    use crate::compile_db::CompileCommand;

    fn write(root: &Path, relative: &str, content: &str) {
        let path = root.join(relative);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    fn tool(root: &Path, files: &[&str]) -> Tool {
        let commands = files
            .iter()
            .map(|f| CompileCommand::new(root, root.join(f), vec!["c++".into(), "-c".into(), (*f).into()]))
            .collect();
        Tool::new(
            CompilationDatabase::from_commands(commands),
            ToolConstants::new(root),
            2,
            Arc::new(Diagnostics::new()),
        )
    }

    #[test]
    fn full_run_reaches_all_ready() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "groups/abc/abcx/abcx_thing.h", "namespace abcx { class Thing {}; }\n");
        write(
            dir.path(),
            "groups/abc/abcx/abcx_thing.cpp",
            "#include \"abcx_thing.h\"\nnamespace abcx { void use(Thing t) {} }\n",
        );

        let store = ObjectStore::new();
        let summary = tool(dir.path(), &["groups/abc/abcx/abcx_thing.cpp"]).run_full(&store).unwrap();
        assert_eq!(summary.succeeded, 1);
        assert_eq!(store.state(), State::AllReady);
        assert!(store.type_("abcx::Thing").is_some());
        assert_eq!(store.files().len(), 2);
    }

    #[test]
    fn physical_only_stops_after_the_include_graph() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "groups/abc/abcx/abcx_thing.cpp", "class Thing {};\n");

        let store = ObjectStore::new();
        tool(dir.path(), &["groups/abc/abcx/abcx_thing.cpp"])
            .with_physical_only(true)
            .run_full(&store)
            .unwrap();
        assert_eq!(store.state(), State::PhysicalReady);
        assert!(store.types().is_empty());
    }

    #[test]
    fn unreadable_translation_unit_does_not_stop_the_logical_pass() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "groups/abc/abcx/abcx_thing.cpp", "namespace abcx { class Thing {}; }\n");

        let store = ObjectStore::new();
        let result = tool(
            dir.path(),
            &["groups/abc/abcx/abcx_thing.cpp", "groups/abc/abcx/abcx_missing.cpp"],
        )
        .run_full(&store);

        match result {
            Err(ExecutorError::TasksFailed { failed, message, .. }) => {
                assert!(failed >= 1);
                assert!(message.contains("abcx_missing.cpp"));
            }
            other => panic!("unexpected: {other:?}"),
        }
        assert!(store.type_("abcx::Thing").is_some());
        assert_eq!(store.state(), State::PhysicalError);
    }

    #[test]
    fn update_rescans_only_what_a_changed_header_reaches() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        write(root, "groups/abc/abcx/abcx_thing.h", "namespace abcx { class Thing {}; }\n");
        write(
            root,
            "groups/abc/abcx/abcx_thing.cpp",
            "#include \"abcx_thing.h\"\nnamespace abcx { void use() {} }\n",
        );
        write(root, "groups/abc/abcx/abcx_other.cpp", "namespace abcx { class Other {}; }\n");
        let tool = tool(root, &["groups/abc/abcx/abcx_thing.cpp", "groups/abc/abcx/abcx_other.cpp"]);

        let store = ObjectStore::new();
        tool.run_full(&store).unwrap();
        assert_eq!(tool.run_update(&store, &FileChanges::default()).unwrap().total, 0);

        write(root, "groups/abc/abcx/abcx_thing.h", "namespace abcx { class Renamed {}; }\n");
        let changes = crate::incremental::scan_changes(&store, tool.database(), tool.constants());
        assert_eq!(changes.modified_files, vec!["groups/abc/abcx/abcx_thing.h"]);
        assert!(changes.new_files.is_empty() && changes.deleted_files.is_empty());

        let summary = tool.run_update(&store, &changes).unwrap();
        assert_eq!(summary.total, 1);
        assert_eq!(store.state(), State::AllReady);
        assert!(store.type_("abcx::Thing").is_none());
        assert!(store.type_("abcx::Renamed").is_some());
        assert!(store.type_("abcx::Other").is_some());
        assert_eq!(store.files().len(), 3);
        let header = store.file("groups/abc/abcx/abcx_thing.h").unwrap();
        assert_eq!(header.read().reverse_includes().len(), 1);
    }

    #[test]
    fn cancel_applies_to_one_run_only() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "groups/abc/abcx/abcx_thing.cpp", "class Thing {};\n");
        let tool = tool(dir.path(), &["groups/abc/abcx/abcx_thing.cpp"]);
        let store = ObjectStore::new();

        tool.cancel_run();
        assert!(matches!(tool.run_full(&store), Err(ExecutorError::Cancelled { completed: 0, .. })));
        assert_eq!(store.state(), State::NoneReady);

        tool.run_full(&store).unwrap();
        assert_eq!(store.state(), State::AllReady);
    }
}
