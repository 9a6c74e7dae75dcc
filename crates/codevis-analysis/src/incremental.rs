//! Incremental update support: which stored files changed on disk, and which
//! translation units must be scanned again once the stale ones are dropped.

use std::path::Path;

use codevis_core::types::collections::FxHashSet;
use codevis_model::{ObjectStore, State};
use rayon::prelude::*;
use tracing::info;

use crate::compile_db::{CompilationDatabase, CompileCommand};
use crate::constants::ToolConstants;
use crate::hasher::hash_file;
use crate::paths::file_name;
use crate::physical::file_qualified_name;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileStatus {
    Unchanged,
    Modified,
    Deleted,
}

/// Qualified names of changed files, each list sorted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FileChanges {
    /// Translation units with no file in the store.
    pub new_files: Vec<String>,
    pub modified_files: Vec<String>,
    pub deleted_files: Vec<String>,
}

impl FileChanges {
    pub fn is_empty(&self) -> bool {
        self.new_files.is_empty() && self.modified_files.is_empty() && self.deleted_files.is_empty()
    }
}

/// Compares a stored content hash with the file on disk. A file that could
/// not be read when it was stored counts as modified once it can be.
pub fn classify_file(path: &Path, stored_hash: &str) -> FileStatus {
    let current = hash_file(path);
    match (stored_hash.is_empty(), current.is_empty()) {
        (true, true) => FileStatus::Unchanged,
        (true, false) => FileStatus::Modified,
        (false, true) => FileStatus::Deleted,
        (false, false) if current == stored_hash => FileStatus::Unchanged,
        (false, false) => FileStatus::Modified,
    }
}

/// Diffs every stored file against the disk and every translation unit of
/// `database` against the store.
pub fn scan_changes(store: &ObjectStore, database: &CompilationDatabase, constants: &ToolConstants) -> FileChanges {
    let stored: Vec<(String, String)> = store
        .files()
        .iter()
        .map(|f| (f.qualified_name().to_string(), f.read().hash.clone()))
        .collect();

    let classified: Vec<(String, FileStatus)> = stored
        .into_par_iter()
        .map(|(qn, hash)| {
            let status = classify_file(&constants.prefix.join(&qn), &hash);
            (qn, status)
        })
        .collect();

    let mut changes = FileChanges::default();
    for (qn, status) in classified {
        match status {
            FileStatus::Unchanged => {}
            FileStatus::Modified => changes.modified_files.push(qn),
            FileStatus::Deleted => changes.deleted_files.push(qn),
        }
    }

    let registry = store.read();
    for command in database.commands() {
        if constants.ignore.is_ignored(&file_name(&command.file)) {
            continue;
        }
        let qn = file_qualified_name(&command.file, constants);
        if registry.file(&qn).is_none() {
            changes.new_files.push(qn);
        }
    }
    drop(registry);

    changes.new_files.sort();
    changes.new_files.dedup();
    changes.modified_files.sort();
    changes.deleted_files.sort();
    info!(
        new = changes.new_files.len(),
        modified = changes.modified_files.len(),
        deleted = changes.deleted_files.len(),
        "file changes scanned"
    );
    changes
}

/// Removes modified and deleted files from the store, with everything
/// reachable only through them. Returns the translation units to scan again:
/// the new and modified ones plus those dropped because they include a
/// changed file.
pub fn drop_stale_files(store: &ObjectStore, changes: &FileChanges) -> FxHashSet<String> {
    let deleted: FxHashSet<&str> = changes.deleted_files.iter().map(String::as_str).collect();
    let mut rescan: FxHashSet<String> = FxHashSet::default();
    store.with_rw_lock(|registry| {
        for qn in changes.modified_files.iter().chain(&changes.deleted_files) {
            for removed in registry.remove_file(qn) {
                if !deleted.contains(removed.as_str()) {
                    rescan.insert(removed);
                }
            }
        }
    });
    rescan.extend(changes.new_files.iter().cloned());
    rescan
}

/// The commands of `database` whose file is in `qualified_names`.
pub fn affected_commands(
    database: &CompilationDatabase,
    constants: &ToolConstants,
    qualified_names: &FxHashSet<String>,
) -> CompilationDatabase {
    database.filtered(|command: &CompileCommand| {
        qualified_names.contains(&file_qualified_name(&command.file, constants))
    })
}

/// State of a store read back from a database, which does not record it:
/// logical entities mean the last run went all the way.
pub fn loaded_state(store: &ObjectStore) -> State {
    store.with_ro_lock(|r| {
        if !r.namespaces().is_empty() || !r.types().is_empty() || !r.functions().is_empty() {
            State::AllReady
        } else if !r.files().is_empty() {
            State::PhysicalReady
        } else {
            State::NoneReady
        }
    })
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::*;

    #[test]
    fn classify_by_content_hash() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("a.h");
        fs::write(&path, "int a;\n").unwrap();
        let hash = hash_file(&path);

        assert_eq!(classify_file(&path, &hash), FileStatus::Unchanged);
        fs::write(&path, "int b;\n").unwrap();
        assert_eq!(classify_file(&path, &hash), FileStatus::Modified);
        assert_eq!(classify_file(&path, ""), FileStatus::Modified);
        fs::remove_file(&path).unwrap();
        assert_eq!(classify_file(&path, &hash), FileStatus::Deleted);
        assert_eq!(classify_file(&path, ""), FileStatus::Unchanged);
    }

    #[test]
    fn scan_reports_each_kind_of_change() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        for name in ["same.h", "edited.h", "gone.h", "added.cpp"] {
            fs::write(root.join(name), format!("// {name}\n")).unwrap();
        }
        let store = ObjectStore::new();
        for name in ["same.h", "edited.h", "gone.h"] {
            store.get_or_add_file(name, name, true, &hash_file(&root.join(name)), None, None);
        }
        fs::write(root.join("edited.h"), "// changed\n").unwrap();
        fs::remove_file(root.join("gone.h")).unwrap();

        let database = CompilationDatabase::from_commands(vec![
            CompileCommand::new(root, root.join("added.cpp"), vec!["c++".into()]),
            CompileCommand::new(root, root.join("ignored.t.cpp"), vec!["c++".into()]),
        ]);
        let constants = ToolConstants::new(root).with_ignore(crate::paths::IgnoreGlobs::new(&["*.t.cpp"]).unwrap());

        let changes = scan_changes(&store, &database, &constants);
        assert_eq!(changes.new_files, vec!["added.cpp"]);
        assert_eq!(changes.modified_files, vec!["edited.h"]);
        assert_eq!(changes.deleted_files, vec!["gone.h"]);
    }

    #[test]
    fn includers_of_changed_files_are_rescanned_but_deleted_files_are_not() {
        let store = ObjectStore::new();
        let header = store.get_or_add_file("a.h", "a.h", true, "1", None, None);
        let source = store.get_or_add_file("a.cpp", "a.cpp", false, "2", None, None);
        let gone = store.get_or_add_file("b.cpp", "b.cpp", false, "3", None, None);
        codevis_model::FileObject::add_include_relation(&source, &header);
        codevis_model::FileObject::add_include_relation(&gone, &header);

        let changes = FileChanges {
            new_files: vec!["c.cpp".to_string()],
            modified_files: vec!["a.h".to_string()],
            deleted_files: vec!["b.cpp".to_string()],
        };
        let rescan = drop_stale_files(&store, &changes);

        let mut rescan: Vec<_> = rescan.into_iter().collect();
        rescan.sort();
        assert_eq!(rescan, vec!["a.cpp", "a.h", "c.cpp"]);
        assert!(store.files().is_empty());
    }

    #[test]
    fn loaded_state_follows_what_the_store_holds() {
        let store = ObjectStore::new();
        assert_eq!(loaded_state(&store), State::NoneReady);
        store.get_or_add_file("a.h", "a.h", true, "", None, None);
        assert_eq!(loaded_state(&store), State::PhysicalReady);
        store.get_or_add_namespace("abc", "abc", None);
        assert_eq!(loaded_state(&store), State::AllReady);
    }
}
