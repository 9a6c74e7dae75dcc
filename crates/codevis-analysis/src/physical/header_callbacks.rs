//! Turns include events into physical entities and dependency edges.

use std::path::Path;
use std::sync::Arc;

use codevis_core::Diagnostics;
use codevis_model::{ComponentObject, FileObject, FileRef, ObjectStore, PackageObject, PackageRef};

use super::include_walker::IncludeVisitor;
use super::non_lakosian::add_include_with_parent_propagation;
use super::source_file::write_source_file;
use crate::constants::ToolConstants;
use crate::parsers::IncludeDirective;
use crate::paths::{categorise_path, file_name, FileType};

/// Per translation unit include-event handler.
pub struct HeaderCallbacks<'a> {
    store: &'a ObjectStore,
    constants: &'a ToolConstants,
    diagnostics: &'a Diagnostics,
    /// None while inside an ignored file.
    current: Option<FileRef>,
    include_edges: usize,
}

impl<'a> HeaderCallbacks<'a> {
    pub fn new(store: &'a ObjectStore, constants: &'a ToolConstants, diagnostics: &'a Diagnostics) -> Self {
        Self {
            store,
            constants,
            diagnostics,
            current: None,
            include_edges: 0,
        }
    }

    /// Include edges added by this translation unit.
    pub fn include_edges(&self) -> usize {
        self.include_edges
    }

    fn is_ignored(&self, path: &Path) -> bool {
        self.constants.ignore.is_ignored(&file_name(path))
    }

    fn add_package_dependencies(&self, source: &PackageRef, target: &PackageRef) {
        if Arc::ptr_eq(source, target) {
            return;
        }
        PackageObject::add_dependency(source, target);

        let source_parent = source.read().parent().cloned();
        let target_parent = target.read().parent().cloned();
        match (source_parent, target_parent) {
            (None, Some(target_group)) => {
                PackageObject::add_dependency(source, &target_group);
            }
            (Some(source_group), None) => {
                PackageObject::add_dependency(&source_group, target);
            }
            _ => {}
        }
    }
}

impl IncludeVisitor for HeaderCallbacks<'_> {
    fn file_changed(&mut self, path: &Path) {
        if path.as_os_str().is_empty() || self.is_ignored(path) {
            self.current = None;
            return;
        }
        let is_header = categorise_path(path) == FileType::Header;
        self.current = write_source_file(self.store, self.constants, path, is_header);
        self.diagnostics.debug(|| format!("entered {}", path.display()));
    }

    fn inclusion_directive(&mut self, directive: &IncludeDirective, resolved: &Path) {
        let Some(source) = self.current.clone() else {
            return;
        };
        if self.is_ignored(resolved) {
            return;
        }
        let Some(target) = write_source_file(self.store, self.constants, resolved, true) else {
            return;
        };
        if Arc::ptr_eq(&source, &target) {
            return;
        }

        self.diagnostics.debug(|| {
            format!(
                "{} includes {} (line {})",
                source.qualified_name(),
                target.qualified_name(),
                directive.line
            )
        });
        if self.constants.no_lakos_rules {
            if add_include_with_parent_propagation(&source, &target) {
                self.include_edges += 1;
            }
            return;
        }
        if FileObject::add_include_relation(&source, &target) {
            self.include_edges += 1;
        }

        let (source_component, source_package) = {
            let s = source.read();
            (s.component().cloned(), s.package().cloned())
        };
        let (target_component, target_package) = {
            let t = target.read();
            (t.component().cloned(), t.package().cloned())
        };

        if let (Some(from), Some(to)) = (&source_component, &target_component) {
            if !Arc::ptr_eq(from, to) {
                ComponentObject::add_dependency(from, to);
            }
        }
        if let (Some(from), Some(to)) = (&source_package, &target_package) {
            self.add_package_dependencies(from, to);
        }
    }
}

#[cfg(test)]
mod tests {
    use std::fs;
    use std::path::PathBuf;

    use super::*;
    use crate::paths::IgnoreGlobs;

    fn touch(root: &Path, relative: &str) -> PathBuf {
        let path = root.join(relative);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, "").unwrap();
        path
    }

    fn directive(path: &str) -> IncludeDirective {
        IncludeDirective {
            path: path.to_string(),
            angled: false,
            line: 1,
        }
    }

    fn deps(package: &PackageRef) -> Vec<String> {
        let mut names: Vec<String> = package
            .read()
            .forward_dependencies()
            .iter()
            .map(|p| p.qualified_name().to_string())
            .collect();
        names.sort();
        names
    }

    #[test]
    fn standalone_including_grouped_package_depends_on_the_group_too() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        let tool = touch(root, "lvtclp/ct_lvtclp_tool.cpp");
        let alloc = touch(root, "groups/bsl/bslma/bslma_allocator.h");

        let store = ObjectStore::new();
        let constants = ToolConstants::new(root);
        let diagnostics = Diagnostics::new();
        let mut callbacks = HeaderCallbacks::new(&store, &constants, &diagnostics);
        callbacks.file_changed(&tool);
        callbacks.inclusion_directive(&directive("bslma_allocator.h"), &alloc);

        let standalone = store.package("standalones/lvtclp").unwrap();
        assert_eq!(deps(&standalone), vec!["groups/bsl", "groups/bsl/bslma"]);
        assert_eq!(callbacks.include_edges(), 1);
    }

    #[test]
    fn grouped_including_standalone_lifts_the_source_group() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        let alloc = touch(root, "groups/bsl/bslma/bslma_allocator.cpp");
        let tool = touch(root, "lvtclp/ct_lvtclp_tool.h");

        let store = ObjectStore::new();
        let constants = ToolConstants::new(root);
        let diagnostics = Diagnostics::new();
        let mut callbacks = HeaderCallbacks::new(&store, &constants, &diagnostics);
        callbacks.file_changed(&alloc);
        callbacks.inclusion_directive(&directive("ct_lvtclp_tool.h"), &tool);

        let group = store.package("groups/bsl").unwrap();
        let leaf = store.package("groups/bsl/bslma").unwrap();
        assert_eq!(deps(&leaf), vec!["standalones/lvtclp"]);
        assert_eq!(deps(&group), vec!["standalones/lvtclp"]);
    }

    #[test]
    fn ignored_current_file_makes_includes_no_ops() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        let test_driver = touch(root, "groups/abc/abcx/abcx_thing.t.cpp");
        let header = touch(root, "groups/abc/abcx/abcx_thing.h");

        let store = ObjectStore::new();
        let constants = ToolConstants::new(root).with_ignore(IgnoreGlobs::new(&["*.t.cpp"]).unwrap());
        let diagnostics = Diagnostics::new();
        let mut callbacks = HeaderCallbacks::new(&store, &constants, &diagnostics);
        callbacks.file_changed(&test_driver);
        callbacks.inclusion_directive(&directive("abcx_thing.h"), &header);

        assert!(store.read().is_empty());
        assert_eq!(callbacks.include_edges(), 0);
    }

    #[test]
    fn without_lakos_rules_every_directory_level_depends() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("proj");
        let main = touch(&root, "app/main.cpp");
        let engine = touch(&root, "lib/engine.h");

        let store = ObjectStore::new();
        let constants = ToolConstants::new(&root).with_no_lakos_rules(true);
        let diagnostics = Diagnostics::new();
        let mut callbacks = HeaderCallbacks::new(&store, &constants, &diagnostics);
        callbacks.file_changed(&main);
        callbacks.inclusion_directive(&directive("engine.h"), &engine);

        assert_eq!(deps(&store.package("proj/app").unwrap()), vec!["proj/lib"]);
        assert!(store.package("standalones/app").is_none());
        assert_eq!(callbacks.include_edges(), 1);
    }

    #[test]
    fn self_include_adds_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        let header = touch(root, "groups/abc/abcx/abcx_thing.h");

        let store = ObjectStore::new();
        let constants = ToolConstants::new(root);
        let diagnostics = Diagnostics::new();
        let mut callbacks = HeaderCallbacks::new(&store, &constants, &diagnostics);
        callbacks.file_changed(&header);
        callbacks.inclusion_directive(&directive("abcx_thing.h"), &header);

        let file = store.file("groups/abc/abcx/abcx_thing.h").unwrap();
        assert!(file.read().forward_includes().is_empty());
    }
}
