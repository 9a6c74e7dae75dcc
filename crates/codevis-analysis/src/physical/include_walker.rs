//! Walks the include graph of one translation unit.
//!
//! Stands in for the preprocessor: every reachable file is parsed once, its
//! `#include` directives are resolved against the search paths and resolved
//! files are entered recursively. Events reach an [`IncludeVisitor`] in the
//! order a preprocessor would raise them.

use std::path::{Component, Path, PathBuf};

use codevis_core::errors::ScanError;
use codevis_core::types::collections::FxHashSet;
use tree_sitter::Tree;

use crate::compile_db::IncludeSearch;
use crate::parsers::{extract_includes, parse_file, IncludeDirective};

pub trait IncludeVisitor {
    /// `path` became the current file, on entry and again on return from an include.
    fn file_changed(&mut self, path: &Path);

    /// The current file includes `resolved`.
    fn inclusion_directive(&mut self, directive: &IncludeDirective, resolved: &Path);

    /// Called once per file after everything it includes has been walked.
    fn file_parsed(&mut self, _path: &Path, _source: &[u8], _tree: &Tree) {}
}

/// One walker per translation unit.
#[derive(Debug)]
pub struct IncludeWalker {
    search: IncludeSearch,
    visited: FxHashSet<PathBuf>,
}

impl IncludeWalker {
    pub fn new(search: IncludeSearch) -> Self {
        Self {
            search,
            visited: FxHashSet::default(),
        }
    }

    /// Walks `main` and everything it reaches. Only an unreadable or
    /// unparsable main file is an error; broken includes are skipped.
    pub fn walk(&mut self, main: &Path, visitor: &mut dyn IncludeVisitor) -> Result<(), ScanError> {
        let main = lexical_normalise(main);
        let (source, tree) = parse_file(&main)?;
        self.visited.insert(main.clone());
        self.enter(&main, &source, &tree, visitor);
        Ok(())
    }

    /// Files entered so far.
    pub fn visited(&self) -> usize {
        self.visited.len()
    }

    fn enter(&mut self, path: &Path, source: &[u8], tree: &Tree, visitor: &mut dyn IncludeVisitor) {
        visitor.file_changed(path);
        for directive in extract_includes(tree.root_node(), source) {
            let Some(resolved) = self.resolve(path, &directive) else {
                continue;
            };
            visitor.inclusion_directive(&directive, &resolved);
            if !self.visited.insert(resolved.clone()) {
                continue;
            }
            let Ok((child_source, child_tree)) = parse_file(&resolved) else {
                continue;
            };
            self.enter(&resolved, &child_source, &child_tree, visitor);
            visitor.file_changed(path);
        }
        visitor.file_parsed(path, source, tree);
    }

    /// Quoted includes look next to the includer first, then in the quote
    /// paths; both forms then try the angled paths.
    fn resolve(&self, includer: &Path, directive: &IncludeDirective) -> Option<PathBuf> {
        let spelled = Path::new(&directive.path);
        if spelled.is_absolute() {
            return spelled.is_file().then(|| lexical_normalise(spelled));
        }

        let includer_dir = includer.parent().map(Path::to_path_buf);
        let quoted = if directive.angled {
            Vec::new()
        } else {
            includer_dir
                .into_iter()
                .chain(self.search.quote.iter().cloned())
                .collect()
        };
        quoted
            .iter()
            .chain(self.search.angled.iter())
            .map(|dir| lexical_normalise(&dir.join(spelled)))
            .find(|candidate| candidate.is_file())
    }
}

/// Resolves `.` and `..` without touching the filesystem.
pub fn lexical_normalise(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                let popped = matches!(out.components().next_back(), Some(Component::Normal(_))) && out.pop();
                if !popped && !out.has_root() {
                    out.push("..");
                }
            }
            other => out.push(other.as_os_str()),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::*;

    #[derive(Default)]
    struct Recorder {
        events: Vec<String>,
    }

    impl IncludeVisitor for Recorder {
        fn file_changed(&mut self, path: &Path) {
            self.events.push(format!("enter {}", name(path)));
        }

        fn inclusion_directive(&mut self, _directive: &IncludeDirective, resolved: &Path) {
            self.events.push(format!("include {}", name(resolved)));
        }

        fn file_parsed(&mut self, path: &Path, _source: &[u8], _tree: &Tree) {
            self.events.push(format!("parsed {}", name(path)));
        }
    }

    fn name(path: &Path) -> String {
        path.file_name().unwrap().to_string_lossy().into_owned()
    }

    #[test]
    fn normalise_collapses_dots() {
        assert_eq!(lexical_normalise(Path::new("/a/b/../c/./d.h")), PathBuf::from("/a/c/d.h"));
        assert_eq!(lexical_normalise(Path::new("../x/y.h")), PathBuf::from("../x/y.h"));
        assert_eq!(lexical_normalise(Path::new("/../a.h")), PathBuf::from("/a.h"));
    }

    #[test]
    fn events_follow_preprocessor_order() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        fs::create_dir_all(root.join("inc")).unwrap();
        fs::write(root.join("main.cpp"), "#include \"a.h\"\n#include <b.h>\n#include \"missing.h\"\n").unwrap();
        fs::write(root.join("a.h"), "#include <b.h>\n").unwrap();
        fs::write(root.join("inc/b.h"), "int b;\n").unwrap();

        let search = IncludeSearch {
            quote: Vec::new(),
            angled: vec![root.join("inc")],
        };
        let mut walker = IncludeWalker::new(search);
        let mut recorder = Recorder::default();
        walker.walk(&root.join("main.cpp"), &mut recorder).unwrap();

        assert_eq!(
            recorder.events,
            vec![
                "enter main.cpp",
                "include a.h",
                "enter a.h",
                "include b.h",
                "enter b.h",
                "parsed b.h",
                "enter a.h",
                "parsed a.h",
                "enter main.cpp",
                "include b.h",
                "parsed main.cpp",
            ]
        );
        assert_eq!(walker.visited(), 3);
    }

    #[test]
    fn angled_includes_skip_the_includer_directory() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        fs::write(root.join("main.cpp"), "#include <local.h>\n").unwrap();
        fs::write(root.join("local.h"), "").unwrap();

        let mut walker = IncludeWalker::new(IncludeSearch::default());
        let mut recorder = Recorder::default();
        walker.walk(&root.join("main.cpp"), &mut recorder).unwrap();
        assert_eq!(recorder.events, vec!["enter main.cpp", "parsed main.cpp"]);
    }

    #[test]
    fn unreadable_main_file_is_an_error() {
        let mut walker = IncludeWalker::new(IncludeSearch::default());
        let err = walker
            .walk(Path::new("/definitely/not/here.cpp"), &mut Recorder::default())
            .unwrap_err();
        assert!(matches!(err, ScanError::IoError { .. }));
    }
}
