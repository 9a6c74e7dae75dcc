//! Packaging without Lakosian rules: every directory is a package nested in
//! its parent directory's package, under one root package for the source
//! tree and one for everything outside it.

use std::path::{Component, Path};

use codevis_model::{ComponentObject, FileObject, FileRef, ObjectStore, PackageObject, PackageRef};

use super::source_file::file_qualified_name;
use crate::constants::ToolConstants;
use crate::hasher::hash_file;
use crate::paths::lakosian::SOURCE_DIR_VAR;
use crate::paths::file_name;

pub const EXTERNAL_ROOT_NAME: &str = "External Libraries";
pub const EXTERNAL_DIR_VAR: &str = "${EXTERNAL_LIBS_DIR}";
const UNNAMED_ROOT_NAME: &str = "Unnamed Project";

/// Registers `real_path` with one package per directory. None for an empty
/// path.
pub fn write_source_file(
    store: &ObjectStore,
    constants: &ToolConstants,
    real_path: &Path,
    is_header: bool,
) -> Option<FileRef> {
    if real_path.as_os_str().is_empty() {
        return None;
    }
    let qualified_name = file_qualified_name(real_path, constants);
    if let Some(existing) = store.file(&qualified_name) {
        return Some(existing);
    }

    let hash = hash_file(real_path);
    let in_source = !constants.prefix.as_os_str().is_empty() && real_path.starts_with(&constants.prefix);
    let (root_name, mut disk_path, relative) = if in_source {
        let root = file_name(&constants.prefix);
        let root = if root.is_empty() { UNNAMED_ROOT_NAME.to_string() } else { root };
        let relative = real_path.strip_prefix(&constants.prefix).unwrap_or(real_path);
        (root, SOURCE_DIR_VAR.to_string(), relative)
    } else {
        (EXTERNAL_ROOT_NAME.to_string(), EXTERNAL_DIR_VAR.to_string(), real_path)
    };
    let directories: Vec<String> = relative
        .parent()
        .map(|dir| {
            dir.components()
                .filter_map(|c| match c {
                    Component::Normal(name) => Some(name.to_string_lossy().into_owned()),
                    _ => None,
                })
                .collect()
        })
        .unwrap_or_default();
    let stem = relative
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();

    let file = store.with_rw_lock(|registry| {
        let mut package = registry.get_or_add_package(&root_name, &root_name, &disk_path, None, None);
        for directory in &directories {
            disk_path = format!("{disk_path}/{directory}");
            let qualified = format!("{}/{directory}", package.qualified_name());
            package = registry.get_or_add_package(&qualified, directory, &disk_path, Some(&package), None);
        }
        let component_qn = format!("{}/{stem}", package.qualified_name());
        let component = registry.get_or_add_component(&component_qn, &stem, Some(&package));
        registry.get_or_add_file(
            &qualified_name,
            &file_name(real_path),
            is_header,
            &hash,
            Some(&package),
            Some(&component),
        )
    });
    Some(file)
}

/// Adds the include edge, the component dependency, and a dependency
/// between the packages at each level going up both package chains.
pub fn add_include_with_parent_propagation(source: &FileRef, target: &FileRef) -> bool {
    let added = FileObject::add_include_relation(source, target);

    let source_component = source.read().component().cloned();
    let target_component = target.read().component().cloned();
    let (Some(from), Some(to)) = (source_component, target_component) else {
        return added;
    };
    ComponentObject::add_dependency(&from, &to);

    let mut from_package: Option<PackageRef> = from.read().package().cloned();
    let mut to_package: Option<PackageRef> = to.read().package().cloned();
    while let (Some(source_package), Some(target_package)) = (from_package, to_package) {
        PackageObject::add_dependency(&source_package, &target_package);
        from_package = source_package.read().parent().cloned();
        to_package = target_package.read().parent().cloned();
    }
    added
}

#[cfg(test)]
mod tests {
    use std::fs;
    use std::path::PathBuf;

    use super::*;

    fn touch(root: &Path, relative: &str) -> PathBuf {
        let path = root.join(relative);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, "int x;\n").unwrap();
        path
    }

    fn deps(package: &PackageRef) -> Vec<String> {
        package
            .read()
            .forward_dependencies()
            .iter()
            .map(|p| p.qualified_name().to_string())
            .collect()
    }

    #[test]
    fn every_directory_becomes_a_package() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("proj");
        let path = touch(&root, "src/util/strings.cpp");

        let store = ObjectStore::new();
        let constants = ToolConstants::new(&root).with_no_lakos_rules(true);
        let file = write_source_file(&store, &constants, &path, false).unwrap();

        assert_eq!(file.qualified_name(), "src/util/strings.cpp");
        assert_eq!(file.read().hash.len(), 16);
        let package = file.read().package().cloned().unwrap();
        assert_eq!(package.qualified_name(), "proj/src/util");
        assert_eq!(package.name(), "util");
        assert_eq!(package.read().disk_path, "${SOURCE_DIR}/src/util");
        let parent = package.read().parent().cloned().unwrap();
        assert_eq!(parent.qualified_name(), "proj/src");
        assert_eq!(parent.read().parent().unwrap().qualified_name(), "proj");
        assert_eq!(
            file.read().component().unwrap().qualified_name(),
            "proj/src/util/strings"
        );
    }

    #[test]
    fn files_outside_the_source_go_under_external_libraries() {
        let store = ObjectStore::new();
        let constants = ToolConstants::new("/work/proj").with_no_lakos_rules(true);
        let file = write_source_file(&store, &constants, Path::new("/usr/include/vector.h"), true).unwrap();
        assert_eq!(file.qualified_name(), "/usr/include/vector.h");
        let package = file.read().package().cloned().unwrap();
        assert_eq!(package.qualified_name(), "External Libraries/usr/include");
        assert_eq!(package.read().disk_path, "${EXTERNAL_LIBS_DIR}/usr/include");
    }

    #[test]
    fn includes_propagate_up_both_package_chains() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("proj");
        let from = touch(&root, "app/cli/main.cpp");
        let to = touch(&root, "lib/core/engine.h");

        let store = ObjectStore::new();
        let constants = ToolConstants::new(&root).with_no_lakos_rules(true);
        let source = write_source_file(&store, &constants, &from, false).unwrap();
        let target = write_source_file(&store, &constants, &to, true).unwrap();
        assert!(add_include_with_parent_propagation(&source, &target));

        assert_eq!(deps(&store.package("proj/app/cli").unwrap()), vec!["proj/lib/core"]);
        assert_eq!(deps(&store.package("proj/app").unwrap()), vec!["proj/lib"]);
        assert!(deps(&store.package("proj").unwrap()).is_empty());
        let component = source.read().component().cloned().unwrap();
        assert_eq!(component.read().forward_dependencies().len(), 1);
    }
}
