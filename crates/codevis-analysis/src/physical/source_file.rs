//! Registers a file together with its package and component.

use std::path::Path;

use codevis_model::{FileRef, ObjectStore};

use super::non_lakosian;
use crate::constants::ToolConstants;
use crate::hasher::hash_file;
use crate::paths::lakosian::{component_qualified_name, component_stem, SOURCE_DIR_VAR};
use crate::paths::{classify_package, file_name, generic_string, normalise_path};

/// Key of the file at `path`: relative to the source root when under it.
pub fn file_qualified_name(path: &Path, constants: &ToolConstants) -> String {
    generic_string(&normalise_path(path, &constants.prefix))
}

/// Returns the file entity for `real_path`, creating it and the package chain
/// and component it belongs to on first sight. None for an empty path.
/// Without Lakosian rules the packages follow the directory tree.
pub fn write_source_file(
    store: &ObjectStore,
    constants: &ToolConstants,
    real_path: &Path,
    is_header: bool,
) -> Option<FileRef> {
    if constants.no_lakos_rules {
        return non_lakosian::write_source_file(store, constants, real_path, is_header);
    }
    if real_path.as_os_str().is_empty() {
        return None;
    }
    let relative = normalise_path(real_path, &constants.prefix);
    let qualified_name = generic_string(&relative);
    if let Some(existing) = store.file(&qualified_name) {
        return Some(existing);
    }

    // Hash outside the store lock.
    let hash = hash_file(real_path);
    let placement = classify_package(
        &relative,
        &constants.prefix,
        &constants.non_lakosian_dirs,
        &constants.third_party_dirs,
    );
    let component_qn = component_qualified_name(&relative, placement.package_qualified_name());

    let file = store.with_rw_lock(|registry| {
        let top_disk_path = match &placement.leaf {
            None => placement.disk_path.clone(),
            Some(_) => group_disk_path(&placement.disk_path, &placement.top.qualified_name),
        };
        let top = registry.get_or_add_package(
            &placement.top.qualified_name,
            &placement.top.name,
            &top_disk_path,
            None,
            None,
        );
        let package = match &placement.leaf {
            Some(leaf) => registry.get_or_add_package(
                &leaf.qualified_name,
                &leaf.name,
                &placement.disk_path,
                Some(&top),
                None,
            ),
            None => top,
        };
        let component = registry.get_or_add_component(&component_qn, &component_stem(&relative), Some(&package));
        registry.get_or_add_file(
            &qualified_name,
            &file_name(&relative),
            is_header,
            &hash,
            Some(&package),
            Some(&component),
        )
    });
    Some(file)
}

/// Lakosian groups live one directory above their packages; other groups
/// have no directory of their own.
fn group_disk_path(package_disk_path: &str, group_qualified_name: &str) -> String {
    if !package_disk_path.starts_with(SOURCE_DIR_VAR) || !group_qualified_name.starts_with("groups/") {
        return String::new();
    }
    Path::new(package_disk_path)
        .parent()
        .map(generic_string)
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use std::fs;
    use std::sync::Arc;

    use super::*;

    #[test]
    fn registers_group_package_component_and_file() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        let path = root.join("groups/abc/abcx/abcx_thing.h");
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, "class Thing {};\n").unwrap();

        let store = ObjectStore::new();
        let constants = ToolConstants::new(root);
        let file = write_source_file(&store, &constants, &path, true).unwrap();

        assert_eq!(file.qualified_name(), "groups/abc/abcx/abcx_thing.h");
        assert_eq!(file.name(), "abcx_thing.h");
        let data = file.read();
        assert!(data.is_header);
        assert_eq!(data.hash.len(), 16);
        let package = data.package().unwrap();
        assert_eq!(package.qualified_name(), "groups/abc/abcx");
        assert_eq!(package.read().disk_path, "${SOURCE_DIR}/groups/abc/abcx");
        let group = package.read().parent().cloned().unwrap();
        assert_eq!(group.qualified_name(), "groups/abc");
        assert_eq!(group.read().disk_path, "${SOURCE_DIR}/groups/abc");
        assert_eq!(data.component().unwrap().qualified_name(), "groups/abc/abcx/abcx_thing");

        let again = write_source_file(&store, &constants, &path, true).unwrap();
        assert!(Arc::ptr_eq(&file, &again));
    }

    #[test]
    fn empty_path_is_skipped() {
        let store = ObjectStore::new();
        assert!(write_source_file(&store, &ToolConstants::default(), Path::new(""), false).is_none());
        assert!(store.read().is_empty());
    }

    #[test]
    fn files_outside_the_prefix_keep_their_path() {
        let store = ObjectStore::new();
        let constants = ToolConstants::new("/src");
        let file = write_source_file(&store, &constants, Path::new("/usr/include/vector.h"), true).unwrap();
        assert_eq!(file.qualified_name(), "/usr/include/vector.h");
        assert!(file.read().hash.is_empty());
        assert_eq!(
            file.read().package().unwrap().qualified_name(),
            "non-lakosian group/include"
        );
    }
}
