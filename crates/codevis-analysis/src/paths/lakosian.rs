//! Lakosian package layout.
//!
//! A file's package is its directory. Directories that follow the naming
//! rules become `standalones/<pkg>` or `groups/<grp>/<pkg>`; configured
//! third-party directories go under their mapped group; everything else goes
//! under the non-lakosian group.

use std::path::Path;
use std::sync::LazyLock;

use regex::Regex;

use super::{file_name, generic_string};

pub const NON_LAKOSIAN_GROUP_NAME: &str = "non-lakosian group";

/// Replaces the source prefix in package disk paths.
pub const SOURCE_DIR_VAR: &str = "${SOURCE_DIR}";

/// `<prefix>_<pkg>_<component>.` with a one or two letter prefix.
static STANDALONE_COMPONENT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"/([a-zA-Z]{1,2})_([a-zA-Z0-9_]+)\.").unwrap());

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageName {
    pub qualified_name: String,
    pub name: String,
}

impl PackageName {
    fn new(qualified_name: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            qualified_name: qualified_name.into(),
            name: name.into(),
        }
    }
}

/// Where a file's package sits in the package tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackagePlacement {
    /// Standalone package, or the group holding `leaf`.
    pub top: PackageName,
    /// Package inside `top`. None for standalone packages and files at the root.
    pub leaf: Option<PackageName>,
    pub disk_path: String,
}

impl PackagePlacement {
    /// Qualified name of the package the file belongs to.
    pub fn package_qualified_name(&self) -> &str {
        self.leaf
            .as_ref()
            .map_or(self.top.qualified_name.as_str(), |l| l.qualified_name.as_str())
    }
}

/// `component_path` is `<grp>/<grp><pkg>/<grp><pkg>_<name>.<ext>`; a
/// `+suffix` on the package directory is tolerated.
pub fn is_component_on_package_group(component_path: &Path) -> bool {
    let component = file_name(component_path);
    let Some(pkg_dir) = component_path.parent() else {
        return false;
    };
    let pkg = file_name(pkg_dir);
    let group = pkg_dir.parent().map(file_name).unwrap_or_default();
    if group.chars().count() != 3 {
        return false;
    }

    if component.starts_with(&format!("{pkg}_")) && pkg.starts_with(&group) {
        return true;
    }
    let parts: Vec<&str> = pkg.split('+').collect();
    if let [special, _] = parts.as_slice() {
        return component.starts_with(&format!("{special}_")) && special.starts_with(&group);
    }
    false
}

/// `component_path` is `<prefix>_<pkg>_<name>.<ext>` inside a directory named
/// `<prefix>_<pkg>` or `<pkg>`.
pub fn is_component_on_standalone_package(component_path: &Path) -> bool {
    let generic = format!("/{}", generic_string(component_path).trim_start_matches('/'));
    if !STANDALONE_COMPONENT_RE.is_match(&generic) {
        return false;
    }
    let component = file_name(component_path);
    let parent = component_path.parent().map(file_name).unwrap_or_default();
    if !parent.is_empty() && component.starts_with(&parent) {
        return true;
    }
    let parts: Vec<&str> = component.split('_').collect();
    parts.len() >= 3 && parts[1] == parent
}

/// Places the package of the file at `path` (relative to `prefix`).
pub fn classify_package(
    path: &Path,
    prefix: &Path,
    non_lakosian_dirs: &[std::path::PathBuf],
    third_party_dirs: &[(Regex, String)],
) -> PackagePlacement {
    let pkg_path = path.parent().unwrap_or_else(|| Path::new(""));
    let pkg_dir_name = file_name(pkg_path);
    let full_pkg_path = generic_string(&prefix.join(pkg_path));
    let prefix_str = generic_string(prefix);
    let relative_disk_path = || {
        if !prefix_str.is_empty() && full_pkg_path.starts_with(&prefix_str) {
            format!(
                "{SOURCE_DIR_VAR}/{}",
                full_pkg_path[prefix_str.len()..].trim_start_matches('/')
            )
        } else {
            full_pkg_path.clone()
        }
    };
    let grouped = |group: PackageName, disk_path: String| {
        let leaf = (!pkg_dir_name.is_empty()).then(|| {
            PackageName::new(format!("{}/{}", group.qualified_name, pkg_dir_name), pkg_dir_name.clone())
        });
        PackagePlacement {
            top: group,
            leaf,
            disk_path,
        }
    };

    let generic_path = generic_string(path);
    if let Some((_, group)) = third_party_dirs.iter().find(|(re, _)| re.is_match(&generic_path)) {
        return grouped(PackageName::new(group.clone(), group.clone()), full_pkg_path.clone());
    }

    let non_lakosian = non_lakosian_dirs
        .iter()
        .any(|dir| full_pkg_path.starts_with(&generic_string(dir)));
    if non_lakosian {
        return grouped(
            PackageName::new(NON_LAKOSIAN_GROUP_NAME, NON_LAKOSIAN_GROUP_NAME),
            full_pkg_path.clone(),
        );
    }

    if is_component_on_standalone_package(path) {
        return PackagePlacement {
            top: PackageName::new(format!("standalones/{pkg_dir_name}"), pkg_dir_name.clone()),
            leaf: None,
            disk_path: relative_disk_path(),
        };
    }
    if is_component_on_package_group(path) {
        let group = pkg_path.parent().map(file_name).unwrap_or_default();
        return grouped(PackageName::new(format!("groups/{group}"), group), relative_disk_path());
    }
    grouped(
        PackageName::new(NON_LAKOSIAN_GROUP_NAME, NON_LAKOSIAN_GROUP_NAME),
        full_pkg_path.clone(),
    )
}

/// Component qualified name for a file in `package`: `<package>/<stem>` for
/// Lakosian packages, `<relative dir>/<stem>` otherwise.
pub fn component_qualified_name(path: &Path, package_qualified_name: &str) -> String {
    let stem = component_stem(path);
    if package_qualified_name.contains("standalone/")
        || package_qualified_name.contains("standalones/")
        || package_qualified_name.contains("groups/")
    {
        return format!("{package_qualified_name}/{stem}");
    }
    match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => format!("{}/{stem}", generic_string(dir)),
        _ => stem,
    }
}

/// File name up to the last extension.
pub fn component_stem(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default()
}
