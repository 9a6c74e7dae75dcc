//! Path rules: file categories, ignore globs and the Lakosian package layout.

pub mod categorise;
pub mod ignore;
pub mod lakosian;

use std::path::{Path, PathBuf};

pub use categorise::{categorise_path, is_cpp_file, FileType};
pub use ignore::IgnoreGlobs;
pub use lakosian::{classify_package, PackagePlacement, NON_LAKOSIAN_GROUP_NAME};

/// `path` relative to `prefix` when it lies under it, otherwise unchanged.
pub fn normalise_path(path: &Path, prefix: &Path) -> PathBuf {
    if prefix.as_os_str().is_empty() {
        return path.to_path_buf();
    }
    match path.strip_prefix(prefix) {
        Ok(rest) => rest.to_path_buf(),
        Err(_) => path.to_path_buf(),
    }
}

/// Forward-slash rendering used for qualified names.
pub fn generic_string(path: &Path) -> String {
    let s = path.to_string_lossy();
    if std::path::MAIN_SEPARATOR == '/' {
        s.into_owned()
    } else {
        s.replace(std::path::MAIN_SEPARATOR, "/")
    }
}

/// File name component as a string, empty when there is none.
pub fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalise_strips_prefix_only_when_present() {
        assert_eq!(
            normalise_path(Path::new("/src/groups/bsl/a.h"), Path::new("/src")),
            PathBuf::from("groups/bsl/a.h")
        );
        assert_eq!(
            normalise_path(Path::new("/usr/include/stdio.h"), Path::new("/src")),
            PathBuf::from("/usr/include/stdio.h")
        );
        assert_eq!(normalise_path(Path::new("/a/b.h"), Path::new("")), PathBuf::from("/a/b.h"));
    }
}
