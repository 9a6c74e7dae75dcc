//! File categories by extension.

use std::path::Path;

const HEADER_EXTENSIONS: &[&str] = &["h", "hh", "h++", "hpp", "H"];
const SOURCE_EXTENSIONS: &[&str] = &["cpp", "c", "C", "c++", "cc", "cxx", "moc"];
const OTHER_EXTENSIONS: &[&str] = &["dep", "mem", "o", "swp", "md", "txt", ""];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileType {
    Header,
    Source,
    /// A known non-C++ extension.
    UnknownUnknown,
    /// Anything else.
    KnownUnknown,
}

pub fn categorise_path(path: &Path) -> FileType {
    let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");
    if HEADER_EXTENSIONS.contains(&ext) {
        FileType::Header
    } else if SOURCE_EXTENSIONS.contains(&ext) {
        FileType::Source
    } else if OTHER_EXTENSIONS.contains(&ext) {
        FileType::UnknownUnknown
    } else {
        FileType::KnownUnknown
    }
}

pub fn is_cpp_file(path: &Path) -> bool {
    matches!(categorise_path(path), FileType::Header | FileType::Source)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extensions_are_case_sensitive() {
        assert_eq!(categorise_path(Path::new("a/b.H")), FileType::Header);
        assert_eq!(categorise_path(Path::new("a/b.C")), FileType::Source);
        assert_eq!(categorise_path(Path::new("a/b.t.cpp")), FileType::Source);
        assert_eq!(categorise_path(Path::new("a/Makefile")), FileType::UnknownUnknown);
        assert_eq!(categorise_path(Path::new("a/b.py")), FileType::KnownUnknown);
    }
}
