//! Ignore globs, matched against a file's name.

use codevis_core::errors::ConfigError;
use globset::{Glob, GlobSet, GlobSetBuilder};

#[derive(Debug, Clone)]
pub struct IgnoreGlobs {
    set: GlobSet,
    patterns: Vec<String>,
}

impl IgnoreGlobs {
    pub fn new<S: AsRef<str>>(patterns: &[S]) -> Result<Self, ConfigError> {
        let mut builder = GlobSetBuilder::new();
        for pattern in patterns {
            let glob = Glob::new(pattern.as_ref()).map_err(|e| ConfigError::ValidationFailed {
                field: "scan.ignore_globs".to_string(),
                message: format!("'{}': {e}", pattern.as_ref()),
            })?;
            builder.add(glob);
        }
        let set = builder.build().map_err(|e| ConfigError::ValidationFailed {
            field: "scan.ignore_globs".to_string(),
            message: e.to_string(),
        })?;
        Ok(Self {
            set,
            patterns: patterns.iter().map(|p| p.as_ref().to_string()).collect(),
        })
    }

    pub fn empty() -> Self {
        Self {
            set: GlobSet::empty(),
            patterns: Vec::new(),
        }
    }

    pub fn is_ignored(&self, file_name: &str) -> bool {
        !self.patterns.is_empty() && self.set.is_match(file_name)
    }

    pub fn patterns(&self) -> &[String] {
        &self.patterns
    }
}

impl Default for IgnoreGlobs {
    fn default() -> Self {
        Self::empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn matches_file_names() {
        let globs = IgnoreGlobs::new(&["*.t.cpp", "moc_*"]).unwrap();
        assert!(globs.is_ignored("bslma_allocator.t.cpp"));
        assert!(globs.is_ignored("moc_window.cpp"));
        assert!(!globs.is_ignored("bslma_allocator.cpp"));
        assert!(!IgnoreGlobs::empty().is_ignored("anything"));
    }

    #[test]
    fn malformed_glob_is_a_config_error() {
        assert!(matches!(
            IgnoreGlobs::new(&["a[b"]),
            Err(ConfigError::ValidationFailed { .. })
        ));
    }
}
