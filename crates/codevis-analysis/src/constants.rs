//! Settings shared read-only by every task of one run.

use std::path::PathBuf;

use codevis_core::config::ScanConfig;
use codevis_core::errors::ConfigError;
use regex::Regex;

use crate::paths::IgnoreGlobs;

#[derive(Debug, Clone, Default)]
pub struct ToolConstants {
    /// Source root; file qualified names are relative to it.
    pub prefix: PathBuf,
    pub ignore: IgnoreGlobs,
    pub non_lakosian_dirs: Vec<PathBuf>,
    /// `(path regex, group)`; matching files are placed under `group`.
    pub third_party_dirs: Vec<(Regex, String)>,
    /// Searched after the include paths of each compile command.
    pub include_paths: Vec<PathBuf>,
    /// Package by directory instead of by Lakosian naming rules.
    pub no_lakos_rules: bool,
}

impl ToolConstants {
    pub fn new(prefix: impl Into<PathBuf>) -> Self {
        Self {
            prefix: prefix.into(),
            ..Default::default()
        }
    }

    pub fn from_config(scan: &ScanConfig) -> Result<Self, ConfigError> {
        let third_party_dirs = scan
            .third_party_dirs
            .iter()
            .map(|(pattern, group)| {
                Regex::new(pattern)
                    .map(|re| (re, group.clone()))
                    .map_err(|e| ConfigError::ValidationFailed {
                        field: "scan.third_party_dirs".to_string(),
                        message: format!("'{pattern}': {e}"),
                    })
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self {
            prefix: scan.effective_prefix(),
            ignore: IgnoreGlobs::new(&scan.effective_ignore_globs())?,
            non_lakosian_dirs: scan.non_lakosian_dirs.clone(),
            third_party_dirs,
            include_paths: scan.include_paths.clone(),
            no_lakos_rules: !scan.effective_lakosian_rules(),
        })
    }

    pub fn with_ignore(mut self, ignore: IgnoreGlobs) -> Self {
        self.ignore = ignore;
        self
    }

    pub fn with_no_lakos_rules(mut self, no_lakos_rules: bool) -> Self {
        self.no_lakos_rules = no_lakos_rules;
        self
    }

    pub fn with_include_paths(mut self, include_paths: Vec<PathBuf>) -> Self {
        self.include_paths = include_paths;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_config_compiles_patterns() {
        let scan = ScanConfig {
            prefix: Some(PathBuf::from("/src")),
            ignore_globs: vec!["*.t.cpp".to_string()],
            third_party_dirs: vec![("^ext/".to_string(), "vendor".to_string())],
            ..Default::default()
        };
        let constants = ToolConstants::from_config(&scan).unwrap();
        assert_eq!(constants.prefix, PathBuf::from("/src"));
        assert!(constants.ignore.is_ignored("a.t.cpp"));
        assert_eq!(constants.third_party_dirs[0].1, "vendor");

        let constants = constants.with_include_paths(vec![PathBuf::from("/src/include")]);
        assert_eq!(constants.include_paths, vec![PathBuf::from("/src/include")]);
    }

    #[test]
    fn unset_ignore_globs_skip_test_drivers() {
        let scan = ScanConfig {
            lakosian_rules: Some(false),
            ..Default::default()
        };
        let constants = ToolConstants::from_config(&scan).unwrap();
        assert!(constants.ignore.is_ignored("abcx_thing.t.cpp"));
        assert!(!constants.ignore.is_ignored("abcx_thing.cpp"));
        assert!(constants.no_lakos_rules);
    }

    #[test]
    fn bad_regex_is_rejected() {
        let scan = ScanConfig {
            third_party_dirs: vec![("(".to_string(), "vendor".to_string())],
            ..Default::default()
        };
        assert!(ToolConstants::from_config(&scan).is_err());
    }
}
