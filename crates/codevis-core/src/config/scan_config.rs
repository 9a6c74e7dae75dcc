//! Scan configuration.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Test drivers are left out unless other globs are configured.
pub const DEFAULT_IGNORE_GLOBS: &[&str] = &["*.t.cpp"];

/// Configuration for the physical and logical scanners.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(default)]
pub struct ScanConfig {
    /// Worker threads for the tool executor. Default: available parallelism.
    pub threads: Option<usize>,
    /// Source root. File qualified names are relative to it.
    pub prefix: Option<PathBuf>,
    /// Glob patterns matched against file names; matches are never registered.
    /// Default when empty: [`DEFAULT_IGNORE_GLOBS`].
    pub ignore_globs: Vec<String>,
    /// Directories whose packages go into the non-lakosian group.
    pub non_lakosian_dirs: Vec<PathBuf>,
    /// `(path regex, group name)` pairs for third-party code.
    pub third_party_dirs: Vec<(String, String)>,
    /// Extra include search paths appended to every compile command.
    pub include_paths: Vec<PathBuf>,
    /// Package files by Lakosian naming rules. When false, every directory
    /// becomes a package. Default: true.
    pub lakosian_rules: Option<bool>,
    /// Skip the logical pass. Default: false.
    pub physical_only: Option<bool>,
    /// Verbose per-entity diagnostics. Default: false.
    pub debug_output: Option<bool>,
}

impl ScanConfig {
    /// Returns the effective thread count, defaulting to the available parallelism.
    pub fn effective_threads(&self) -> usize {
        self.threads.unwrap_or_else(|| {
            std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(1)
        })
    }

    /// Returns the effective source prefix, defaulting to the empty path.
    pub fn effective_prefix(&self) -> PathBuf {
        self.prefix.clone().unwrap_or_default()
    }

    pub fn effective_ignore_globs(&self) -> Vec<String> {
        if self.ignore_globs.is_empty() {
            DEFAULT_IGNORE_GLOBS.iter().map(|g| g.to_string()).collect()
        } else {
            self.ignore_globs.clone()
        }
    }

    pub fn effective_lakosian_rules(&self) -> bool {
        self.lakosian_rules.unwrap_or(true)
    }

    pub fn effective_physical_only(&self) -> bool {
        self.physical_only.unwrap_or(false)
    }

    pub fn effective_debug_output(&self) -> bool {
        self.debug_output.unwrap_or(false)
    }
}
