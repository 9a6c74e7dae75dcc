//! Top-level codevis configuration with layered resolution.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use super::{OutputConfig, ScanConfig};
use crate::errors::ConfigError;

/// Project config file name, looked up in the project root.
pub const PROJECT_CONFIG_FILE: &str = "codevis.toml";

/// Top-level configuration aggregating all sub-configs.
///
/// Resolution order (highest priority first):
/// 1. CLI flags (applied via `apply_cli_overrides`)
/// 2. Environment variables (`CODEVIS_*`)
/// 3. Project config (`codevis.toml` in project root)
/// 4. User config (`~/.codevis/config.toml`)
/// 5. Compiled defaults
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(default)]
pub struct CodevisConfig {
    pub scan: ScanConfig,
    pub output: OutputConfig,
}

/// CLI override arguments that can be applied to a config.
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub scan_threads: Option<usize>,
    pub scan_prefix: Option<PathBuf>,
    pub scan_ignore_globs: Vec<String>,
    pub scan_physical_only: Option<bool>,
    pub scan_lakosian_rules: Option<bool>,
    pub output_database: Option<PathBuf>,
    pub output_force: Option<bool>,
}

impl CodevisConfig {
    /// Load configuration with layered resolution rooted at `root`.
    pub fn load(root: &Path, cli_overrides: Option<&CliOverrides>) -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Some(user_config_path) = Self::user_config_path() {
            if user_config_path.exists() {
                match Self::merge_toml_file(&mut config, &user_config_path) {
                    Ok(()) => {}
                    Err(e @ ConfigError::ParseError { .. }) => return Err(e),
                    Err(e) => {
                        tracing::warn!(error = %e, "ignoring unreadable user config");
                    }
                }
            }
        }

        let project_config_path = root.join(PROJECT_CONFIG_FILE);
        if project_config_path.exists() {
            Self::merge_toml_file(&mut config, &project_config_path)?;
        }

        Self::apply_env_overrides(&mut config);

        if let Some(cli) = cli_overrides {
            Self::apply_cli_overrides(&mut config, cli);
        }

        Self::validate(&config)?;

        Ok(config)
    }

    /// Load configuration from a TOML string (for testing).
    pub fn from_toml(toml_str: &str) -> Result<Self, ConfigError> {
        toml::from_str(toml_str).map_err(|e| ConfigError::ParseError {
            path: "<string>".to_string(),
            message: e.to_string(),
        })
    }

    /// Validate the configuration values.
    pub fn validate(config: &CodevisConfig) -> Result<(), ConfigError> {
        if config.scan.threads == Some(0) {
            return Err(ConfigError::ValidationFailed {
                field: "scan.threads".to_string(),
                message: "must be greater than 0".to_string(),
            });
        }
        for pattern in &config.scan.ignore_globs {
            if let Err(e) = globset::Glob::new(pattern) {
                return Err(ConfigError::ValidationFailed {
                    field: "scan.ignore_globs".to_string(),
                    message: format!("'{pattern}': {e}"),
                });
            }
        }
        for (regex, group) in &config.scan.third_party_dirs {
            if let Err(e) = regex::Regex::new(regex) {
                return Err(ConfigError::ValidationFailed {
                    field: "scan.third_party_dirs".to_string(),
                    message: format!("'{regex}' for group '{group}': {e}"),
                });
            }
        }
        Ok(())
    }

    fn user_config_path() -> Option<PathBuf> {
        home_dir().map(|h| h.join(".codevis").join("config.toml"))
    }

    /// Merge a TOML file into the existing config.
    /// Unknown keys are silently ignored.
    fn merge_toml_file(config: &mut CodevisConfig, path: &Path) -> Result<(), ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|_| ConfigError::FileNotFound {
            path: path.display().to_string(),
        })?;

        let file_config: CodevisConfig =
            toml::from_str(&content).map_err(|e| ConfigError::ParseError {
                path: path.display().to_string(),
                message: e.to_string(),
            })?;

        Self::merge(config, &file_config);
        Ok(())
    }

    /// Merge `other` into `base`; `other` wins wherever it has a value.
    fn merge(base: &mut CodevisConfig, other: &CodevisConfig) {
        if other.scan.threads.is_some() {
            base.scan.threads = other.scan.threads;
        }
        if other.scan.prefix.is_some() {
            base.scan.prefix = other.scan.prefix.clone();
        }
        if !other.scan.ignore_globs.is_empty() {
            base.scan.ignore_globs = other.scan.ignore_globs.clone();
        }
        if !other.scan.non_lakosian_dirs.is_empty() {
            base.scan.non_lakosian_dirs = other.scan.non_lakosian_dirs.clone();
        }
        if !other.scan.third_party_dirs.is_empty() {
            base.scan.third_party_dirs = other.scan.third_party_dirs.clone();
        }
        if !other.scan.include_paths.is_empty() {
            base.scan.include_paths = other.scan.include_paths.clone();
        }
        if other.scan.lakosian_rules.is_some() {
            base.scan.lakosian_rules = other.scan.lakosian_rules;
        }
        if other.scan.physical_only.is_some() {
            base.scan.physical_only = other.scan.physical_only;
        }
        if other.scan.debug_output.is_some() {
            base.scan.debug_output = other.scan.debug_output;
        }

        if other.output.database.is_some() {
            base.output.database = other.output.database.clone();
        }
        if other.output.force.is_some() {
            base.output.force = other.output.force;
        }
    }

    /// Apply environment variable overrides.
    /// `CODEVIS_SCAN_IGNORE` is a comma-separated glob list.
    fn apply_env_overrides(config: &mut CodevisConfig) {
        if let Ok(val) = std::env::var("CODEVIS_SCAN_THREADS") {
            if let Ok(v) = val.parse::<usize>() {
                config.scan.threads = Some(v);
            }
        }
        if let Ok(val) = std::env::var("CODEVIS_SCAN_PREFIX") {
            config.scan.prefix = Some(PathBuf::from(val));
        }
        if let Ok(val) = std::env::var("CODEVIS_SCAN_IGNORE") {
            config.scan.ignore_globs = val
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect();
        }
        if let Ok(val) = std::env::var("CODEVIS_OUTPUT_FORCE") {
            if let Ok(v) = val.parse::<bool>() {
                config.output.force = Some(v);
            }
        }
    }

    /// Apply CLI overrides (highest priority).
    fn apply_cli_overrides(config: &mut CodevisConfig, cli: &CliOverrides) {
        if let Some(v) = cli.scan_threads {
            config.scan.threads = Some(v);
        }
        if let Some(ref v) = cli.scan_prefix {
            config.scan.prefix = Some(v.clone());
        }
        if !cli.scan_ignore_globs.is_empty() {
            config.scan.ignore_globs = cli.scan_ignore_globs.clone();
        }
        if let Some(v) = cli.scan_physical_only {
            config.scan.physical_only = Some(v);
        }
        if let Some(v) = cli.scan_lakosian_rules {
            config.scan.lakosian_rules = Some(v);
        }
        if let Some(ref v) = cli.output_database {
            config.output.database = Some(v.clone());
        }
        if let Some(v) = cli.output_force {
            config.output.force = Some(v);
        }
    }

    /// Serialize the config back to TOML.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::ParseError {
            path: "<serialization>".to_string(),
            message: e.to_string(),
        })
    }
}

/// Cross-platform home directory resolution.
fn home_dir() -> Option<PathBuf> {
    std::env::var_os("HOME")
        .or_else(|| std::env::var_os("USERPROFILE"))
        .map(PathBuf::from)
}
