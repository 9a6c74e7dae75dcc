//! Configuration system for codevis.
//! TOML-based, layered resolution: CLI > env > project > user > defaults.

pub mod codevis_config;
pub mod output_config;
pub mod scan_config;

pub use codevis_config::{CliOverrides, CodevisConfig};
pub use output_config::OutputConfig;
pub use scan_config::{ScanConfig, DEFAULT_IGNORE_GLOBS};
