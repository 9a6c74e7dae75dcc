//! Output database configuration.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(default)]
pub struct OutputConfig {
    /// Where the code database is written.
    pub database: Option<PathBuf>,
    /// Overwrite an existing output database. Default: false.
    pub force: Option<bool>,
}

impl OutputConfig {
    pub fn effective_force(&self) -> bool {
        self.force.unwrap_or(false)
    }
}
