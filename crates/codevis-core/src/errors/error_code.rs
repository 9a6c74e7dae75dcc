//! CodevisErrorCode trait for structured error reporting at the CLI boundary.

/// Every error enum implements this to expose a stable code string.
pub trait CodevisErrorCode {
    /// Returns the error code string (e.g., "STORAGE_ERROR").
    fn error_code(&self) -> &'static str;

    /// Returns the formatted string: `[ERROR_CODE] message`.
    fn coded_string(&self) -> String
    where
        Self: std::fmt::Display,
    {
        format!("[{}] {}", self.error_code(), self)
    }
}

pub const SCAN_ERROR: &str = "SCAN_ERROR";
pub const CANCELLED: &str = "CANCELLED";
pub const CONFIG_ERROR: &str = "CONFIG_ERROR";
pub const STORAGE_ERROR: &str = "STORAGE_ERROR";
pub const SCHEMA_ERROR: &str = "SCHEMA_ERROR";
pub const MIGRATION_FAILED: &str = "MIGRATION_FAILED";
pub const DB_NOT_FOUND: &str = "DB_NOT_FOUND";
pub const COMPILE_DB_ERROR: &str = "COMPILE_DB_ERROR";
pub const EXECUTOR_ERROR: &str = "EXECUTOR_ERROR";
pub const MERGE_ERROR: &str = "MERGE_ERROR";
pub const LOADER_ERROR: &str = "LOADER_ERROR";
