//! Error types for every codevis subsystem.
//! One enum per subsystem, each mapped to a stable error code.

pub mod compile_db_error;
pub mod config_error;
pub mod error_code;
pub mod executor_error;
pub mod loader_error;
pub mod merge_error;
pub mod scan_error;
pub mod storage_error;

pub use compile_db_error::CompilationDatabaseError;
pub use config_error::ConfigError;
pub use error_code::CodevisErrorCode;
pub use executor_error::ExecutorError;
pub use loader_error::LoaderError;
pub use merge_error::MergeError;
pub use scan_error::ScanError;
pub use storage_error::StorageError;
