//! Extraction engine for C++ codebases.
//!
//! Reads a compilation database, walks every translation unit on a bounded
//! worker pool and fills a shared [`codevis_model::ObjectStore`]: the physical
//! pass records files, components, packages and include-derived dependencies;
//! the logical pass records namespaces, types, functions and their uses; a
//! final pass gives every type a single owning file. A store read back from
//! an earlier database can be brought up to date from the files that changed.

pub mod compile_db;
pub mod constants;
pub mod executor;
pub mod hasher;
pub mod incremental;
pub mod logical;
pub mod parsers;
pub mod paths;
pub mod physical;
pub mod postprocess;
pub mod tool;

pub use compile_db::{CompilationDatabase, CompileCommand};
pub use constants::ToolConstants;
pub use executor::{ExecutionSummary, FrontendAction, ToolExecutor};
pub use incremental::{loaded_state, scan_changes, FileChanges};
pub use logical::{LogicalScanner, StaticFnHandler};
pub use paths::IgnoreGlobs;
pub use physical::PhysicalScanner;
pub use postprocess::postprocess;
pub use tool::Tool;
