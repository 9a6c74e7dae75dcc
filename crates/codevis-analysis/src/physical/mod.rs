//! Physical dependencies: files, components and packages, and the include
//! edges between them.

pub mod header_callbacks;
pub mod include_walker;
pub mod non_lakosian;
pub mod scanner;
pub mod source_file;

pub use header_callbacks::HeaderCallbacks;
pub use include_walker::{lexical_normalise, IncludeVisitor, IncludeWalker};
pub use scanner::PhysicalScanner;
pub use source_file::{file_qualified_name, write_source_file};
