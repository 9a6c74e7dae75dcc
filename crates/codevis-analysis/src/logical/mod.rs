//! Logical extraction: namespaces, user-defined types, functions and the
//! dependencies between them.

pub mod scanner;
pub mod static_fn;
pub mod syntax;
pub mod visitor;

pub use scanner::LogicalScanner;
pub use static_fn::{fn_id, FnId, StaticFnHandler};
pub use visitor::{LogicalVisitor, VisitStats};
