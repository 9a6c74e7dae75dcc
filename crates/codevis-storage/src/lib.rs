//! SQLite persistence for the codevis object store.
//!
//! A code database is a single SQLite file. [`SqliteWriter`] upserts a whole
//! store by qualified name, [`SqliteReader`] rebuilds a store from a file, and
//! [`merge`] folds any number of databases into one.

pub mod connection;
pub mod merge;
pub mod migrations;
pub mod queries;
pub mod reader;
pub mod writer;

pub use connection::CodebaseDb;
pub use merge::{merge_databases, merge_databases_silent};
pub use reader::SqliteReader;
pub use writer::SqliteWriter;
