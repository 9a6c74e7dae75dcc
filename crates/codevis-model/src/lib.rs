//! In-memory dependency graph for C++ codebases.
//!
//! Physical entities (repositories, packages, components, files) and logical
//! entities (namespaces, types, functions, methods, fields, variables) live in
//! an [`ObjectStore`]. The store's own lock guards the qualified-name maps;
//! each entity carries an independent reader/writer lock for its fields and
//! relationship lists.

pub mod dump;
pub mod entities;
pub mod enums;
pub mod loader;
pub mod lockable;
pub mod node;
pub mod persistence;
pub mod relations;
pub mod store;

pub use entities::*;
pub use enums::{AccessSpecifier, ErrorKind, LakosRelationType, NodeKind, State, UdtKind};
pub use lockable::{with_ro_lock_two, with_rw_lock_two, Entity, EntityState};
pub use node::{EntityView, Node};
pub use persistence::{DatabaseReader, DatabaseWriter};
pub use store::{ObjectStore, Registry};
