//! Relationship join tables. Every table is a set of `(source, target)` id pairs.

use codevis_core::errors::StorageError;
use rusqlite::{params, Connection};

use super::query_all;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EdgeTable {
    /// package → package
    PackageDependency,
    /// component → component
    ComponentDependency,
    /// file → file
    Include,
    /// file → namespace
    NamespaceFile,
    /// file → function
    GlobalFunctionFile,
    /// derived class → base class
    ClassHierarchy,
    UsesInTheInterface,
    UsesInTheImplementation,
    /// class → component
    UdtComponent,
    /// class → file
    ClassSourceFile,
    /// field → class
    FieldType,
    /// method → class
    MethodArgumentClass,
    /// caller → callee
    FunctionCalls,
}

impl EdgeTable {
    pub const ALL: [EdgeTable; 13] = [
        EdgeTable::PackageDependency,
        EdgeTable::ComponentDependency,
        EdgeTable::Include,
        EdgeTable::NamespaceFile,
        EdgeTable::GlobalFunctionFile,
        EdgeTable::ClassHierarchy,
        EdgeTable::UsesInTheInterface,
        EdgeTable::UsesInTheImplementation,
        EdgeTable::UdtComponent,
        EdgeTable::ClassSourceFile,
        EdgeTable::FieldType,
        EdgeTable::MethodArgumentClass,
        EdgeTable::FunctionCalls,
    ];

    pub fn table_name(self) -> &'static str {
        match self {
            Self::PackageDependency => "dependencies",
            Self::ComponentDependency => "component_relation",
            Self::Include => "includes",
            Self::NamespaceFile => "namespace_source_file",
            Self::GlobalFunctionFile => "global_function_source_file",
            Self::ClassHierarchy => "class_hierarchy",
            Self::UsesInTheInterface => "uses_in_the_interface",
            Self::UsesInTheImplementation => "uses_in_the_implementation",
            Self::UdtComponent => "udt_component",
            Self::ClassSourceFile => "class_source_file",
            Self::FieldType => "field_type",
            Self::MethodArgumentClass => "method_argument_class",
            Self::FunctionCalls => "function_calls",
        }
    }

    fn insert_sql(self) -> &'static str {
        match self {
            Self::PackageDependency => "INSERT OR IGNORE INTO dependencies (source_id, target_id) VALUES (?1, ?2)",
            Self::ComponentDependency => {
                "INSERT OR IGNORE INTO component_relation (source_id, target_id) VALUES (?1, ?2)"
            }
            Self::Include => "INSERT OR IGNORE INTO includes (source_id, target_id) VALUES (?1, ?2)",
            Self::NamespaceFile => {
                "INSERT OR IGNORE INTO namespace_source_file (source_file_id, namespace_id) VALUES (?1, ?2)"
            }
            Self::GlobalFunctionFile => {
                "INSERT OR IGNORE INTO global_function_source_file (source_file_id, function_id) VALUES (?1, ?2)"
            }
            Self::ClassHierarchy => "INSERT OR IGNORE INTO class_hierarchy (source_id, target_id) VALUES (?1, ?2)",
            Self::UsesInTheInterface => {
                "INSERT OR IGNORE INTO uses_in_the_interface (source_id, target_id) VALUES (?1, ?2)"
            }
            Self::UsesInTheImplementation => {
                "INSERT OR IGNORE INTO uses_in_the_implementation (source_id, target_id) VALUES (?1, ?2)"
            }
            Self::UdtComponent => "INSERT OR IGNORE INTO udt_component (udt_id, component_id) VALUES (?1, ?2)",
            Self::ClassSourceFile => {
                "INSERT OR IGNORE INTO class_source_file (class_id, source_file_id) VALUES (?1, ?2)"
            }
            Self::FieldType => "INSERT OR IGNORE INTO field_type (field_id, type_class_id) VALUES (?1, ?2)",
            Self::MethodArgumentClass => {
                "INSERT OR IGNORE INTO method_argument_class (method_id, type_class_id) VALUES (?1, ?2)"
            }
            Self::FunctionCalls => "INSERT OR IGNORE INTO function_calls (caller_id, callee_id) VALUES (?1, ?2)",
        }
    }

    fn select_sql(self) -> &'static str {
        match self {
            Self::PackageDependency => "SELECT source_id, target_id FROM dependencies",
            Self::ComponentDependency => "SELECT source_id, target_id FROM component_relation",
            Self::Include => "SELECT source_id, target_id FROM includes",
            Self::NamespaceFile => "SELECT source_file_id, namespace_id FROM namespace_source_file",
            Self::GlobalFunctionFile => "SELECT source_file_id, function_id FROM global_function_source_file",
            Self::ClassHierarchy => "SELECT source_id, target_id FROM class_hierarchy",
            Self::UsesInTheInterface => "SELECT source_id, target_id FROM uses_in_the_interface",
            Self::UsesInTheImplementation => "SELECT source_id, target_id FROM uses_in_the_implementation",
            Self::UdtComponent => "SELECT udt_id, component_id FROM udt_component",
            Self::ClassSourceFile => "SELECT class_id, source_file_id FROM class_source_file",
            Self::FieldType => "SELECT field_id, type_class_id FROM field_type",
            Self::MethodArgumentClass => "SELECT method_id, type_class_id FROM method_argument_class",
            Self::FunctionCalls => "SELECT caller_id, callee_id FROM function_calls",
        }
    }
}

/// Idempotent: an existing edge is left alone.
pub fn insert_edge(conn: &Connection, table: EdgeTable, source: i64, target: i64) -> Result<(), StorageError> {
    let mut stmt = conn.prepare_cached(table.insert_sql()).map_err(StorageError::sqlite)?;
    stmt.execute(params![source, target]).map_err(StorageError::sqlite)?;
    Ok(())
}

pub fn load_edges(conn: &Connection, table: EdgeTable) -> Result<Vec<(i64, i64)>, StorageError> {
    query_all(conn, table.select_sql(), |row| Ok((row.get(0)?, row.get(1)?)))
}
