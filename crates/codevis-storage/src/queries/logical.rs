//! Namespaces, types, members, free functions, variables and error messages.

use codevis_core::errors::StorageError;
use rusqlite::{params, Connection};

use super::{insert, query_all, query_id};

#[derive(Debug, Clone)]
pub struct NamespaceRow {
    pub parent_id: Option<i64>,
    pub name: String,
    pub qualified_name: String,
}

#[derive(Debug, Clone)]
pub struct VariableRow {
    pub namespace_id: Option<i64>,
    pub name: String,
    pub qualified_name: String,
    pub signature: String,
    pub is_global: bool,
}

#[derive(Debug, Clone)]
pub struct FunctionRow {
    pub namespace_id: Option<i64>,
    pub name: String,
    pub qualified_name: String,
    pub signature: String,
    pub return_type: String,
    pub template_parameters: String,
}

#[derive(Debug, Clone)]
pub struct ClassRow {
    pub namespace_id: Option<i64>,
    pub parent_class_id: Option<i64>,
    pub package_id: Option<i64>,
    pub name: String,
    pub qualified_name: String,
    pub kind: i64,
    pub access: i64,
}

#[derive(Debug, Clone)]
pub struct FieldRow {
    pub class_id: Option<i64>,
    pub name: String,
    pub qualified_name: String,
    pub signature: String,
    pub access: i64,
    pub is_static: bool,
}

#[derive(Debug, Clone)]
pub struct MethodRow {
    pub class_id: Option<i64>,
    pub name: String,
    pub qualified_name: String,
    pub signature: String,
    pub return_type: String,
    pub template_parameters: String,
    pub access: i64,
    pub is_virtual: bool,
    pub is_pure: bool,
    pub is_static: bool,
    pub is_const: bool,
}

#[derive(Debug, Clone)]
pub struct ErrorRow {
    pub kind: i64,
    pub qualified_name: String,
    pub message: String,
    pub file_name: String,
}

pub fn find_namespace_id(conn: &Connection, qualified_name: &str) -> Result<Option<i64>, StorageError> {
    query_id(
        conn,
        "SELECT id FROM namespace_declaration WHERE qualified_name = ?1",
        params![qualified_name],
    )
}

pub fn insert_namespace(conn: &Connection, row: &NamespaceRow) -> Result<i64, StorageError> {
    insert(
        conn,
        "INSERT INTO namespace_declaration (parent_id, name, qualified_name) VALUES (?1, ?2, ?3)",
        params![row.parent_id, row.name, row.qualified_name],
    )
}

pub fn load_namespaces(conn: &Connection) -> Result<Vec<(i64, NamespaceRow)>, StorageError> {
    query_all(
        conn,
        "SELECT id, parent_id, name, qualified_name FROM namespace_declaration ORDER BY id",
        |row| {
            Ok((
                row.get(0)?,
                NamespaceRow {
                    parent_id: row.get(1)?,
                    name: row.get(2)?,
                    qualified_name: row.get(3)?,
                },
            ))
        },
    )
}

pub fn find_variable_id(conn: &Connection, qualified_name: &str) -> Result<Option<i64>, StorageError> {
    query_id(
        conn,
        "SELECT id FROM variable_declaration WHERE qualified_name = ?1",
        params![qualified_name],
    )
}

pub fn insert_variable(conn: &Connection, row: &VariableRow) -> Result<i64, StorageError> {
    insert(
        conn,
        "INSERT INTO variable_declaration (namespace_id, name, qualified_name, signature, is_global)
         VALUES (?1, ?2, ?3, ?4, ?5)",
        params![row.namespace_id, row.name, row.qualified_name, row.signature, row.is_global],
    )
}

pub fn load_variables(conn: &Connection) -> Result<Vec<(i64, VariableRow)>, StorageError> {
    query_all(
        conn,
        "SELECT id, namespace_id, name, qualified_name, signature, is_global
         FROM variable_declaration ORDER BY id",
        |row| {
            Ok((
                row.get(0)?,
                VariableRow {
                    namespace_id: row.get(1)?,
                    name: row.get(2)?,
                    qualified_name: row.get(3)?,
                    signature: row.get(4)?,
                    is_global: row.get(5)?,
                },
            ))
        },
    )
}

pub fn find_function_id(
    conn: &Connection,
    qualified_name: &str,
    signature: &str,
    template_parameters: &str,
    return_type: &str,
) -> Result<Option<i64>, StorageError> {
    query_id(
        conn,
        "SELECT id FROM function_declaration
         WHERE qualified_name = ?1 AND signature = ?2 AND template_parameters = ?3 AND return_type = ?4",
        params![qualified_name, signature, template_parameters, return_type],
    )
}

pub fn insert_function(conn: &Connection, row: &FunctionRow) -> Result<i64, StorageError> {
    insert(
        conn,
        "INSERT INTO function_declaration
            (namespace_id, name, qualified_name, signature, return_type, template_parameters)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        params![
            row.namespace_id,
            row.name,
            row.qualified_name,
            row.signature,
            row.return_type,
            row.template_parameters
        ],
    )
}

pub fn load_functions(conn: &Connection) -> Result<Vec<(i64, FunctionRow)>, StorageError> {
    query_all(
        conn,
        "SELECT id, namespace_id, name, qualified_name, signature, return_type, template_parameters
         FROM function_declaration ORDER BY id",
        |row| {
            Ok((
                row.get(0)?,
                FunctionRow {
                    namespace_id: row.get(1)?,
                    name: row.get(2)?,
                    qualified_name: row.get(3)?,
                    signature: row.get(4)?,
                    return_type: row.get(5)?,
                    template_parameters: row.get(6)?,
                },
            ))
        },
    )
}

pub fn find_class_id(conn: &Connection, qualified_name: &str) -> Result<Option<i64>, StorageError> {
    query_id(
        conn,
        "SELECT id FROM class_declaration WHERE qualified_name = ?1",
        params![qualified_name],
    )
}

pub fn insert_class(conn: &Connection, row: &ClassRow) -> Result<i64, StorageError> {
    insert(
        conn,
        "INSERT INTO class_declaration
            (parent_namespace_id, class_namespace_id, parent_package_id, name, qualified_name, kind, access)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        params![
            row.namespace_id,
            row.parent_class_id,
            row.package_id,
            row.name,
            row.qualified_name,
            row.kind,
            row.access
        ],
    )
}

pub fn load_classes(conn: &Connection) -> Result<Vec<(i64, ClassRow)>, StorageError> {
    query_all(
        conn,
        "SELECT id, parent_namespace_id, class_namespace_id, parent_package_id, name, qualified_name, kind, access
         FROM class_declaration ORDER BY id",
        |row| {
            Ok((
                row.get(0)?,
                ClassRow {
                    namespace_id: row.get(1)?,
                    parent_class_id: row.get(2)?,
                    package_id: row.get(3)?,
                    name: row.get(4)?,
                    qualified_name: row.get(5)?,
                    kind: row.get(6)?,
                    access: row.get(7)?,
                },
            ))
        },
    )
}

pub fn find_field_id(conn: &Connection, qualified_name: &str) -> Result<Option<i64>, StorageError> {
    query_id(
        conn,
        "SELECT id FROM field_declaration WHERE qualified_name = ?1",
        params![qualified_name],
    )
}

pub fn insert_field(conn: &Connection, row: &FieldRow) -> Result<i64, StorageError> {
    insert(
        conn,
        "INSERT INTO field_declaration (class_id, name, qualified_name, signature, access, is_static)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        params![
            row.class_id,
            row.name,
            row.qualified_name,
            row.signature,
            row.access,
            row.is_static
        ],
    )
}

pub fn load_fields(conn: &Connection) -> Result<Vec<(i64, FieldRow)>, StorageError> {
    query_all(
        conn,
        "SELECT id, class_id, name, qualified_name, signature, access, is_static
         FROM field_declaration ORDER BY id",
        |row| {
            Ok((
                row.get(0)?,
                FieldRow {
                    class_id: row.get(1)?,
                    name: row.get(2)?,
                    qualified_name: row.get(3)?,
                    signature: row.get(4)?,
                    access: row.get(5)?,
                    is_static: row.get(6)?,
                },
            ))
        },
    )
}

pub fn find_method_id(
    conn: &Connection,
    qualified_name: &str,
    signature: &str,
    template_parameters: &str,
    return_type: &str,
) -> Result<Option<i64>, StorageError> {
    query_id(
        conn,
        "SELECT id FROM method_declaration
         WHERE qualified_name = ?1 AND signature = ?2 AND template_parameters = ?3 AND return_type = ?4",
        params![qualified_name, signature, template_parameters, return_type],
    )
}

pub fn insert_method(conn: &Connection, row: &MethodRow) -> Result<i64, StorageError> {
    insert(
        conn,
        "INSERT INTO method_declaration
            (class_id, name, qualified_name, signature, return_type, template_parameters,
             access, is_virtual, is_pure, is_static, is_const)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
        params![
            row.class_id,
            row.name,
            row.qualified_name,
            row.signature,
            row.return_type,
            row.template_parameters,
            row.access,
            row.is_virtual,
            row.is_pure,
            row.is_static,
            row.is_const
        ],
    )
}

pub fn load_methods(conn: &Connection) -> Result<Vec<(i64, MethodRow)>, StorageError> {
    query_all(
        conn,
        "SELECT id, class_id, name, qualified_name, signature, return_type, template_parameters,
                access, is_virtual, is_pure, is_static, is_const
         FROM method_declaration ORDER BY id",
        |row| {
            Ok((
                row.get(0)?,
                MethodRow {
                    class_id: row.get(1)?,
                    name: row.get(2)?,
                    qualified_name: row.get(3)?,
                    signature: row.get(4)?,
                    return_type: row.get(5)?,
                    template_parameters: row.get(6)?,
                    access: row.get(7)?,
                    is_virtual: row.get(8)?,
                    is_pure: row.get(9)?,
                    is_static: row.get(10)?,
                    is_const: row.get(11)?,
                },
            ))
        },
    )
}

/// Inserts unless an identical (name, message, file) row exists.
pub fn insert_error_if_missing(conn: &Connection, row: &ErrorRow) -> Result<(), StorageError> {
    let mut stmt = conn
        .prepare_cached(
            "INSERT OR IGNORE INTO error_messages (error_kind, fully_qualified_name, error_message, file_name)
             VALUES (?1, ?2, ?3, ?4)",
        )
        .map_err(StorageError::sqlite)?;
    stmt.execute(params![row.kind, row.qualified_name, row.message, row.file_name])
        .map_err(StorageError::sqlite)?;
    Ok(())
}

pub fn load_errors(conn: &Connection) -> Result<Vec<ErrorRow>, StorageError> {
    query_all(
        conn,
        "SELECT error_kind, fully_qualified_name, error_message, file_name FROM error_messages ORDER BY id",
        |row| {
            Ok(ErrorRow {
                kind: row.get(0)?,
                qualified_name: row.get(1)?,
                message: row.get(2)?,
                file_name: row.get(3)?,
            })
        },
    )
}
