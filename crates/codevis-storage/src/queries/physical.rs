//! Repositories, packages, components and files.

use codevis_core::errors::StorageError;
use rusqlite::{params, Connection};

use super::{insert, query_all, query_id};

#[derive(Debug, Clone)]
pub struct RepositoryRow {
    pub name: String,
    pub qualified_name: String,
    pub disk_path: String,
}

#[derive(Debug, Clone)]
pub struct PackageRow {
    pub parent_id: Option<i64>,
    pub repository_id: Option<i64>,
    pub name: String,
    pub qualified_name: String,
    pub disk_path: String,
}

#[derive(Debug, Clone)]
pub struct ComponentRow {
    pub package_id: Option<i64>,
    pub name: String,
    pub qualified_name: String,
}

#[derive(Debug, Clone)]
pub struct FileRow {
    pub package_id: Option<i64>,
    pub component_id: Option<i64>,
    pub name: String,
    pub qualified_name: String,
    pub is_header: bool,
    pub hash: String,
}

pub fn find_repository_id(conn: &Connection, qualified_name: &str) -> Result<Option<i64>, StorageError> {
    query_id(
        conn,
        "SELECT id FROM source_repository WHERE qualified_name = ?1",
        params![qualified_name],
    )
}

pub fn insert_repository(conn: &Connection, row: &RepositoryRow) -> Result<i64, StorageError> {
    insert(
        conn,
        "INSERT INTO source_repository (name, qualified_name, disk_path) VALUES (?1, ?2, ?3)",
        params![row.name, row.qualified_name, row.disk_path],
    )
}

pub fn load_repositories(conn: &Connection) -> Result<Vec<(i64, RepositoryRow)>, StorageError> {
    query_all(
        conn,
        "SELECT id, name, qualified_name, disk_path FROM source_repository ORDER BY id",
        |row| {
            Ok((
                row.get(0)?,
                RepositoryRow {
                    name: row.get(1)?,
                    qualified_name: row.get(2)?,
                    disk_path: row.get(3)?,
                },
            ))
        },
    )
}

pub fn find_package_id(conn: &Connection, qualified_name: &str) -> Result<Option<i64>, StorageError> {
    query_id(
        conn,
        "SELECT id FROM source_package WHERE qualified_name = ?1",
        params![qualified_name],
    )
}

pub fn insert_package(conn: &Connection, row: &PackageRow) -> Result<i64, StorageError> {
    insert(
        conn,
        "INSERT INTO source_package (parent_id, source_repository_id, name, qualified_name, disk_path)
         VALUES (?1, ?2, ?3, ?4, ?5)",
        params![row.parent_id, row.repository_id, row.name, row.qualified_name, row.disk_path],
    )
}

pub fn load_packages(conn: &Connection) -> Result<Vec<(i64, PackageRow)>, StorageError> {
    query_all(
        conn,
        "SELECT id, parent_id, source_repository_id, name, qualified_name, disk_path
         FROM source_package ORDER BY id",
        |row| {
            Ok((
                row.get(0)?,
                PackageRow {
                    parent_id: row.get(1)?,
                    repository_id: row.get(2)?,
                    name: row.get(3)?,
                    qualified_name: row.get(4)?,
                    disk_path: row.get(5)?,
                },
            ))
        },
    )
}

pub fn find_component_id(conn: &Connection, qualified_name: &str) -> Result<Option<i64>, StorageError> {
    query_id(
        conn,
        "SELECT id FROM source_component WHERE qualified_name = ?1",
        params![qualified_name],
    )
}

pub fn insert_component(conn: &Connection, row: &ComponentRow) -> Result<i64, StorageError> {
    insert(
        conn,
        "INSERT INTO source_component (qualified_name, name, package_id) VALUES (?1, ?2, ?3)",
        params![row.qualified_name, row.name, row.package_id],
    )
}

pub fn load_components(conn: &Connection) -> Result<Vec<(i64, ComponentRow)>, StorageError> {
    query_all(
        conn,
        "SELECT id, package_id, name, qualified_name FROM source_component ORDER BY id",
        |row| {
            Ok((
                row.get(0)?,
                ComponentRow {
                    package_id: row.get(1)?,
                    name: row.get(2)?,
                    qualified_name: row.get(3)?,
                },
            ))
        },
    )
}

pub fn find_file_id(conn: &Connection, qualified_name: &str) -> Result<Option<i64>, StorageError> {
    query_id(
        conn,
        "SELECT id FROM source_file WHERE qualified_name = ?1",
        params![qualified_name],
    )
}

pub fn insert_file(conn: &Connection, row: &FileRow) -> Result<i64, StorageError> {
    insert(
        conn,
        "INSERT INTO source_file (package_id, component_id, name, qualified_name, is_header, hash)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        params![
            row.package_id,
            row.component_id,
            row.name,
            row.qualified_name,
            row.is_header,
            row.hash
        ],
    )
}

pub fn load_files(conn: &Connection) -> Result<Vec<(i64, FileRow)>, StorageError> {
    query_all(
        conn,
        "SELECT id, package_id, component_id, name, qualified_name, is_header, hash
         FROM source_file ORDER BY id",
        |row| {
            Ok((
                row.get(0)?,
                FileRow {
                    package_id: row.get(1)?,
                    component_id: row.get(2)?,
                    name: row.get(3)?,
                    qualified_name: row.get(4)?,
                    is_header: row.get(5)?,
                    hash: row.get(6)?,
                },
            ))
        },
    )
}

pub fn count_rows(conn: &Connection, table: PhysicalTable) -> Result<i64, StorageError> {
    let sql = match table {
        PhysicalTable::Repository => "SELECT COUNT(*) FROM source_repository",
        PhysicalTable::Package => "SELECT COUNT(*) FROM source_package",
        PhysicalTable::Component => "SELECT COUNT(*) FROM source_component",
        PhysicalTable::File => "SELECT COUNT(*) FROM source_file",
    };
    conn.query_row(sql, [], |row| row.get(0))
        .map_err(StorageError::sqlite)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PhysicalTable {
    Repository,
    Package,
    Component,
    File,
}
