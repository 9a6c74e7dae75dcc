//! Row-level queries, one module per table family.

pub mod edges;
pub mod logical;
pub mod physical;

use codevis_core::errors::StorageError;
use rusqlite::{Connection, OptionalExtension, Params};

/// Runs a single-column id lookup.
pub(crate) fn query_id(conn: &Connection, sql: &str, params: impl Params) -> Result<Option<i64>, StorageError> {
    let mut stmt = conn.prepare_cached(sql).map_err(StorageError::sqlite)?;
    stmt.query_row(params, |row| row.get(0))
        .optional()
        .map_err(StorageError::sqlite)
}

/// Runs a SELECT and collects every mapped row.
pub(crate) fn query_all<T>(
    conn: &Connection,
    sql: &str,
    map: impl FnMut(&rusqlite::Row<'_>) -> rusqlite::Result<T>,
) -> Result<Vec<T>, StorageError> {
    let mut stmt = conn.prepare_cached(sql).map_err(StorageError::sqlite)?;
    let rows = stmt.query_map([], map).map_err(StorageError::sqlite)?;

    let mut result = Vec::new();
    for row in rows {
        result.push(row.map_err(StorageError::sqlite)?);
    }
    Ok(result)
}

/// Runs an INSERT and returns the new rowid.
pub(crate) fn insert(conn: &Connection, sql: &str, params: impl Params) -> Result<i64, StorageError> {
    let mut stmt = conn.prepare_cached(sql).map_err(StorageError::sqlite)?;
    stmt.execute(params).map_err(StorageError::sqlite)?;
    Ok(conn.last_insert_rowid())
}
