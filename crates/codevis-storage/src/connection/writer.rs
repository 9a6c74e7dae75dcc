//! BEGIN IMMEDIATE transactions for writers.

use codevis_core::errors::StorageError;
use rusqlite::Connection;

/// Runs `f` inside a BEGIN IMMEDIATE transaction; rolls back if `f` fails.
pub fn with_immediate_transaction<F, T>(conn: &Connection, f: F) -> Result<T, StorageError>
where
    F: FnOnce(&rusqlite::Transaction<'_>) -> Result<T, StorageError>,
{
    conn.execute_batch("BEGIN IMMEDIATE")
        .map_err(|e| StorageError::SqliteError {
            message: format!("failed to begin immediate transaction: {e}"),
        })?;

    // BEGIN was issued above, so this wraps the open transaction without
    // starting another one.
    let tx = conn
        .unchecked_transaction()
        .map_err(|e| StorageError::SqliteError {
            message: format!("failed to wrap transaction: {e}"),
        })?;

    let result = f(&tx)?;

    tx.commit().map_err(|e| StorageError::SqliteError {
        message: format!("failed to commit: {e}"),
    })?;

    Ok(result)
}
