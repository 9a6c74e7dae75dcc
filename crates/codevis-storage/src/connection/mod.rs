//! Connection management for one code database file.

pub mod pragmas;
pub mod writer;

use std::path::{Path, PathBuf};

use codevis_core::errors::StorageError;
use rusqlite::Connection;

use self::pragmas::{apply_pragmas, apply_read_pragmas};
use crate::migrations;

/// An open code database.
pub struct CodebaseDb {
    conn: Connection,
    path: Option<PathBuf>,
}

impl CodebaseDb {
    /// Open `path` for writing, creating it if needed, and bring the schema up to date.
    pub fn create_or_open(path: &Path) -> Result<Self, StorageError> {
        let conn = Connection::open(path).map_err(StorageError::sqlite)?;
        apply_pragmas(&conn)?;
        migrations::run_migrations(&conn)?;
        Ok(Self {
            conn,
            path: Some(path.to_path_buf()),
        })
    }

    /// Open an existing database for reading. The schema must be one this
    /// build understands; it is never migrated on read.
    pub fn open_existing(path: &Path) -> Result<Self, StorageError> {
        if !path.is_file() {
            return Err(StorageError::NotFound {
                path: path.to_path_buf(),
            });
        }
        let conn = Connection::open(path).map_err(StorageError::sqlite)?;
        apply_read_pragmas(&conn)?;

        let found = migrations::current_version(&conn)?;
        if found != migrations::LATEST_VERSION {
            return Err(StorageError::SchemaVersion {
                found,
                supported: migrations::LATEST_VERSION,
            });
        }
        Ok(Self {
            conn,
            path: Some(path.to_path_buf()),
        })
    }

    /// In-memory database with the full schema (for testing).
    pub fn open_in_memory() -> Result<Self, StorageError> {
        let conn = Connection::open_in_memory().map_err(StorageError::sqlite)?;
        conn.execute_batch("PRAGMA foreign_keys = ON;")
            .map_err(StorageError::sqlite)?;
        migrations::run_migrations(&conn)?;
        Ok(Self { conn, path: None })
    }

    pub fn conn(&self) -> &Connection {
        &self.conn
    }

    /// Runs `f` in a single BEGIN IMMEDIATE transaction.
    pub fn with_transaction<F, T>(&self, f: F) -> Result<T, StorageError>
    where
        F: FnOnce(&rusqlite::Transaction<'_>) -> Result<T, StorageError>,
    {
        writer::with_immediate_transaction(&self.conn, f)
    }

    /// Fold the WAL back into the main file so the database is a single
    /// self-contained file again.
    pub fn checkpoint(&self) -> Result<(), StorageError> {
        self.conn
            .execute_batch("PRAGMA wal_checkpoint(TRUNCATE);")
            .map_err(StorageError::sqlite)
    }

    /// None for in-memory databases.
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }
}
