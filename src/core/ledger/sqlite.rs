//! SQLite ledger backend for persistent storage.

use super::traits::{now_stamp, path_key};
use super::{ChangeLedger, ChangeStatus, LedgerEntry};
use crate::error::LedgerError;
use rusqlite::{params, Connection, Row};
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

/// SQLite-backed change ledger
///
/// Every append runs in autocommit mode, so each row is durable as soon
/// as `record` returns.
pub struct SqliteLedger {
    conn: Mutex<Connection>,
    db_path: PathBuf,
}

impl SqliteLedger {
    /// Open or create a ledger database at the given path
    pub fn open(path: &Path) -> Result<Self, LedgerError> {
        // Create parent directories if needed
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| LedgerError::OpenFailed {
                path: path.to_path_buf(),
                reason: e.to_string(),
            })?;
        }

        let conn = Connection::open(path).map_err(|e| LedgerError::OpenFailed {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        let ledger = Self {
            conn: Mutex::new(conn),
            db_path: path.to_path_buf(),
        };
        ledger.ensure_schema()?;
        Ok(ledger)
    }

    /// Path of the database file
    pub fn path(&self) -> &Path {
        &self.db_path
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>, LedgerError> {
        self.conn.lock().map_err(|_| LedgerError::Poisoned {
            path: self.db_path.clone(),
        })
    }

    fn row_to_entry(row: &Row<'_>) -> rusqlite::Result<LedgerEntry> {
        let status: String = row.get(6)?;
        Ok(LedgerEntry {
            id: row.get(0)?,
            file_name: row.get(1)?,
            file_path: row.get(2)?,
            original_time: row.get(3)?,
            changed_time: row.get(4)?,
            changed_at: row.get(5)?,
            // Unknown statuses never count as changed
            status: ChangeStatus::from_str(&status).unwrap_or(ChangeStatus::Skipped),
        })
    }
}

impl ChangeLedger for SqliteLedger {
    fn ensure_schema(&self) -> Result<(), LedgerError> {
        let conn = self.lock()?;

        conn.execute(
            "CREATE TABLE IF NOT EXISTS file_updates (
                id INTEGER PRIMARY KEY,
                file_name TEXT,
                file_path TEXT,
                original_time TEXT,
                changed_time TEXT,
                changed_at TEXT,
                status TEXT
            )",
            [],
        )
        .map_err(|e| LedgerError::QueryFailed(e.to_string()))?;

        // Create index for faster lookups
        conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_file_updates_path ON file_updates(file_path, status)",
            [],
        )
        .map_err(|e| LedgerError::QueryFailed(e.to_string()))?;

        Ok(())
    }

    fn already_changed(&self, path: &Path) -> Result<bool, LedgerError> {
        let conn = self.lock()?;

        conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM file_updates WHERE file_path = ? AND status = 'changed')",
            [path_key(path)],
            |row| row.get::<_, bool>(0),
        )
        .map_err(|e| LedgerError::QueryFailed(e.to_string()))
    }

    fn record(
        &self,
        file_name: &str,
        path: &Path,
        original_time: &str,
        changed_time: &str,
        status: ChangeStatus,
    ) -> Result<(), LedgerError> {
        let conn = self.lock()?;

        conn.execute(
            "INSERT INTO file_updates
             (file_name, file_path, original_time, changed_time, changed_at, status)
             VALUES (?, ?, ?, ?, ?, ?)",
            params![
                file_name,
                path_key(path),
                original_time,
                changed_time,
                now_stamp(),
                status.as_str(),
            ],
        )
        .map_err(|e| LedgerError::QueryFailed(e.to_string()))?;

        Ok(())
    }

    fn entries_for(&self, path: &Path) -> Result<Vec<LedgerEntry>, LedgerError> {
        let conn = self.lock()?;

        let mut stmt = conn
            .prepare(
                "SELECT id, file_name, file_path, original_time, changed_time, changed_at, status
                 FROM file_updates WHERE file_path = ? ORDER BY id",
            )
            .map_err(|e| LedgerError::QueryFailed(e.to_string()))?;

        let entries = stmt
            .query_map([path_key(path)], Self::row_to_entry)
            .map_err(|e| LedgerError::QueryFailed(e.to_string()))?
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| LedgerError::QueryFailed(e.to_string()))?;

        Ok(entries)
    }

    fn row_count(&self) -> Result<usize, LedgerError> {
        let conn = self.lock()?;

        conn.query_row("SELECT COUNT(*) FROM file_updates", [], |row| {
            row.get::<_, i64>(0).map(|v| v as usize)
        })
        .map_err(|e| LedgerError::QueryFailed(e.to_string()))
    }

    fn changed_paths(&self) -> Result<BTreeSet<String>, LedgerError> {
        let conn = self.lock()?;

        let mut stmt = conn
            .prepare("SELECT DISTINCT file_path FROM file_updates WHERE status = 'changed'")
            .map_err(|e| LedgerError::QueryFailed(e.to_string()))?;

        let paths = stmt
            .query_map([], |row| row.get::<_, String>(0))
            .map_err(|e| LedgerError::QueryFailed(e.to_string()))?
            .collect::<Result<BTreeSet<_>, _>>()
            .map_err(|e| LedgerError::QueryFailed(e.to_string()))?;

        Ok(paths)
    }
}
