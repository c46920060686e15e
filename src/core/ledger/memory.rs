//! In-memory ledger backend for testing.

use super::traits::{now_stamp, path_key};
use super::{ChangeLedger, ChangeStatus, LedgerEntry};
use crate::error::LedgerError;
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::sync::{RwLock, RwLockReadGuard};

/// In-memory ledger backend
///
/// Same semantics as `SqliteLedger`, nothing survives the process.
pub struct InMemoryLedger {
    rows: RwLock<Vec<LedgerEntry>>,
}

impl InMemoryLedger {
    /// Create a new, empty in-memory ledger
    pub fn new() -> Self {
        Self {
            rows: RwLock::new(Vec::new()),
        }
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, Vec<LedgerEntry>>, LedgerError> {
        self.rows.read().map_err(|_| LedgerError::Poisoned {
            path: PathBuf::from("memory"),
        })
    }
}

impl Default for InMemoryLedger {
    fn default() -> Self {
        Self::new()
    }
}

impl ChangeLedger for InMemoryLedger {
    fn ensure_schema(&self) -> Result<(), LedgerError> {
        Ok(())
    }

    fn already_changed(&self, path: &Path) -> Result<bool, LedgerError> {
        let key = path_key(path);
        Ok(self
            .read()?
            .iter()
            .any(|row| row.file_path == key && row.status == ChangeStatus::Changed))
    }

    fn record(
        &self,
        file_name: &str,
        path: &Path,
        original_time: &str,
        changed_time: &str,
        status: ChangeStatus,
    ) -> Result<(), LedgerError> {
        let mut rows = self.rows.write().map_err(|_| LedgerError::Poisoned {
            path: PathBuf::from("memory"),
        })?;

        let id = rows.len() as i64 + 1;
        rows.push(LedgerEntry {
            id,
            file_name: file_name.to_string(),
            file_path: path_key(path),
            original_time: original_time.to_string(),
            changed_time: changed_time.to_string(),
            changed_at: now_stamp(),
            status,
        });
        Ok(())
    }

    fn entries_for(&self, path: &Path) -> Result<Vec<LedgerEntry>, LedgerError> {
        let key = path_key(path);
        Ok(self
            .read()?
            .iter()
            .filter(|row| row.file_path == key)
            .cloned()
            .collect())
    }

    fn row_count(&self) -> Result<usize, LedgerError> {
        Ok(self.read()?.len())
    }

    fn changed_paths(&self) -> Result<BTreeSet<String>, LedgerError> {
        Ok(self
            .read()?
            .iter()
            .filter(|row| row.status == ChangeStatus::Changed)
            .map(|row| row.file_path.clone())
            .collect())
    }
}
