//! Ledger backend trait definition.

use super::{ChangeStatus, LedgerEntry};
use crate::error::LedgerError;
use std::collections::BTreeSet;
use std::path::Path;

/// Trait for ledger backends
pub trait ChangeLedger: Send + Sync {
    /// Create the backing store if it does not exist yet. Idempotent.
    fn ensure_schema(&self) -> Result<(), LedgerError>;

    /// True iff at least one `changed` row exists for exactly this path
    fn already_changed(&self, path: &Path) -> Result<bool, LedgerError>;

    /// Append one row stamped with the current wall-clock time
    fn record(
        &self,
        file_name: &str,
        path: &Path,
        original_time: &str,
        changed_time: &str,
        status: ChangeStatus,
    ) -> Result<(), LedgerError>;

    /// All rows for a path, oldest first
    fn entries_for(&self, path: &Path) -> Result<Vec<LedgerEntry>, LedgerError>;

    /// Total number of rows
    fn row_count(&self) -> Result<usize, LedgerError>;

    /// Every path with at least one `changed` row
    fn changed_paths(&self) -> Result<BTreeSet<String>, LedgerError>;
}

impl<L: ChangeLedger + ?Sized> ChangeLedger for Box<L> {
    fn ensure_schema(&self) -> Result<(), LedgerError> {
        (**self).ensure_schema()
    }

    fn already_changed(&self, path: &Path) -> Result<bool, LedgerError> {
        (**self).already_changed(path)
    }

    fn record(
        &self,
        file_name: &str,
        path: &Path,
        original_time: &str,
        changed_time: &str,
        status: ChangeStatus,
    ) -> Result<(), LedgerError> {
        (**self).record(file_name, path, original_time, changed_time, status)
    }

    fn entries_for(&self, path: &Path) -> Result<Vec<LedgerEntry>, LedgerError> {
        (**self).entries_for(path)
    }

    fn row_count(&self) -> Result<usize, LedgerError> {
        (**self).row_count()
    }

    fn changed_paths(&self) -> Result<BTreeSet<String>, LedgerError> {
        (**self).changed_paths()
    }
}

/// Current wall-clock time in the format stored in `changed_at`
pub(crate) fn now_stamp() -> String {
    chrono::Local::now().to_rfc3339_opts(chrono::SecondsFormat::Micros, false)
}

/// Key under which a path is stored
pub(crate) fn path_key(path: &Path) -> String {
    path.to_string_lossy().into_owned()
}
