//! Types for ledger storage.

use serde::{Deserialize, Serialize};

/// Outcome recorded for a file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangeStatus {
    /// The corrected time was written to the file
    Changed,
    /// The file was already corrected in an earlier run
    Skipped,
}

impl ChangeStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Changed => "changed",
            Self::Skipped => "skipped",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "changed" => Some(Self::Changed),
            "skipped" => Some(Self::Skipped),
            _ => None,
        }
    }
}

/// One row of the `file_updates` table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerEntry {
    pub id: i64,
    pub file_name: String,
    pub file_path: String,
    /// Capture time before correction, as read from the file
    pub original_time: String,
    /// Capture time written to the file
    pub changed_time: String,
    /// Wall-clock time of the ledger write (RFC 3339)
    pub changed_at: String,
    pub status: ChangeStatus,
}
