//! # Pipeline Module
//!
//! Walks a photo tree and corrects capture times camera by camera.
//!
//! ## Per-file Stages
//! 1. **Ledger check** - files already corrected in an earlier run are skipped
//! 2. **Read** - capture time and serial number
//! 3. **Match** - look the serial up in the offset table
//! 4. **Write** - store the corrected time, then append a ledger row
//!
//! Processing is sequential: each file is fully handled before the next
//! one is read. Progress is reported after every photo.

mod executor;
mod progress;

pub use executor::{Pipeline, PipelineBuilder, PipelineConfig};
pub use progress::{estimate_remaining, format_duration, ProgressSnapshot, ProgressTracker};

use serde::{Deserialize, Serialize};

/// What happened to a single photo
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FileOutcome {
    /// Corrected time written and recorded
    Changed,
    /// Ledger already had a `changed` row; file left alone
    AlreadyChanged,
    /// No serial number in the metadata
    NoSerial,
    /// Serial number has no offset
    NoOffset,
    /// Serial matched but there is no usable capture time
    NoCaptureTime,
    /// The writer failed; no `changed` row recorded
    WriteFailed,
    /// The ledger could not be queried or appended to
    LedgerFailed,
}

impl std::fmt::Display for FileOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let text = match self {
            FileOutcome::Changed => "changed",
            FileOutcome::AlreadyChanged => "already changed",
            FileOutcome::NoSerial => "no serial number",
            FileOutcome::NoOffset => "no offset for camera",
            FileOutcome::NoCaptureTime => "no capture time",
            FileOutcome::WriteFailed => "write failed",
            FileOutcome::LedgerFailed => "ledger error",
        };
        f.write_str(text)
    }
}

/// Totals for one run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunSummary {
    /// Photos found by the counting pass
    pub total_files: usize,
    /// Photos visited
    pub processed: usize,
    pub changed: usize,
    pub already_changed: usize,
    pub no_serial: usize,
    pub no_offset: usize,
    pub no_capture_time: usize,
    pub write_failed: usize,
    pub ledger_failed: usize,
    /// `_ignore` directories pruned
    pub ignored_dirs: usize,
    /// Directory entries that could not be read
    pub walk_errors: usize,
    pub duration_ms: u64,
}

impl RunSummary {
    fn tally(&mut self, outcome: FileOutcome) {
        self.processed += 1;
        let counter = match outcome {
            FileOutcome::Changed => &mut self.changed,
            FileOutcome::AlreadyChanged => &mut self.already_changed,
            FileOutcome::NoSerial => &mut self.no_serial,
            FileOutcome::NoOffset => &mut self.no_offset,
            FileOutcome::NoCaptureTime => &mut self.no_capture_time,
            FileOutcome::WriteFailed => &mut self.write_failed,
            FileOutcome::LedgerFailed => &mut self.ledger_failed,
        };
        *counter += 1;
    }

    /// Photos that were visited but could not be corrected
    pub fn failures(&self) -> usize {
        self.no_serial + self.no_offset + self.no_capture_time + self.write_failed + self.ledger_failed
    }
}
