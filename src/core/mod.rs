//! # Core Module
//!
//! The capture-time correction engine, independent of any front end.
//!
//! ## Modules
//! - `scanner` - Discovers photos, pruning `_ignore` folders
//! - `metadata` - Reads capture time and camera serial number
//! - `offsets` - Builds the per-camera offset table
//! - `timestamp` - Capture time parsing, formatting and offsets
//! - `writer` - Writes corrected times back to files
//! - `ledger` - Durable record of every change
//! - `pipeline` - Orchestrates the full run
//! - `exiftool` - Shared handle on the external exiftool program

pub mod exiftool;
pub mod ledger;
pub mod metadata;
pub mod offsets;
pub mod pipeline;
pub mod scanner;
pub mod timestamp;
pub mod writer;

// Re-export commonly used types
pub use ledger::{ChangeLedger, ChangeStatus, LedgerEntry};
pub use metadata::{MetadataReader, MetadataRecord};
pub use offsets::{OffsetResolver, OffsetTable};
pub use pipeline::{FileOutcome, Pipeline, RunSummary};
pub use timestamp::{TimeOffset, TimeStyle};
pub use writer::TimestampWriter;
