//! # Offsets Module
//!
//! Maps camera serial numbers to the clock correction for that camera.
//!
//! ## Offset File Format
//! One camera per line, comma separated, no header:
//! ```text
//! 3001234,3600
//! 6005678,reference/DSC_0042.JPG,2024:05:18 14:02:10
//! ```
//! The first form gives the offset in whole seconds. The second names a
//! reference photo and the real time it was taken; the offset is the
//! difference between that real time and the photo's embedded capture time.
//! Relative reference paths are opened from the working directory; when
//! nothing exists there, the offset file's folder is tried instead.
//! Blank lines are skipped. Every other malformed row is logged and rejected.

mod resolver;

pub use resolver::OffsetResolver;

use crate::core::timestamp::TimeOffset;
use crate::error::OffsetError;
use std::collections::HashMap;

/// Serial number -> clock correction. Built once per run, read-only after.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OffsetTable {
    entries: HashMap<String, TimeOffset>,
}

impl OffsetTable {
    /// Insert or replace (last write wins). Returns the replaced offset.
    pub(crate) fn insert(&mut self, serial: &str, offset: TimeOffset) -> Option<TimeOffset> {
        self.entries.insert(serial.trim().to_string(), offset)
    }

    /// Exact, case-sensitive lookup of a trimmed serial
    pub fn get(&self, serial: &str) -> Option<TimeOffset> {
        self.entries.get(serial.trim()).copied()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<S: AsRef<str>> FromIterator<(S, TimeOffset)> for OffsetTable {
    fn from_iter<I: IntoIterator<Item = (S, TimeOffset)>>(iter: I) -> Self {
        let mut table = OffsetTable::default();
        for (serial, offset) in iter {
            table.insert(serial.as_ref(), offset);
        }
        table
    }
}

/// Result of resolving an offset file
#[derive(Debug, Default)]
pub struct ResolvedOffsets {
    /// Offsets from every accepted row
    pub table: OffsetTable,
    /// Rows that were skipped, with the reason
    pub rejected: Vec<OffsetError>,
}
