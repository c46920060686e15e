//! Offset file parsing and reference-photo offset derivation.

use super::ResolvedOffsets;
use crate::core::metadata::MetadataReader;
use crate::core::timestamp::{parse_capture_time, TimeOffset};
use crate::error::OffsetError;
use csv::{ReaderBuilder, StringRecord, Trim};
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};
use tracing::{debug, error, info};

/// Builds an `OffsetTable` from an offset file
pub struct OffsetResolver<R> {
    reader: R,
}

impl<R: MetadataReader> OffsetResolver<R> {
    /// `reader` is used to read reference photos
    pub fn new(reader: R) -> Self {
        Self { reader }
    }

    /// Resolve an offset file. Only an unreadable file is an error; bad
    /// rows are logged and returned in `rejected`.
    pub fn resolve(&self, offsets_path: &Path) -> Result<ResolvedOffsets, OffsetError> {
        let file = File::open(offsets_path).map_err(|e| OffsetError::Read {
            path: offsets_path.to_path_buf(),
            reason: e.to_string(),
        })?;

        let base_dir = offsets_path.parent().unwrap_or(Path::new(""));
        Ok(self.resolve_from(file, base_dir))
    }

    /// Resolve offset rows from any reader
    pub fn resolve_from<I: Read>(&self, input: I, base_dir: &Path) -> ResolvedOffsets {
        let mut csv = ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .trim(Trim::All)
            .from_reader(input);

        let mut resolved = ResolvedOffsets::default();

        for (index, result) in csv.records().enumerate() {
            let outcome = match result {
                Ok(record) => {
                    let line = record
                        .position()
                        .map(|p| p.line())
                        .unwrap_or(index as u64 + 1);
                    self.parse_row(&record, line, base_dir)
                }
                Err(e) => Err(OffsetError::Malformed {
                    line: e.position().map(|p| p.line()).unwrap_or(index as u64 + 1),
                    reason: e.to_string(),
                }),
            };

            match outcome {
                Ok((serial, offset)) => {
                    if let Some(previous) = resolved.table.insert(&serial, offset) {
                        debug!(
                            "Offset for serial number {} replaced ({} -> {})",
                            serial, previous, offset
                        );
                    }
                }
                Err(e) => {
                    error!("Skipping offset row: {}", e);
                    resolved.rejected.push(e);
                }
            }
        }

        info!(
            "Resolved offsets for {} camera(s), {} row(s) rejected",
            resolved.table.len(),
            resolved.rejected.len()
        );

        resolved
    }

    fn parse_row(
        &self,
        record: &StringRecord,
        line: u64,
        base_dir: &Path,
    ) -> Result<(String, TimeOffset), OffsetError> {
        let serial = record.get(0).unwrap_or_default().to_string();

        match record.len() {
            2 | 3 if serial.is_empty() => Err(OffsetError::EmptySerial { line }),
            2 => {
                let value = &record[1];
                let offset = value
                    .parse::<i64>()
                    .ok()
                    .and_then(TimeOffset::from_seconds)
                    .ok_or_else(|| OffsetError::InvalidOffset {
                        line,
                        serial: serial.clone(),
                        value: value.to_string(),
                    })?;
                info!("Offset for serial number {}: {}", serial, offset);
                Ok((serial, offset))
            }
            3 => {
                let actual = parse_capture_time(&record[2]).ok_or_else(|| {
                    OffsetError::InvalidTimestamp {
                        line,
                        serial: serial.clone(),
                        value: record[2].to_string(),
                    }
                })?;

                let reference = resolve_reference(&record[1], base_dir);
                let recorded = self
                    .reader
                    .read(&reference)
                    .capture_time
                    .ok_or_else(|| OffsetError::MissingReferenceTime {
                        line,
                        path: reference.clone(),
                    })?;

                let offset = TimeOffset::between(recorded, actual);
                info!(
                    "Calculated offset for serial number {}: {} (from {})",
                    serial,
                    offset,
                    reference.display()
                );
                Ok((serial, offset))
            }
            found => Err(OffsetError::FieldCount { line, found }),
        }
    }
}

/// Reference paths are taken as given. A relative path that does not exist
/// from the working directory falls back to the offset file's folder.
fn resolve_reference(raw: &str, base_dir: &Path) -> PathBuf {
    let path = PathBuf::from(raw);
    if path.is_absolute() || path.exists() {
        return path;
    }

    let beside_offsets = base_dir.join(&path);
    if beside_offsets.exists() {
        debug!(
            "Reference image {} found next to the offset file at {}",
            raw,
            beside_offsets.display()
        );
        beside_offsets
    } else {
        path
    }
}
