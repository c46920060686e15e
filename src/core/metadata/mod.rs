//! # Metadata Module
//!
//! Extracts the capture time and camera serial number from photo files.
//!
//! ## Extracted Fields
//! - Capture time (DateTimeOriginal)
//! - Camera body serial number
//!
//! ## Readers
//! - `ExifReader` - in-process EXIF decoding for JPEG and TIFF
//! - `ExifToolReader` - `exiftool -json` subprocess for RAW files (NEF)
//! - `FormatDispatchReader` - picks one of the above by file extension
//!
//! Readers never fail: anything that cannot be extracted is logged and
//! left out of the returned record.

mod exif_reader;
mod exiftool_reader;

pub use exif_reader::ExifReader;
pub use exiftool_reader::ExifToolReader;

use crate::core::scanner::ImageFormat;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Metadata extracted from one photo
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetadataRecord {
    /// Original capture date/time as recorded by the camera
    pub capture_time: Option<NaiveDateTime>,
    /// Camera body serial number, trimmed
    pub serial: Option<String>,
}

impl MetadataRecord {
    /// Check if any metadata was extracted
    pub fn has_data(&self) -> bool {
        self.capture_time.is_some() || self.serial.is_some()
    }
}

/// Trait for metadata readers
///
/// Implement this trait to substitute another metadata backend.
pub trait MetadataReader {
    /// Read capture time and serial from a file. Never fails.
    fn read(&self, path: &Path) -> MetadataRecord;
}

impl<R: MetadataReader + ?Sized> MetadataReader for &R {
    fn read(&self, path: &Path) -> MetadataRecord {
        (**self).read(path)
    }
}

impl<R: MetadataReader + ?Sized> MetadataReader for Box<R> {
    fn read(&self, path: &Path) -> MetadataRecord {
        (**self).read(path)
    }
}

/// Routes RAW files to exiftool and everything else to the EXIF decoder
pub struct FormatDispatchReader {
    exif: ExifReader,
    raw: ExifToolReader,
}

impl FormatDispatchReader {
    pub fn new(raw: ExifToolReader) -> Self {
        Self {
            exif: ExifReader,
            raw,
        }
    }
}

impl Default for FormatDispatchReader {
    fn default() -> Self {
        Self::new(ExifToolReader::default())
    }
}

impl MetadataReader for FormatDispatchReader {
    fn read(&self, path: &Path) -> MetadataRecord {
        if ImageFormat::from_path(path).is_raw() {
            self.raw.read(path)
        } else {
            self.exif.read(path)
        }
    }
}

/// Normalise a serial number: trimmed, NUL-free, `None` when empty
pub(crate) fn normalize_serial(raw: &str) -> Option<String> {
    let trimmed = raw.trim_matches(|c: char| c == '\0' || c.is_whitespace());
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}
