//! # Writer Module
//!
//! Writes corrected capture times back into photo files.
//!
//! `ExifToolWriter` sets DateTimeOriginal, CreateDate and ModifyDate in
//! place with `-overwrite_original`. exiftool rewrites the metadata block
//! only, so pixel data and all other tags are preserved.

use crate::core::exiftool::{stderr_summary, ExifTool};
use crate::error::WriteError;
use std::ffi::OsString;
use std::path::Path;
use tracing::info;

/// Metadata fields that receive the corrected time
pub const TIME_FIELDS: [&str; 3] = ["DateTimeOriginal", "CreateDate", "ModifyDate"];

/// Trait for timestamp writers
pub trait TimestampWriter {
    /// Store `new_time` (already formatted) in the file's time fields
    fn write(&self, path: &Path, new_time: &str) -> Result<(), WriteError>;
}

impl<W: TimestampWriter + ?Sized> TimestampWriter for &W {
    fn write(&self, path: &Path, new_time: &str) -> Result<(), WriteError> {
        (**self).write(path, new_time)
    }
}

impl<W: TimestampWriter + ?Sized> TimestampWriter for Box<W> {
    fn write(&self, path: &Path, new_time: &str) -> Result<(), WriteError> {
        (**self).write(path, new_time)
    }
}

/// Writes capture times with the external exiftool binary, for every format
#[derive(Debug, Clone, Default)]
pub struct ExifToolWriter {
    tool: ExifTool,
}

impl ExifToolWriter {
    pub fn new(tool: ExifTool) -> Self {
        Self { tool }
    }
}

/// Arguments for one in-place write
pub fn write_args(path: &Path, new_time: &str) -> Vec<OsString> {
    let mut args: Vec<OsString> = vec!["-overwrite_original".into()];
    args.extend(
        TIME_FIELDS
            .iter()
            .map(|field| OsString::from(format!("-{}={}", field, new_time))),
    );
    args.push(path.as_os_str().to_owned());
    args
}

impl TimestampWriter for ExifToolWriter {
    fn write(&self, path: &Path, new_time: &str) -> Result<(), WriteError> {
        let output = self
            .tool
            .run(write_args(path, new_time))
            .map_err(|source| WriteError::Spawn {
                program: self.tool.program_name(),
                path: path.to_path_buf(),
                source,
            })?;

        if !output.status.success() {
            return Err(WriteError::ToolFailed {
                program: self.tool.program_name(),
                path: path.to_path_buf(),
                status: output.status.to_string(),
                stderr: stderr_summary(&output),
            });
        }

        info!("Updated EXIF DateTimeOriginal for {} to {}", path.display(), new_time);
        Ok(())
    }
}
