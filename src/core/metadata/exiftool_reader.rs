//! RAW metadata reader that shells out to `exiftool -json`.

use super::{normalize_serial, MetadataReader, MetadataRecord};
use crate::core::exiftool::{stderr_summary, ExifTool};
use crate::core::timestamp::parse_capture_time;
use crate::error::MetadataError;
use serde::Deserialize;
use serde_json::Value;
use std::ffi::OsStr;
use std::path::Path;
use tracing::{debug, error, warn};

/// One object of exiftool's JSON array output
#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct ExifToolEntry {
    date_time_original: Option<Value>,
    serial_number: Option<Value>,
}

/// Reads RAW metadata through the external exiftool binary
#[derive(Debug, Clone, Default)]
pub struct ExifToolReader {
    tool: ExifTool,
}

impl ExifToolReader {
    pub fn new(tool: ExifTool) -> Self {
        Self { tool }
    }

    fn query(&self, path: &Path) -> Result<ExifToolEntry, MetadataError> {
        let output = self
            .tool
            .run([
                OsStr::new("-json"),
                OsStr::new("-DateTimeOriginal"),
                OsStr::new("-SerialNumber"),
                path.as_os_str(),
            ])
            .map_err(|e| MetadataError::Tool {
                path: path.to_path_buf(),
                reason: e.to_string(),
            })?;

        // exiftool still prints JSON for partially readable files, so only
        // treat an empty stdout as a hard failure.
        if output.stdout.iter().all(u8::is_ascii_whitespace) {
            return Err(MetadataError::Tool {
                path: path.to_path_buf(),
                reason: stderr_summary(&output),
            });
        }

        parse_output(&output.stdout).map_err(|reason| MetadataError::Output {
            path: path.to_path_buf(),
            reason,
        })
    }
}

impl MetadataReader for ExifToolReader {
    fn read(&self, path: &Path) -> MetadataRecord {
        let mut record = MetadataRecord::default();

        let entry = match self.query(path) {
            Ok(entry) => entry,
            Err(e) => {
                error!("Error extracting EXIF data using exiftool: {}", e);
                return record;
            }
        };

        if let Some(raw) = entry.date_time_original.as_ref().and_then(scalar_to_string) {
            record.capture_time = parse_capture_time(&raw);
            if record.capture_time.is_none() {
                warn!("Unparseable DateTimeOriginal '{}' in {}", raw, path.display());
            }
        }

        record.serial = entry
            .serial_number
            .as_ref()
            .and_then(scalar_to_string)
            .and_then(|s| normalize_serial(&s));

        debug!(
            "Extracted serial number {:?} from {}",
            record.serial,
            path.display()
        );

        record
    }
}

fn parse_output(stdout: &[u8]) -> Result<ExifToolEntry, String> {
    let mut entries: Vec<ExifToolEntry> =
        serde_json::from_slice(stdout).map_err(|e| e.to_string())?;
    if entries.is_empty() {
        return Err("empty result array".to_string());
    }
    Ok(entries.swap_remove(0))
}

/// exiftool emits numeric-looking serials as JSON numbers
fn scalar_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}
