//! In-process EXIF reader backed by kamadak-exif.

use super::{normalize_serial, MetadataReader, MetadataRecord};
use crate::core::timestamp::parse_capture_time;
use crate::error::MetadataError;
use exif::{Exif, In, Reader, Tag, Value};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use tracing::{debug, error, warn};

/// Reads JPEG/TIFF metadata without spawning a process
#[derive(Debug, Clone, Copy, Default)]
pub struct ExifReader;

impl ExifReader {
    fn load(path: &Path) -> Result<Exif, MetadataError> {
        let file = File::open(path).map_err(|source| MetadataError::Open {
            path: path.to_path_buf(),
            source,
        })?;

        let mut bufreader = BufReader::new(&file);
        Reader::new()
            .read_from_container(&mut bufreader)
            .map_err(|e| MetadataError::Exif {
                path: path.to_path_buf(),
                reason: e.to_string(),
            })
    }
}

impl MetadataReader for ExifReader {
    fn read(&self, path: &Path) -> MetadataRecord {
        let mut record = MetadataRecord::default();

        let exif = match Self::load(path) {
            Ok(exif) => exif,
            Err(e) => {
                error!("Error extracting EXIF data: {}", e);
                return record;
            }
        };

        if let Some(field) = exif.get_field(Tag::DateTimeOriginal, In::PRIMARY) {
            match first_ascii(&field.value) {
                Some(raw) => {
                    record.capture_time = parse_capture_time(&raw);
                    if record.capture_time.is_none() {
                        warn!("Unparseable DateTimeOriginal '{}' in {}", raw, path.display());
                    }
                }
                None => warn!("DateTimeOriginal in {} is not text", path.display()),
            }
        }

        // Tag 0xA431 (42033); some bodies store it as a number
        if let Some(field) = exif.get_field(Tag::BodySerialNumber, In::PRIMARY) {
            record.serial = value_to_string(&field.value).and_then(|s| normalize_serial(&s));
        }

        debug!(
            "Extracted serial number {:?} from {}",
            record.serial,
            path.display()
        );

        record
    }
}

fn first_ascii(value: &Value) -> Option<String> {
    if let Value::Ascii(ref vec) = value {
        if let Some(bytes) = vec.first() {
            return Some(String::from_utf8_lossy(bytes).into_owned());
        }
    }
    None
}

/// Coerce any scalar EXIF value to a string
fn value_to_string(value: &Value) -> Option<String> {
    match value {
        Value::Ascii(_) => first_ascii(value),
        Value::Byte(vec) => vec.first().map(|v| v.to_string()),
        Value::Short(vec) => vec.first().map(|v| v.to_string()),
        Value::Long(vec) => vec.first().map(|v| v.to_string()),
        Value::SByte(vec) => vec.first().map(|v| v.to_string()),
        Value::SShort(vec) => vec.first().map(|v| v.to_string()),
        Value::SLong(vec) => vec.first().map(|v| v.to_string()),
        Value::Undefined(bytes, _) => Some(String::from_utf8_lossy(bytes).into_owned()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use exif::experimental::Writer;
    use exif::Field;
    use std::io::{Cursor, Write};
    use tempfile::TempDir;

    /// Write a minimal TIFF carrying the given EXIF fields
    fn write_tiff(dir: &Path, name: &str, fields: &[Field]) -> std::path::PathBuf {
        let mut writer = Writer::new();
        for field in fields {
            writer.push_field(field);
        }
        let mut buf = Cursor::new(Vec::new());
        writer.write(&mut buf, false).unwrap();

        let path = dir.join(name);
        std::fs::write(&path, buf.into_inner()).unwrap();
        path
    }

    fn field(tag: Tag, value: Value) -> Field {
        Field {
            tag,
            ifd_num: In::PRIMARY,
            value,
        }
    }

    #[test]
    fn ascii_serial_is_kept_as_text() {
        let value = Value::Ascii(vec![b"3001234 ".to_vec()]);
        assert_eq!(value_to_string(&value), Some("3001234 ".to_string()));
    }

    #[test]
    fn numeric_serial_is_coerced() {
        assert_eq!(value_to_string(&Value::Long(vec![3001234])), Some("3001234".to_string()));
        assert_eq!(value_to_string(&Value::Short(vec![42])), Some("42".to_string()));
    }

    #[test]
    fn rational_values_are_not_serials() {
        let value = Value::Rational(vec![exif::Rational { num: 1, denom: 2 }]);
        assert_eq!(value_to_string(&value), None);
    }

    #[test]
    fn nonexistent_file_gives_empty_record() {
        let record = ExifReader.read(Path::new("/nonexistent/file.jpg"));
        assert!(!record.has_data());
    }

    #[test]
    fn file_without_exif_gives_empty_record() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("plain.jpg");
        let mut file = File::create(&path).unwrap();
        // SOI, APP0 (JFIF), EOI - no APP1/EXIF segment
        file.write_all(&[
            0xFF, 0xD8, 0xFF, 0xE0, 0x00, 0x10, 0x4A, 0x46, 0x49, 0x46, 0x00, 0x01, 0x01, 0x00,
            0x00, 0x01, 0x00, 0x01, 0x00, 0x00, 0xFF, 0xD9,
        ])
        .unwrap();
        drop(file);

        assert!(!ExifReader.read(&path).has_data());
    }

    #[test]
    fn reads_capture_time_and_text_serial_from_tiff() {
        let temp_dir = TempDir::new().unwrap();
        let path = write_tiff(
            temp_dir.path(),
            "shot.tiff",
            &[
                field(
                    Tag::DateTimeOriginal,
                    Value::Ascii(vec![b"2024:01:01 10:00:00".to_vec()]),
                ),
                field(Tag::BodySerialNumber, Value::Ascii(vec![b" 3001234 ".to_vec()])),
            ],
        );

        let record = ExifReader.read(&path);
        assert_eq!(record.serial.as_deref(), Some("3001234"));
        assert_eq!(record.capture_time, parse_capture_time("2024:01:01 10:00:00"));
        assert!(record.capture_time.is_some());
    }

    #[test]
    fn reads_numeric_serial_from_tiff() {
        let temp_dir = TempDir::new().unwrap();
        let path = write_tiff(
            temp_dir.path(),
            "numeric.tiff",
            &[
                field(
                    Tag::DateTimeOriginal,
                    Value::Ascii(vec![b"2024:05:18 14:02:10".to_vec()]),
                ),
                field(Tag::BodySerialNumber, Value::Long(vec![6005678])),
            ],
        );

        let record = ExifReader.read(&path);
        assert_eq!(record.serial.as_deref(), Some("6005678"));
        assert_eq!(record.capture_time, parse_capture_time("2024:05:18 14:02:10"));
    }
}
