//! Integration tests for the pipeline module.
//!
//! These tests run full passes over a real directory tree with a scripted
//! metadata reader and a recording writer in place of exiftool:
//! - Offsets applied per camera
//! - Reruns leave corrected files alone
//! - `_ignore` folders and unmapped cameras are untouched, with one warning
//!   per unmapped photo
//! - The SQLite ledger carries state across runs

use assert_fs::prelude::*;
use assert_fs::TempDir;
use capture_time_adjuster::core::ledger::{ChangeLedger, ChangeStatus, InMemoryLedger, SqliteLedger};
use capture_time_adjuster::core::metadata::{MetadataReader, MetadataRecord};
use capture_time_adjuster::core::offsets::{OffsetResolver, OffsetTable};
use capture_time_adjuster::core::pipeline::{FileOutcome, Pipeline};
use capture_time_adjuster::core::timestamp::{parse_capture_time, TimeOffset, TimeStyle};
use capture_time_adjuster::core::writer::TimestampWriter;
use capture_time_adjuster::error::WriteError;
use predicates::prelude::*;
use std::cell::RefCell;
use std::collections::HashMap;
use std::io;
use std::path::{Path, PathBuf};
use std::rc::Rc;
use std::sync::{Arc, Mutex};
use tracing_subscriber::fmt::MakeWriter;

/// Serves metadata by file name and remembers which files were read
#[derive(Clone, Default)]
struct ScriptedReader {
    records: Rc<HashMap<String, MetadataRecord>>,
    reads: Rc<RefCell<Vec<PathBuf>>>,
}

impl ScriptedReader {
    fn new(records: &[(&str, Option<&str>, Option<&str>)]) -> Self {
        let records = records
            .iter()
            .map(|(name, time, serial)| {
                (
                    name.to_string(),
                    MetadataRecord {
                        capture_time: time.and_then(parse_capture_time),
                        serial: serial.map(str::to_string),
                    },
                )
            })
            .collect();
        Self {
            records: Rc::new(records),
            reads: Rc::default(),
        }
    }

    fn read_names(&self) -> Vec<String> {
        self.reads.borrow().iter().map(|p| file_name(p)).collect()
    }
}

impl MetadataReader for ScriptedReader {
    fn read(&self, path: &Path) -> MetadataRecord {
        self.reads.borrow_mut().push(path.to_path_buf());
        self.records.get(&file_name(path)).cloned().unwrap_or_default()
    }
}

/// Records every write instead of touching the file
#[derive(Clone, Default)]
struct RecordingWriter {
    writes: Rc<RefCell<Vec<(PathBuf, String)>>>,
}

impl RecordingWriter {
    fn written(&self) -> HashMap<String, String> {
        self.writes
            .borrow()
            .iter()
            .map(|(path, time)| (file_name(path), time.clone()))
            .collect()
    }

    fn count(&self) -> usize {
        self.writes.borrow().len()
    }
}

impl TimestampWriter for RecordingWriter {
    fn write(&self, path: &Path, new_time: &str) -> Result<(), WriteError> {
        self.writes
            .borrow_mut()
            .push((path.to_path_buf(), new_time.to_string()));
        Ok(())
    }
}

/// Collects formatted log output in memory
#[derive(Clone, Default)]
struct LogBuffer(Arc<Mutex<Vec<u8>>>);

impl LogBuffer {
    fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
    }
}

impl io::Write for LogBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl<'a> MakeWriter<'a> for LogBuffer {
    type Writer = LogBuffer;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}

fn file_name(path: &Path) -> String {
    path.file_name().unwrap().to_string_lossy().into_owned()
}

/// Create an empty file, with its parent folders
fn touch(temp: &TempDir, relative: &str) {
    let child = temp.child(relative);
    std::fs::create_dir_all(child.path().parent().unwrap()).unwrap();
    child.touch().unwrap();
}

fn secs(n: i64) -> TimeOffset {
    TimeOffset::from_seconds(n).unwrap()
}

/// Two cameras, one photo each, plus an unknown camera and an ignored folder
fn shoot() -> TempDir {
    let temp = TempDir::new().unwrap();
    touch(&temp, "ceremony/DSC_0001.JPG");
    touch(&temp, "ceremony/IMG_0002.jpeg");
    touch(&temp, "reception/DSC_0003.NEF");
    touch(&temp, "reception/guest.tiff");
    touch(&temp, "reception/_ignore/DSC_0004.jpg");
    touch(&temp, "notes.txt");
    temp
}

fn shoot_reader() -> ScriptedReader {
    ScriptedReader::new(&[
        ("DSC_0001.JPG", Some("2024:01:01 10:00:00"), Some("3001234")),
        ("IMG_0002.jpeg", Some("2024:01:01 10:30:00"), Some("6005678")),
        ("DSC_0003.NEF", Some("2024:01:01 18:00:00"), Some("3001234")),
        ("guest.tiff", Some("2024:01:01 19:00:00"), Some("9999999")),
        ("DSC_0004.jpg", Some("2024:01:01 20:00:00"), Some("3001234")),
    ])
}

fn shoot_offsets() -> OffsetTable {
    [("3001234", secs(3600)), ("6005678", secs(-90))]
        .into_iter()
        .collect()
}

#[test]
fn offsets_are_applied_per_camera() {
    let temp = shoot();
    let reader = shoot_reader();
    let writer = RecordingWriter::default();

    let pipeline = Pipeline::builder()
        .root(temp.path())
        .offsets(shoot_offsets())
        .reader(Box::new(reader))
        .writer(Box::new(writer.clone()))
        .build();

    let summary = pipeline.run().unwrap();

    assert_eq!(summary.total_files, 4);
    assert_eq!(summary.processed, 4);
    assert_eq!(summary.changed, 3);
    assert_eq!(summary.no_offset, 1);
    assert_eq!(summary.ignored_dirs, 1);

    let written = writer.written();
    assert_eq!(written.len(), 3);
    assert_eq!(written["DSC_0001.JPG"], "2024:01:01 11:00:00");
    assert_eq!(written["IMG_0002.jpeg"], "2024:01:01 10:28:30");
    assert_eq!(written["DSC_0003.NEF"], "2024:01:01 19:00:00");
}

#[test]
fn iso_style_is_used_for_writes_and_ledger() {
    let temp = shoot();
    let writer = RecordingWriter::default();

    let pipeline = Pipeline::builder()
        .root(temp.path())
        .offsets(shoot_offsets())
        .reader(Box::new(shoot_reader()))
        .writer(Box::new(writer.clone()))
        .time_style(TimeStyle::Iso)
        .build();

    pipeline.run().unwrap();

    assert_eq!(writer.written()["DSC_0001.JPG"], "2024-01-01 11:00:00");

    let path = temp
        .child("ceremony/DSC_0001.JPG")
        .path()
        .canonicalize()
        .unwrap();
    let entries = pipeline.ledger().entries_for(&path).unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].original_time, "2024:01:01 10:00:00");
    assert_eq!(entries[0].changed_time, "2024-01-01 11:00:00");
}

#[test]
fn second_run_writes_nothing() {
    let temp = shoot();
    let writer = RecordingWriter::default();

    let pipeline = Pipeline::builder()
        .root(temp.path())
        .offsets(shoot_offsets())
        .reader(Box::new(shoot_reader()))
        .writer(Box::new(writer.clone()))
        .build();

    let first = pipeline.run().unwrap();
    let changed_after_first = pipeline.ledger().changed_paths().unwrap();
    let rows_after_first = pipeline.ledger().row_count().unwrap();

    let second = pipeline.run().unwrap();

    assert_eq!(first.changed, 3);
    assert_eq!(second.changed, 0);
    assert_eq!(second.already_changed, 3);
    assert_eq!(second.no_offset, 1);
    assert_eq!(writer.count(), 3);
    assert_eq!(pipeline.ledger().changed_paths().unwrap(), changed_after_first);
    assert!(pipeline.ledger().row_count().unwrap() >= rows_after_first);
}

#[test]
fn already_changed_files_are_not_read() {
    let temp = shoot();
    let reader = shoot_reader();

    let pipeline = Pipeline::builder()
        .root(temp.path())
        .offsets(shoot_offsets())
        .reader(Box::new(reader.clone()))
        .writer(Box::new(RecordingWriter::default()))
        .build();

    pipeline.run().unwrap();
    reader.reads.borrow_mut().clear();
    pipeline.run().unwrap();

    // Only the unmapped camera's photo is read again
    assert_eq!(reader.read_names(), vec!["guest.tiff".to_string()]);
}

#[test]
fn record_skips_appends_skip_rows_with_last_times() {
    let temp = shoot();

    let pipeline = Pipeline::builder()
        .root(temp.path())
        .offsets(shoot_offsets())
        .reader(Box::new(shoot_reader()))
        .writer(Box::new(RecordingWriter::default()))
        .record_skips(true)
        .build();

    pipeline.run().unwrap();
    assert_eq!(pipeline.ledger().row_count().unwrap(), 3);

    pipeline.run().unwrap();
    assert_eq!(pipeline.ledger().row_count().unwrap(), 6);

    let path = temp
        .child("reception/DSC_0003.NEF")
        .path()
        .canonicalize()
        .unwrap();
    let entries = pipeline.ledger().entries_for(&path).unwrap();
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0].status, ChangeStatus::Changed);
    assert_eq!(entries[1].status, ChangeStatus::Skipped);
    assert_eq!(entries[1].original_time, entries[0].original_time);
    assert_eq!(entries[1].changed_time, entries[0].changed_time);
}

#[test]
fn ignored_folders_are_never_read() {
    let temp = shoot();
    touch(&temp, "_ignore/deep/DSC_0005.jpg");
    let reader = shoot_reader();
    let writer = RecordingWriter::default();

    let pipeline = Pipeline::builder()
        .root(temp.path())
        .offsets(shoot_offsets())
        .reader(Box::new(reader.clone()))
        .writer(Box::new(writer.clone()))
        .build();

    let summary = pipeline.run().unwrap();

    assert_eq!(summary.ignored_dirs, 2);
    assert!(!reader.read_names().iter().any(|n| n == "DSC_0004.jpg" || n == "DSC_0005.jpg"));
    assert!(!writer.written().contains_key("DSC_0004.jpg"));
}

#[test]
fn unmapped_camera_is_left_untouched() {
    let temp = shoot();
    let writer = RecordingWriter::default();

    let pipeline = Pipeline::builder()
        .root(temp.path())
        .offsets(shoot_offsets())
        .reader(Box::new(shoot_reader()))
        .writer(Box::new(writer.clone()))
        .build();

    let logs = LogBuffer::default();
    let subscriber = tracing_subscriber::fmt()
        .with_writer(logs.clone())
        .with_ansi(false)
        .with_max_level(tracing::Level::INFO)
        .finish();

    let mut outcomes = HashMap::new();
    tracing::subscriber::with_default(subscriber, || {
        pipeline
            .run_with_progress(|p| {
                outcomes.insert(file_name(&p.path), p.outcome);
            })
            .unwrap();
    });

    assert_eq!(outcomes["guest.tiff"], FileOutcome::NoOffset);
    assert!(!writer.written().contains_key("guest.tiff"));

    let output = logs.contents();
    let guest_warnings: Vec<&str> = output
        .lines()
        .filter(|line| line.contains("WARN") && line.contains("guest.tiff"))
        .collect();
    assert_eq!(guest_warnings.len(), 1, "log was:\n{}", output);
    assert!(guest_warnings[0].contains("9999999"));

    let guest = temp.child("reception/guest.tiff").path().canonicalize().unwrap();
    assert!(pipeline.ledger().entries_for(&guest).unwrap().is_empty());
}

#[test]
fn progress_counts_up_to_total_in_order() {
    let temp = shoot();

    let pipeline = Pipeline::builder()
        .root(temp.path())
        .offsets(shoot_offsets())
        .reader(Box::new(shoot_reader()))
        .writer(Box::new(RecordingWriter::default()))
        .build();

    let mut seen = Vec::new();
    pipeline
        .run_with_progress(|p| seen.push((p.processed, p.total, file_name(&p.path))))
        .unwrap();

    let processed: Vec<usize> = seen.iter().map(|(n, _, _)| *n).collect();
    assert_eq!(processed, vec![1, 2, 3, 4]);
    assert!(seen.iter().all(|(_, total, _)| *total == 4));

    // Walk is sorted by file name
    let names: Vec<&str> = seen.iter().map(|(_, _, n)| n.as_str()).collect();
    assert_eq!(
        names,
        vec!["DSC_0001.JPG", "IMG_0002.jpeg", "DSC_0003.NEF", "guest.tiff"]
    );
}

#[test]
fn sqlite_ledger_persists_across_runs() {
    let temp = shoot();
    let state = TempDir::new().unwrap();
    let ledger_path = state.child("state/_file_updates.db");

    let first_writer = RecordingWriter::default();
    let first = Pipeline::builder()
        .root(temp.path())
        .offsets(shoot_offsets())
        .reader(Box::new(shoot_reader()))
        .writer(Box::new(first_writer.clone()))
        .ledger(Box::new(SqliteLedger::open(ledger_path.path()).unwrap()))
        .build();
    first.run().unwrap();
    drop(first);

    ledger_path.assert(predicate::path::is_file());
    assert_eq!(first_writer.count(), 3);

    let second_writer = RecordingWriter::default();
    let second = Pipeline::builder()
        .root(temp.path())
        .offsets(shoot_offsets())
        .reader(Box::new(shoot_reader()))
        .writer(Box::new(second_writer.clone()))
        .ledger(Box::new(SqliteLedger::open(ledger_path.path()).unwrap()))
        .build();
    let summary = second.run().unwrap();

    assert_eq!(summary.already_changed, 3);
    assert_eq!(second_writer.count(), 0);
    assert_eq!(second.ledger().changed_paths().unwrap().len(), 3);
}

#[test]
fn prior_ledger_rows_gate_a_fresh_pipeline() {
    let temp = shoot();
    let path = temp.child("ceremony/DSC_0001.JPG").path().canonicalize().unwrap();

    let ledger = InMemoryLedger::new();
    ledger
        .record(
            "DSC_0001.JPG",
            &path,
            "2024:01:01 10:00:00",
            "2024:01:01 11:00:00",
            ChangeStatus::Changed,
        )
        .unwrap();

    let writer = RecordingWriter::default();
    let pipeline = Pipeline::builder()
        .root(temp.path())
        .offsets(shoot_offsets())
        .reader(Box::new(shoot_reader()))
        .writer(Box::new(writer.clone()))
        .ledger(Box::new(ledger))
        .build();

    let summary = pipeline.run().unwrap();
    assert_eq!(summary.already_changed, 1);
    assert_eq!(summary.changed, 2);
    assert!(!writer.written().contains_key("DSC_0001.JPG"));
}

#[test]
fn derived_offsets_drive_the_run() {
    let temp = shoot();
    let offsets_dir = TempDir::new().unwrap();
    touch(&offsets_dir, "refs/clock.jpg");
    let offsets_file = offsets_dir.child("offsets.csv");
    offsets_file
        .write_str("3001234,refs/clock.jpg,2024:01:01 09:05:30\n")
        .unwrap();
    offsets_file.assert(predicate::str::contains("3001234"));

    let reference_reader = ScriptedReader::new(&[(
        "clock.jpg",
        Some("2024:01:01 09:00:00"),
        Some("3001234"),
    )]);
    let resolved = OffsetResolver::new(reference_reader)
        .resolve(offsets_file.path())
        .unwrap();

    assert!(resolved.rejected.is_empty());
    assert_eq!(resolved.table.get("3001234"), Some(secs(330)));

    let writer = RecordingWriter::default();
    let pipeline = Pipeline::builder()
        .root(temp.path())
        .offsets(resolved.table)
        .reader(Box::new(shoot_reader()))
        .writer(Box::new(writer.clone()))
        .build();
    let summary = pipeline.run().unwrap();

    assert_eq!(summary.changed, 2);
    assert_eq!(summary.no_offset, 2);
    assert_eq!(writer.written()["DSC_0001.JPG"], "2024:01:01 10:05:30");
}

#[test]
fn missing_root_is_a_startup_error() {
    let temp = TempDir::new().unwrap();
    let pipeline = Pipeline::builder()
        .root(temp.path().join("does-not-exist"))
        .build();

    assert!(pipeline.run().is_err());
}
