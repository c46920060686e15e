//! # Error Module
//!
//! Error types for the capture-time adjuster.
//!
//! ## Design Principles
//! - **Never panic** on user data - return errors instead
//! - **Include context** - paths, line numbers, what went wrong
//! - **Per-file failures are not fatal** - only startup errors abort a run

use std::path::PathBuf;
use thiserror::Error;

/// Top-level application error
#[derive(Error, Debug)]
pub enum AdjustError {
    #[error("Scanning error: {0}")]
    Scan(#[from] ScanError),

    #[error("Offset file error: {0}")]
    Offsets(#[from] OffsetError),

    #[error("Ledger error: {0}")]
    Ledger(#[from] LedgerError),

    #[error("Timestamp write error: {0}")]
    Write(#[from] WriteError),

    #[error("Configuration error: {0}")]
    Config(String),
}

/// Errors that occur while walking the photo tree
#[derive(Error, Debug)]
pub enum ScanError {
    #[error("Directory not found: {path}")]
    DirectoryNotFound { path: PathBuf },

    #[error("Permission denied accessing: {path}")]
    PermissionDenied { path: PathBuf },

    #[error("Failed to read directory {path}: {reason}")]
    ReadDirectory { path: PathBuf, reason: String },
}

/// Errors that occur while extracting metadata from a single file.
///
/// These never escape a reader; they are logged and the file is treated
/// as having no metadata.
#[derive(Error, Debug)]
pub enum MetadataError {
    #[error("Failed to open {path}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("No readable EXIF data in {path}: {reason}")]
    Exif { path: PathBuf, reason: String },

    #[error("exiftool failed on {path}: {reason}")]
    Tool { path: PathBuf, reason: String },

    #[error("Unexpected exiftool output for {path}: {reason}")]
    Output { path: PathBuf, reason: String },
}

/// Errors raised while resolving the offset file
#[derive(Error, Debug)]
pub enum OffsetError {
    #[error("Failed to read offset file {path}: {reason}")]
    Read { path: PathBuf, reason: String },

    #[error("Line {line}: invalid offset '{value}' for serial {serial} (expected whole seconds)")]
    InvalidOffset {
        line: u64,
        serial: String,
        value: String,
    },

    #[error("Line {line}: invalid time '{value}' for serial {serial} (expected YYYY:MM:DD HH:MM:SS)")]
    InvalidTimestamp {
        line: u64,
        serial: String,
        value: String,
    },

    #[error("Line {line}: reference image {path} has no capture time")]
    MissingReferenceTime { line: u64, path: PathBuf },

    #[error("Line {line}: expected 2 or 3 fields, found {found}")]
    FieldCount { line: u64, found: usize },

    #[error("Line {line}: empty serial number")]
    EmptySerial { line: u64 },

    #[error("Line {line}: unreadable row: {reason}")]
    Malformed { line: u64, reason: String },
}

/// Errors that occur with the change ledger
#[derive(Error, Debug)]
pub enum LedgerError {
    #[error("Failed to open ledger database at {path}: {reason}")]
    OpenFailed { path: PathBuf, reason: String },

    #[error("Ledger query failed: {0}")]
    QueryFailed(String),

    #[error("Ledger lock poisoned at {path}. Re-run the tool to resume.")]
    Poisoned { path: PathBuf },
}

/// Errors that occur while writing a corrected timestamp
#[derive(Error, Debug)]
pub enum WriteError {
    #[error("Failed to launch {program} for {path}: {source}")]
    Spawn {
        program: String,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{program} exited with {status} for {path}: {stderr}")]
    ToolFailed {
        program: String,
        path: PathBuf,
        status: String,
        stderr: String,
    },

    #[error("Corrected time for {path} is out of range")]
    OutOfRange { path: PathBuf },
}

/// Convenience Result type alias
pub type Result<T> = std::result::Result<T, AdjustError>;
