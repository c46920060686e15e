//! # Capture-Time Adjuster
//!
//! Corrects photo capture times camera by camera when camera clocks were
//! not synchronised.
//!
//! ## Core Philosophy
//! - **Never correct twice** - every change is recorded in a ledger and
//!   files already in it are left alone
//! - **Never stop on one bad file** - problems are logged and the run goes on
//! - **Metadata only** - pixel data is never touched
//!
//! ## Architecture
//! - `core` - The correction engine
//! - `error` - Error types

pub mod core;
pub mod error;

// Re-export commonly used types at the crate root
pub use error::{AdjustError, Result};

use chrono::Local;
use std::fs::{self, File};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing_subscriber::EnvFilter;

/// Prefix of the per-run log file name
pub const LOG_FILE_PREFIX: &str = "adjust_capture_times";

/// Initialize tracing for the library
///
/// Creates `log_dir` if needed and sends every event to a new
/// `adjust_capture_times_<YYYYMMDD_HHMMSS>.log` file inside it. The level
/// defaults to `info` and can be changed with `RUST_LOG`. Returns the path
/// of the log file.
pub fn init_tracing(log_dir: &Path) -> Result<PathBuf> {
    fs::create_dir_all(log_dir).map_err(|e| {
        AdjustError::Config(format!(
            "cannot create log directory {}: {}",
            log_dir.display(),
            e
        ))
    })?;

    let log_path = log_dir.join(log_file_name(Local::now().naive_local()));
    let file = File::create(&log_path).map_err(|e| {
        AdjustError::Config(format!("cannot create log file {}: {}", log_path.display(), e))
    })?;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_ansi(false)
        .with_writer(Mutex::new(file))
        .try_init()
        .map_err(|e| AdjustError::Config(format!("tracing already initialised: {}", e)))?;

    Ok(log_path)
}

fn log_file_name(now: chrono::NaiveDateTime) -> String {
    format!("{}_{}.log", LOG_FILE_PREFIX, now.format("%Y%m%d_%H%M%S"))
}
