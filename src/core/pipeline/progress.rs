//! Progress and remaining-time estimation.
//!
//! The estimate is linear: `elapsed / processed * total`.

use super::FileOutcome;
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

/// Progress after one photo
#[derive(Debug, Clone)]
pub struct ProgressSnapshot {
    pub elapsed: Duration,
    pub processed: usize,
    pub total: usize,
    pub remaining: Duration,
    /// Photo that was just handled
    pub path: PathBuf,
    pub outcome: FileOutcome,
}

impl fmt::Display for ProgressSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}] {}/{} files processed - Estimated time remaining: {}",
            format_duration(self.elapsed),
            self.processed,
            self.total,
            format_duration(self.remaining)
        )
    }
}

/// Counts processed photos against the pre-computed total
#[derive(Debug)]
pub struct ProgressTracker {
    started: Instant,
    processed: usize,
    total: usize,
}

impl ProgressTracker {
    /// Start the clock
    pub fn start(total: usize) -> Self {
        Self {
            started: Instant::now(),
            processed: 0,
            total,
        }
    }

    /// Record one finished photo and return the new snapshot
    pub fn advance(&mut self, path: &Path, outcome: FileOutcome) -> ProgressSnapshot {
        self.processed += 1;
        let elapsed = self.started.elapsed();

        ProgressSnapshot {
            elapsed,
            processed: self.processed,
            total: self.total,
            remaining: estimate_remaining(elapsed, self.processed, self.total),
            path: path.to_path_buf(),
            outcome,
        }
    }

    pub fn processed(&self) -> usize {
        self.processed
    }
}

/// Remaining time given `elapsed` for `processed` of `total` photos
pub fn estimate_remaining(elapsed: Duration, processed: usize, total: usize) -> Duration {
    if processed == 0 {
        return Duration::ZERO;
    }
    let estimated_total = elapsed.mul_f64(total as f64 / processed as f64);
    estimated_total.saturating_sub(elapsed)
}

/// `H:MM:SS`, whole seconds
pub fn format_duration(duration: Duration) -> String {
    let secs = duration.as_secs();
    format!("{}:{:02}:{:02}", secs / 3600, (secs / 60) % 60, secs % 60)
}
