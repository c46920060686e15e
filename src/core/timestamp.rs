//! Capture-time parsing, formatting and offset arithmetic.
//!
//! Camera clocks record local wall-clock time with no zone, so every value
//! here is a `NaiveDateTime`.

use chrono::{NaiveDateTime, TimeDelta};
use serde::{Deserialize, Serialize};
use std::fmt;

/// EXIF date format: "YYYY:MM:DD HH:MM:SS"
pub const CAPTURE_TIME_FORMAT: &str = "%Y:%m:%d %H:%M:%S";

/// ISO-like variant accepted by exiftool: "YYYY-MM-DD HH:MM:SS"
pub const ISO_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Parse an EXIF capture time.
///
/// Trailing NULs and whitespace (common in EXIF ASCII fields) are ignored.
/// Returns `None` for anything that does not match the fixed pattern.
pub fn parse_capture_time(raw: &str) -> Option<NaiveDateTime> {
    let trimmed = raw.trim_end_matches('\0').trim();
    NaiveDateTime::parse_from_str(trimmed, CAPTURE_TIME_FORMAT).ok()
}

/// How corrected times are rendered for the writer and the ledger
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimeStyle {
    /// `2024:01:01 11:00:00`
    #[default]
    Exif,
    /// `2024-01-01 11:00:00`
    Iso,
}

impl TimeStyle {
    pub fn format(&self, time: &NaiveDateTime) -> String {
        match self {
            TimeStyle::Exif => time.format(CAPTURE_TIME_FORMAT).to_string(),
            TimeStyle::Iso => time.format(ISO_TIME_FORMAT).to_string(),
        }
    }
}

/// Signed correction applied to a camera's capture times
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct TimeOffset(TimeDelta);

impl TimeOffset {
    /// Offset of a whole number of seconds. `None` if out of range.
    pub fn from_seconds(seconds: i64) -> Option<Self> {
        TimeDelta::try_seconds(seconds).map(Self)
    }

    /// Offset that moves `recorded` onto `actual`.
    pub fn between(recorded: NaiveDateTime, actual: NaiveDateTime) -> Self {
        Self(actual.signed_duration_since(recorded))
    }

    /// Apply the offset. `None` on calendar overflow.
    pub fn apply(&self, time: NaiveDateTime) -> Option<NaiveDateTime> {
        time.checked_add_signed(self.0)
    }

    pub fn as_seconds_f64(&self) -> f64 {
        self.0.num_seconds() as f64 + f64::from(self.0.subsec_nanos()) / 1_000_000_000.0
    }

    pub fn delta(&self) -> TimeDelta {
        self.0
    }
}

impl fmt::Display for TimeOffset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.subsec_nanos() == 0 {
            write!(f, "{} seconds", self.0.num_seconds())
        } else {
            write!(f, "{:.3} seconds", self.as_seconds_f64())
        }
    }
}
