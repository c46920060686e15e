//! Thin wrapper around the external `exiftool` program.
//!
//! Shared by the RAW metadata reader and the timestamp writer so both
//! invoke the same binary.

use std::ffi::OsStr;
use std::io;
use std::path::PathBuf;
use std::process::{Command, Output};

pub const DEFAULT_PROGRAM: &str = "exiftool";

/// Location of the exiftool executable
#[derive(Debug, Clone)]
pub struct ExifTool {
    program: PathBuf,
}

impl ExifTool {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }

    pub fn program_name(&self) -> String {
        self.program.display().to_string()
    }

    /// Run exiftool to completion. Blocks without a timeout.
    pub fn run<I, S>(&self, args: I) -> io::Result<Output>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        Command::new(&self.program).args(args).output()
    }
}

impl Default for ExifTool {
    fn default() -> Self {
        Self::new(DEFAULT_PROGRAM)
    }
}

/// Last non-empty line of a tool's stderr, for log messages
pub fn stderr_summary(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr)
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .last()
        .unwrap_or("no error output")
        .to_string()
}
