//! # adjust-capture-times CLI
//!
//! Corrects photo capture times using per-camera clock offsets.
//!
//! ## Usage
//! ```bash
//! adjust-capture-times ~/Photos/wedding offsets.csv
//! adjust-capture-times ~/Photos/wedding offsets.csv --time-style iso --output json
//! ```

mod cli;

use capture_time_adjuster::Result;

fn main() -> Result<()> {
    cli::run()
}
