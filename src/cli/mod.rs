//! # CLI Module
//!
//! Command-line interface for the capture-time adjuster.
//!
//! ## Usage
//! ```bash
//! # Prompt for the folder and offset file
//! adjust-capture-times
//!
//! # Pass them directly
//! adjust-capture-times ~/Photos offsets.csv
//!
//! # ISO-style times and a skip row for every already corrected file
//! adjust-capture-times ~/Photos offsets.csv --time-style iso --record-skips
//!
//! # JSON summary
//! adjust-capture-times ~/Photos offsets.csv --output json
//! ```

use capture_time_adjuster::core::exiftool::ExifTool;
use capture_time_adjuster::core::ledger::{SqliteLedger, DEFAULT_LEDGER_FILE};
use capture_time_adjuster::core::metadata::{ExifToolReader, FormatDispatchReader};
use capture_time_adjuster::core::offsets::OffsetResolver;
use capture_time_adjuster::core::pipeline::{Pipeline, RunSummary};
use capture_time_adjuster::core::timestamp::TimeStyle;
use capture_time_adjuster::core::writer::ExifToolWriter;
use capture_time_adjuster::error::{AdjustError, Result};
use capture_time_adjuster::init_tracing;
use clap::{Parser, ValueEnum};
use console::{style, Term};
use indicatif::{ProgressBar, ProgressStyle};
use std::io::{self, BufRead};
use std::path::PathBuf;
use std::time::Duration;

/// Capture-Time Adjuster - fix camera clocks after the shoot
#[derive(Parser, Debug)]
#[command(name = "adjust-capture-times")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Folder to process (prompted for when omitted)
    root: Option<PathBuf>,

    /// Offset CSV/TXT file (prompted for when omitted)
    offsets: Option<PathBuf>,

    /// Ledger database path
    #[arg(long, default_value = DEFAULT_LEDGER_FILE)]
    ledger: PathBuf,

    /// Folder for log files
    #[arg(long, default_value = "_logs")]
    log_dir: PathBuf,

    /// exiftool executable
    #[arg(long, default_value = "exiftool")]
    exiftool: PathBuf,

    /// Format of the corrected times
    #[arg(long, default_value = "exif")]
    time_style: Style,

    /// Add a `skipped` ledger row each time an already corrected file is seen
    #[arg(long)]
    record_skips: bool,

    /// Output format
    #[arg(short, long, default_value = "pretty")]
    output: OutputFormat,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Style {
    /// YYYY:MM:DD HH:MM:SS (default)
    Exif,
    /// YYYY-MM-DD HH:MM:SS
    Iso,
}

impl From<Style> for TimeStyle {
    fn from(style: Style) -> Self {
        match style {
            Style::Exif => TimeStyle::Exif,
            Style::Iso => TimeStyle::Iso,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum OutputFormat {
    /// Human-readable output with colors
    Pretty,
    /// JSON output for scripting
    Json,
}

/// Run the CLI
pub fn run() -> Result<()> {
    let cli = Cli::parse();
    let term = Term::stderr();

    let mut input = io::stdin().lock();
    let root = match cli.root {
        Some(path) => expand_home(&path.to_string_lossy()),
        None => prompt_path(&term, &mut input, "Enter the folder path to process:")?,
    };
    let offsets_path = match cli.offsets {
        Some(path) => expand_home(&path.to_string_lossy()),
        None => prompt_path(&term, &mut input, "Enter the path to the offset CSV/TXT file:")?,
    };
    drop(input);

    let log_path = init_tracing(&cli.log_dir)?;
    let pretty = matches!(cli.output, OutputFormat::Pretty);

    if pretty {
        term.write_line(&format!(
            "{} {}",
            style("Capture-Time Adjuster").bold().cyan(),
            style(concat!("v", env!("CARGO_PKG_VERSION"))).dim()
        ))
        .ok();
        term.write_line(&format!(
            "  {} {}",
            style("Log:").dim(),
            log_path.display()
        ))
        .ok();
        term.write_line("").ok();
    }

    let tool = ExifTool::new(cli.exiftool);

    let resolved = OffsetResolver::new(FormatDispatchReader::new(ExifToolReader::new(
        tool.clone(),
    )))
    .resolve(&offsets_path)?;

    if pretty {
        term.write_line(&format!(
            "  Offsets loaded for {} camera(s)",
            style(resolved.table.len()).cyan()
        ))
        .ok();
        for rejected in &resolved.rejected {
            term.write_line(&format!("  {} {}", style("!").yellow().bold(), rejected))
                .ok();
        }
        term.write_line("").ok();
    }

    let ledger = SqliteLedger::open(&cli.ledger)?;

    let pipeline = Pipeline::builder()
        .root(root)
        .offsets(resolved.table)
        .reader(Box::new(FormatDispatchReader::new(ExifToolReader::new(
            tool.clone(),
        ))))
        .writer(Box::new(ExifToolWriter::new(tool)))
        .ledger(Box::new(ledger))
        .time_style(cli.time_style.into())
        .record_skips(cli.record_skips)
        .build();

    let progress = if pretty {
        let pb = ProgressBar::new(0);
        let bar_style = ProgressStyle::default_bar()
            .template("{spinner:.green} [{bar:40.cyan/blue}] {msg}")
            .map_err(|e| AdjustError::Config(format!("bad progress template: {}", e)))?
            .progress_chars("█▓░");
        pb.set_style(bar_style);
        pb.enable_steady_tick(Duration::from_millis(120));
        Some(pb)
    } else {
        None
    };

    let summary = pipeline.run_with_progress(|snapshot| {
        if let Some(ref pb) = progress {
            pb.set_length(snapshot.total as u64);
            pb.set_position(snapshot.processed as u64);
            pb.set_message(snapshot.to_string());
        }
    })?;

    if let Some(pb) = progress {
        pb.finish();
    }
    // Progress output does not end its line
    eprintln!();

    match cli.output {
        OutputFormat::Pretty => print_pretty_summary(&term, &summary),
        OutputFormat::Json => print_json_summary(&summary)?,
    }

    Ok(())
}

/// Show `prompt` on the terminal and read the answer from `input`.
///
/// Answers always come from `input` (stdin in practice), so piped answers
/// work even when stderr is not a terminal.
fn prompt_path<R: BufRead>(term: &Term, input: &mut R, prompt: &str) -> Result<PathBuf> {
    term.write_line(prompt).ok();

    let mut line = String::new();
    let read = input
        .read_line(&mut line)
        .map_err(|e| AdjustError::Config(format!("could not read input: {}", e)))?;
    if read == 0 {
        return Err(AdjustError::Config(format!(
            "no answer given for \"{}\"",
            prompt
        )));
    }

    Ok(expand_home(line.trim()))
}

/// Replace a leading `~` with the home directory
fn expand_home(raw: &str) -> PathBuf {
    let home = dirs::home_dir();
    match (raw.strip_prefix('~'), home) {
        (Some(""), Some(home)) => home,
        (Some(rest), Some(home)) if rest.starts_with('/') || rest.starts_with('\\') => {
            home.join(&rest[1..])
        }
        _ => PathBuf::from(raw),
    }
}

fn print_pretty_summary(term: &Term, summary: &RunSummary) {
    term.write_line(&format!("{} Run Complete", style("✓").green().bold()))
        .ok();
    term.write_line("").ok();

    term.write_line(&format!(
        "  {} photos processed in {:.1}s",
        style(summary.processed).cyan(),
        summary.duration_ms as f64 / 1000.0
    ))
    .ok();
    term.write_line(&format!(
        "  {} capture times corrected",
        style(summary.changed).green()
    ))
    .ok();

    if summary.already_changed > 0 {
        term.write_line(&format!(
            "  {} already corrected in an earlier run",
            style(summary.already_changed).dim()
        ))
        .ok();
    }

    let not_corrected = [
        (summary.no_serial, "without a serial number"),
        (summary.no_offset, "from cameras without an offset"),
        (summary.no_capture_time, "without a capture time"),
        (summary.write_failed, "could not be written"),
        (summary.ledger_failed, "hit a ledger error"),
    ];
    for (count, reason) in not_corrected {
        if count > 0 {
            term.write_line(&format!("  {} {}", style(count).yellow(), reason))
                .ok();
        }
    }

    if summary.ignored_dirs > 0 {
        term.write_line(&format!(
            "  {} `_ignore` folder(s) skipped",
            style(summary.ignored_dirs).dim()
        ))
        .ok();
    }
    if summary.walk_errors > 0 {
        term.write_line(&format!(
            "  {} folder entries could not be read",
            style(summary.walk_errors).red()
        ))
        .ok();
    }

    term.write_line("").ok();
    term.write_line(&format!(
        "{}",
        style("See the log file for a per-photo record.").dim()
    ))
    .ok();
}

fn print_json_summary(summary: &RunSummary) -> Result<()> {
    let json = serde_json::to_string_pretty(summary)
        .map_err(|e| AdjustError::Config(format!("could not serialize summary: {}", e)))?;
    println!("{}", json);
    Ok(())
}
