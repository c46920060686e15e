//! Pipeline execution implementation.

use super::progress::{ProgressSnapshot, ProgressTracker};
use super::{FileOutcome, RunSummary};
use crate::core::ledger::{ChangeLedger, ChangeStatus, InMemoryLedger};
use crate::core::metadata::{FormatDispatchReader, MetadataReader};
use crate::core::offsets::OffsetTable;
use crate::core::scanner::{PhotoWalker, ScanConfig, WalkItem};
use crate::core::timestamp::{TimeStyle, CAPTURE_TIME_FORMAT};
use crate::core::writer::{ExifToolWriter, TimestampWriter};
use crate::error::{AdjustError, ScanError, WriteError};
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{error, info, warn};

/// Configuration for the pipeline
#[derive(Debug, Clone, Default)]
pub struct PipelineConfig {
    /// Root of the photo tree
    pub root: PathBuf,
    /// Format of the corrected time written to files and the ledger
    pub time_style: TimeStyle,
    /// Append a `skipped` row when an already corrected file is met again
    pub record_skips: bool,
    /// Scanner configuration
    pub scan_config: ScanConfig,
}

/// Builder for pipeline configuration
pub struct PipelineBuilder {
    config: PipelineConfig,
    offsets: OffsetTable,
    reader: Option<Box<dyn MetadataReader>>,
    writer: Option<Box<dyn TimestampWriter>>,
    ledger: Option<Box<dyn ChangeLedger>>,
}

impl PipelineBuilder {
    /// Create a new pipeline builder
    pub fn new() -> Self {
        Self {
            config: PipelineConfig::default(),
            offsets: OffsetTable::default(),
            reader: None,
            writer: None,
            ledger: None,
        }
    }

    /// Set the root directory to process
    pub fn root(mut self, root: impl Into<PathBuf>) -> Self {
        self.config.root = root.into();
        self
    }

    /// Set the per-camera offsets
    pub fn offsets(mut self, offsets: OffsetTable) -> Self {
        self.offsets = offsets;
        self
    }

    /// Set the metadata reader
    pub fn reader(mut self, reader: Box<dyn MetadataReader>) -> Self {
        self.reader = Some(reader);
        self
    }

    /// Set the timestamp writer
    pub fn writer(mut self, writer: Box<dyn TimestampWriter>) -> Self {
        self.writer = Some(writer);
        self
    }

    /// Set the ledger backend
    pub fn ledger(mut self, ledger: Box<dyn ChangeLedger>) -> Self {
        self.ledger = Some(ledger);
        self
    }

    /// Set the written time format
    pub fn time_style(mut self, style: TimeStyle) -> Self {
        self.config.time_style = style;
        self
    }

    /// Record `skipped` rows for already corrected files
    pub fn record_skips(mut self, record: bool) -> Self {
        self.config.record_skips = record;
        self
    }

    /// Set scanner configuration
    pub fn scan_config(mut self, config: ScanConfig) -> Self {
        self.config.scan_config = config;
        self
    }

    /// Build the pipeline
    pub fn build(self) -> Pipeline {
        Pipeline {
            config: self.config,
            offsets: self.offsets,
            reader: self
                .reader
                .unwrap_or_else(|| Box::new(FormatDispatchReader::default())),
            writer: self
                .writer
                .unwrap_or_else(|| Box::new(ExifToolWriter::default())),
            ledger: self.ledger.unwrap_or_else(|| Box::new(InMemoryLedger::new())),
        }
    }
}

impl Default for PipelineBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// The capture-time correction pipeline
pub struct Pipeline {
    config: PipelineConfig,
    offsets: OffsetTable,
    reader: Box<dyn MetadataReader>,
    writer: Box<dyn TimestampWriter>,
    ledger: Box<dyn ChangeLedger>,
}

impl Pipeline {
    /// Create a new pipeline builder
    pub fn builder() -> PipelineBuilder {
        PipelineBuilder::new()
    }

    /// The ledger this pipeline appends to
    pub fn ledger(&self) -> &dyn ChangeLedger {
        &*self.ledger
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Run the pipeline without progress reporting
    pub fn run(&self) -> Result<RunSummary, AdjustError> {
        self.run_with_progress(|_| {})
    }

    /// Run the pipeline, calling `on_progress` after every photo
    pub fn run_with_progress<F>(&self, mut on_progress: F) -> Result<RunSummary, AdjustError>
    where
        F: FnMut(&ProgressSnapshot),
    {
        let start_time = Instant::now();

        // Ledger keys are absolute so reruns from another directory still match
        let root = std::fs::canonicalize(&self.config.root).map_err(|_| {
            ScanError::DirectoryNotFound {
                path: self.config.root.clone(),
            }
        })?;

        let walker = PhotoWalker::new(self.config.scan_config.clone());
        let total_files = walker.count(&root)?;

        info!(
            "Starting processing for folder: {} ({} photos, offsets for {} camera(s))",
            root.display(),
            total_files,
            self.offsets.len()
        );

        let mut summary = RunSummary {
            total_files,
            ..Default::default()
        };
        let mut tracker = ProgressTracker::start(total_files);

        for item in walker.walk(&root)? {
            match item {
                WalkItem::Photo(path) => {
                    let outcome = self.process_file(&path);
                    summary.tally(outcome);
                    on_progress(&tracker.advance(&path, outcome));
                }
                WalkItem::IgnoredDir(path) => {
                    info!("Skipping folder: {} (in _ignore folder)", path.display());
                    summary.ignored_dirs += 1;
                }
                WalkItem::Error(e) => {
                    warn!("{}", e);
                    summary.walk_errors += 1;
                }
            }
        }

        summary.duration_ms = start_time.elapsed().as_millis() as u64;

        info!(
            "Processing completed: {} changed, {} already changed, {} not corrected",
            summary.changed,
            summary.already_changed,
            summary.failures()
        );

        Ok(summary)
    }

    /// Handle one photo. Never fails; every problem becomes an outcome.
    fn process_file(&self, path: &Path) -> FileOutcome {
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();

        match self.ledger.already_changed(path) {
            Ok(true) => {
                info!("Skipping file: {} (already changed)", path.display());
                if self.config.record_skips {
                    self.record_skip(&file_name, path);
                }
                return FileOutcome::AlreadyChanged;
            }
            Ok(false) => {}
            Err(e) => {
                // Without the ledger we cannot tell whether the file was corrected
                error!("Ledger lookup failed for {}: {}", path.display(), e);
                return FileOutcome::LedgerFailed;
            }
        }

        let record = self.reader.read(path);

        let Some(serial) = record.serial else {
            warn!("No serial number found in EXIF for {}", path.display());
            return FileOutcome::NoSerial;
        };

        let Some(offset) = self.offsets.get(&serial) else {
            warn!(
                "No offset provided for serial number {} in {}",
                serial,
                path.display()
            );
            return FileOutcome::NoOffset;
        };

        let Some(original) = record.capture_time else {
            warn!("No DateTimeOriginal found in {}", path.display());
            return FileOutcome::NoCaptureTime;
        };

        let Some(corrected) = offset.apply(original) else {
            error!("{}", WriteError::OutOfRange { path: path.to_path_buf() });
            return FileOutcome::WriteFailed;
        };

        let original_time = original.format(CAPTURE_TIME_FORMAT).to_string();
        let changed_time = self.config.time_style.format(&corrected);

        info!(
            "Original time: {} | New time: {} for image: {}",
            original_time,
            changed_time,
            path.display()
        );

        if let Err(e) = self.writer.write(path, &changed_time) {
            error!("Failed to update EXIF data: {}", e);
            return FileOutcome::WriteFailed;
        }

        match self.ledger.record(
            &file_name,
            path,
            &original_time,
            &changed_time,
            ChangeStatus::Changed,
        ) {
            Ok(()) => FileOutcome::Changed,
            Err(e) => {
                error!(
                    "Updated {} but could not record it in the ledger: {}",
                    path.display(),
                    e
                );
                FileOutcome::LedgerFailed
            }
        }
    }

    /// Append a `skipped` row carrying the times of the last correction
    fn record_skip(&self, file_name: &str, path: &Path) {
        let last_change = self
            .ledger
            .entries_for(path)
            .ok()
            .and_then(|entries| {
                entries
                    .into_iter()
                    .rev()
                    .find(|entry| entry.status == ChangeStatus::Changed)
            });

        let (original_time, changed_time) = last_change
            .map(|entry| (entry.original_time, entry.changed_time))
            .unwrap_or_default();

        if let Err(e) = self.ledger.record(
            file_name,
            path,
            &original_time,
            &changed_time,
            ChangeStatus::Skipped,
        ) {
            error!("Could not record skip for {}: {}", path.display(), e);
        }
    }
}
