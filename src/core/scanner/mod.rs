//! # Scanner Module
//!
//! Discovers photo files under a root directory.
//!
//! ## Supported Formats
//! - JPEG (.jpg, .jpeg)
//! - TIFF (.tiff)
//! - Nikon RAW (.nef)
//!
//! Any directory named `_ignore`, at any depth, is pruned together with
//! everything below it.
//!
//! ## Example
//! ```rust,ignore
//! use capture_time_adjuster::core::scanner::{PhotoWalker, ScanConfig, WalkItem};
//!
//! let walker = PhotoWalker::new(ScanConfig::default());
//! let total = walker.count("/Users/photos".as_ref())?;
//! for item in walker.walk("/Users/photos".as_ref())? {
//!     if let WalkItem::Photo(path) = item { /* ... */ }
//! }
//! ```

mod filter;
mod walker;

pub use filter::ImageFilter;
pub use walker::{PhotoWalk, PhotoWalker, ScanConfig, WalkItem, IGNORE_DIR_NAME};

use serde::{Deserialize, Serialize};
use std::path::Path;

/// Supported image formats
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ImageFormat {
    Jpeg,
    Tiff,
    Nef,
    Unknown,
}

impl ImageFormat {
    /// Detect format from file extension
    pub fn from_extension(ext: &str) -> Self {
        match ext.to_lowercase().as_str() {
            "jpg" | "jpeg" => ImageFormat::Jpeg,
            "tiff" => ImageFormat::Tiff,
            "nef" => ImageFormat::Nef,
            _ => ImageFormat::Unknown,
        }
    }

    /// Detect format from a path's extension
    pub fn from_path(path: &Path) -> Self {
        path.extension()
            .and_then(|e| e.to_str())
            .map(ImageFormat::from_extension)
            .unwrap_or(ImageFormat::Unknown)
    }

    /// RAW formats need the external tool to read metadata
    pub fn is_raw(&self) -> bool {
        matches!(self, ImageFormat::Nef)
    }

    /// Check if this format is supported
    pub fn is_supported(&self) -> bool {
        !matches!(self, ImageFormat::Unknown)
    }
}
