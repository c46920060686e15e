//! File filtering logic for the scanner.

use std::collections::HashSet;
use std::path::Path;

/// Filters files to determine if they are photos to adjust
pub struct ImageFilter {
    /// Lowercase file extensions to include
    extensions: HashSet<String>,
}

impl ImageFilter {
    /// Create a new filter with the default extensions
    pub fn new() -> Self {
        Self {
            extensions: ["jpg", "jpeg", "tiff", "nef"]
                .into_iter()
                .map(String::from)
                .collect(),
        }
    }

    /// Override the list of extensions to accept
    pub fn with_extensions(mut self, extensions: Vec<String>) -> Self {
        self.extensions = extensions.into_iter().map(|e| e.to_lowercase()).collect();
        self
    }

    /// Check if a file should be included (case-insensitive extension match)
    pub fn should_include(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|e| e.to_str())
            .map(|ext| self.extensions.contains(&ext.to_lowercase()))
            .unwrap_or(false)
    }
}

impl Default for ImageFilter {
    fn default() -> Self {
        Self::new()
    }
}
