//! Directory walking implementation using walkdir.

use super::filter::ImageFilter;
use crate::error::ScanError;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Directory name that excludes a whole subtree from processing
pub const IGNORE_DIR_NAME: &str = "_ignore";

/// Configuration for the directory scanner
#[derive(Debug, Clone)]
pub struct ScanConfig {
    /// Whether to follow symbolic links
    pub follow_symlinks: bool,
    /// Directory name whose subtree is skipped
    pub ignore_dir_name: String,
    /// Custom extensions to include (None = use defaults)
    pub extensions: Option<Vec<String>>,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            follow_symlinks: false,
            ignore_dir_name: IGNORE_DIR_NAME.to_string(),
            extensions: None,
        }
    }
}

/// One step of a walk
#[derive(Debug)]
pub enum WalkItem {
    /// A photo with a supported extension
    Photo(PathBuf),
    /// An `_ignore` directory whose subtree was pruned
    IgnoredDir(PathBuf),
    /// An entry that could not be read; the walk continues
    Error(ScanError),
}

/// Walks a photo tree in file-name order
pub struct PhotoWalker {
    config: ScanConfig,
}

impl PhotoWalker {
    /// Create a new walker with the given configuration
    pub fn new(config: ScanConfig) -> Self {
        Self { config }
    }

    fn filter(&self) -> ImageFilter {
        match self.config.extensions {
            Some(ref extensions) => ImageFilter::new().with_extensions(extensions.clone()),
            None => ImageFilter::new(),
        }
    }

    /// Start a walk over `root`
    pub fn walk(&self, root: &Path) -> Result<PhotoWalk, ScanError> {
        if !root.is_dir() {
            return Err(ScanError::DirectoryNotFound {
                path: root.to_path_buf(),
            });
        }

        let inner = WalkDir::new(root)
            .follow_links(self.config.follow_symlinks)
            .sort_by_file_name()
            .into_iter();

        Ok(PhotoWalk {
            inner,
            filter: self.filter(),
            ignore_dir_name: self.config.ignore_dir_name.clone(),
        })
    }

    /// Count the photos a walk over `root` will yield
    pub fn count(&self, root: &Path) -> Result<usize, ScanError> {
        Ok(self
            .walk(root)?
            .filter(|item| matches!(item, WalkItem::Photo(_)))
            .count())
    }
}

impl Default for PhotoWalker {
    fn default() -> Self {
        Self::new(ScanConfig::default())
    }
}

/// Iterator over the items of one walk
pub struct PhotoWalk {
    inner: walkdir::IntoIter,
    filter: ImageFilter,
    ignore_dir_name: String,
}

impl Iterator for PhotoWalk {
    type Item = WalkItem;

    fn next(&mut self) -> Option<WalkItem> {
        loop {
            let entry = match self.inner.next()? {
                Ok(entry) => entry,
                Err(e) => return Some(WalkItem::Error(convert_error(e))),
            };

            if entry.file_type().is_dir() {
                // The root is never pruned, even if it is itself named _ignore
                if entry.depth() > 0 && entry.file_name() == self.ignore_dir_name.as_str() {
                    self.inner.skip_current_dir();
                    return Some(WalkItem::IgnoredDir(entry.into_path()));
                }
                continue;
            }

            if self.filter.should_include(entry.path()) {
                return Some(WalkItem::Photo(entry.into_path()));
            }
        }
    }
}

fn convert_error(e: walkdir::Error) -> ScanError {
    let path = e.path().map(Path::to_path_buf).unwrap_or_default();

    if e.io_error().map(|e| e.kind()) == Some(std::io::ErrorKind::PermissionDenied) {
        ScanError::PermissionDenied { path }
    } else {
        ScanError::ReadDirectory {
            path,
            reason: e.to_string(),
        }
    }
}
