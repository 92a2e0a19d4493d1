//! Result of a single library scan.

use std::path::PathBuf;
use std::time::Duration;

use switchshop_core::{LibraryFile, ScanWarning};

/// Files found by one scan, plus anything skipped along the way.
#[derive(Debug, Clone)]
pub struct LibraryScan {
    /// Library root that was scanned.
    pub root: PathBuf,
    /// Discovered files in walk order.
    pub files: Vec<LibraryFile>,
    /// Entries skipped during the scan.
    pub warnings: Vec<ScanWarning>,
    /// Time taken by the scan.
    pub scan_duration: Duration,
}

impl LibraryScan {
    pub fn new(
        root: PathBuf,
        files: Vec<LibraryFile>,
        warnings: Vec<ScanWarning>,
        scan_duration: Duration,
    ) -> Self {
        Self {
            root,
            files,
            warnings,
            scan_duration,
        }
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Sum of all file sizes in bytes.
    pub fn total_size(&self) -> u64 {
        self.files.iter().map(|f| f.size).sum()
    }

    /// First file whose name matches exactly.
    pub fn find(&self, name: &str) -> Option<&LibraryFile> {
        self.files.iter().find(|f| f.name == name)
    }
}
