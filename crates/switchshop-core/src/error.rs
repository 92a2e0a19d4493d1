//! Error and warning types for indexing and delivery.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that can occur while indexing the library or delivering a file.
#[derive(Debug, Error)]
pub enum ShopError {
    /// The library root is missing or not a directory.
    #[error("Library directory not found: {path}")]
    ConfigurationMissing { path: PathBuf },

    /// No record matches the requested name.
    #[error("File not found: {name}")]
    NotFound { name: String },

    /// The file was indexed but disappeared before it could be delivered.
    #[error("File vanished before delivery: {path}")]
    FileTransientlyMissing { path: PathBuf },

    /// Generic I/O error.
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The scan could not complete (unreadable root or title directory,
    /// thread pool, join error).
    #[error("Scan failed: {message}")]
    Scan { message: String },
}

impl ShopError {
    /// Create an I/O error with path context.
    ///
    /// `NotFound` is reported as [`ShopError::FileTransientlyMissing`], since
    /// the only paths touched after indexing are ones the index produced.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        let path = path.into();
        match source.kind() {
            std::io::ErrorKind::NotFound => Self::FileTransientlyMissing { path },
            _ => Self::Io { path, source },
        }
    }

    /// HTTP status code this error surfaces as.
    pub fn status(&self) -> u16 {
        match self {
            Self::NotFound { .. } | Self::FileTransientlyMissing { .. } => 404,
            Self::ConfigurationMissing { .. } => 404,
            Self::Io { .. } | Self::Scan { .. } => 500,
        }
    }

    /// Whether this error means "nothing to serve" rather than a fault.
    pub fn is_not_found(&self) -> bool {
        self.status() == 404
    }
}

/// Kind of scan warning.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WarningKind {
    /// Error reading a directory entry.
    ReadError,
    /// Error reading metadata.
    MetadataError,
    /// File name is not valid UTF-8 and cannot be addressed by name.
    NonUtf8Name,
}

/// Non-fatal warning encountered during a scan.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanWarning {
    /// Path where the warning occurred.
    pub path: PathBuf,
    /// Human-readable message.
    pub message: String,
    /// Kind of warning.
    pub kind: WarningKind,
}

impl ScanWarning {
    /// Create a new scan warning.
    pub fn new(path: impl Into<PathBuf>, message: impl Into<String>, kind: WarningKind) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
            kind,
        }
    }

    /// Create a metadata error warning.
    pub fn metadata_error(path: impl Into<PathBuf>, error: &std::io::Error) -> Self {
        Self::new(path, format!("Metadata error: {error}"), WarningKind::MetadataError)
    }

    /// Create a warning for a name that is not valid UTF-8.
    pub fn non_utf8_name(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        Self {
            message: format!("Skipping non UTF-8 file name: {}", path.display()),
            path,
            kind: WarningKind::NonUtf8Name,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_io_not_found_is_transient() {
        let err = ShopError::io(
            "/library/Game1/a.nsp",
            std::io::Error::new(std::io::ErrorKind::NotFound, "gone"),
        );
        assert!(matches!(err, ShopError::FileTransientlyMissing { .. }));
        assert_eq!(err.status(), 404);
    }

    #[test]
    fn test_io_permission_is_internal() {
        let err = ShopError::io(
            "/library/Game1/a.nsp",
            std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        );
        assert!(matches!(err, ShopError::Io { .. }));
        assert_eq!(err.status(), 500);
        assert!(!err.is_not_found());
    }

    #[test]
    fn test_non_utf8_warning() {
        let warning = ScanWarning::non_utf8_name("/library/Game1/bad");
        assert_eq!(warning.kind, WarningKind::NonUtf8Name);
        assert!(warning.message.contains("non UTF-8"));
    }
}
