//! Async, stateless access to the library.

use std::sync::Arc;

use tracing::{debug, error, warn};
use unicode_normalization::UnicodeNormalization;

use switchshop_core::{LibraryFile, ShopConfig, ShopError};

use crate::listing::LibraryScan;
use crate::scanner::LibraryScanner;

/// Entry point for listing and looking up library files.
///
/// Holds the configuration and the scan pool, never file listings: every
/// call re-reads the filesystem, so clones can be shared freely between
/// requests.
#[derive(Debug, Clone)]
pub struct LibraryIndex {
    config: Arc<ShopConfig>,
    scanner: Arc<LibraryScanner>,
}

impl LibraryIndex {
    /// Build an index and its scan pool (`config.threads` workers).
    pub fn new(config: Arc<ShopConfig>) -> Result<Self, ShopError> {
        let scanner = LibraryScanner::new(config.threads)?;
        Ok(Self {
            config,
            scanner: Arc::new(scanner),
        })
    }

    pub fn config(&self) -> &ShopConfig {
        &self.config
    }

    /// Run a full scan on the blocking pool.
    pub async fn scan_detailed(&self) -> Result<LibraryScan, ShopError> {
        let config = Arc::clone(&self.config);
        let scanner = Arc::clone(&self.scanner);
        let scan = tokio::task::spawn_blocking(move || scanner.scan(&config))
            .await
            .map_err(|err| ShopError::Scan {
                message: err.to_string(),
            })??;

        for warning in &scan.warnings {
            warn!(path = %warning.path.display(), kind = ?warning.kind, "{}", warning.message);
        }
        debug!(
            root = %scan.root.display(),
            files = scan.len(),
            elapsed_ms = scan.scan_duration.as_millis() as u64,
            "library scanned"
        );

        Ok(scan)
    }

    /// List every file, reporting scan failures.
    ///
    /// A missing root is not a failure: it is logged and listed as empty.
    pub async fn try_scan(&self) -> Result<Vec<LibraryFile>, ShopError> {
        match self.scan_detailed().await {
            Ok(scan) => Ok(scan.files),
            Err(err @ ShopError::ConfigurationMissing { .. }) => {
                error!("Error scanning library: {err}");
                Ok(Vec::new())
            }
            Err(err) => Err(err),
        }
    }

    /// List every file in the library.
    ///
    /// Any failure yields an empty list; the cause is logged.
    pub async fn scan(&self) -> Vec<LibraryFile> {
        match self.try_scan().await {
            Ok(files) => files,
            Err(err) => {
                error!("Error scanning library: {err}");
                Vec::new()
            }
        }
    }

    /// First file whose on-disk name equals `name` exactly.
    pub async fn find_by_name(&self, name: &str) -> Option<LibraryFile> {
        self.scan().await.into_iter().find(|f| f.name == name)
    }

    /// Like [`find_by_name`](Self::find_by_name), but also accepts the NFC or
    /// NFD spelling of a name stored in the other form.
    ///
    /// Fails instead of reporting a miss when the scan itself broke.
    pub async fn resolve(&self, name: &str) -> Result<Option<LibraryFile>, ShopError> {
        let files = self.try_scan().await?;
        Ok(resolve_in(&files, name).cloned())
    }
}

/// Look up `name` in a scanned listing, exact match first.
pub fn resolve_in<'a>(files: &'a [LibraryFile], name: &str) -> Option<&'a LibraryFile> {
    if let Some(file) = files.iter().find(|f| f.name == name) {
        return Some(file);
    }

    let composed: String = name.nfc().collect();
    let decomposed: String = name.nfd().collect();

    [composed, decomposed]
        .into_iter()
        .filter(|form| form != name)
        .find_map(|form| files.iter().find(|f| f.name == form))
}
