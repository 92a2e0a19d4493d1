//! JWalk-based two-level library scanner.

use std::fs::Metadata;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use jwalk::{Parallelism, WalkDir};
use rayon::prelude::*;
use rayon::{ThreadPool, ThreadPoolBuilder};

use switchshop_core::{LibraryFile, ScanWarning, ShopConfig, ShopError, WarningKind};

use crate::listing::LibraryScan;

/// Depth of files below the library root: `<root>/<title dir>/<file>`.
const FILE_DEPTH: usize = 2;

/// Scanner that lists regular files exactly one directory below the root.
///
/// Walks and stats run on a pool owned by the scanner, never on rayon's
/// global pool. Concurrent scans queue on the pool instead of timing out.
#[derive(Debug, Clone)]
pub struct LibraryScanner {
    pool: Arc<ThreadPool>,
}

/// A directory entry that looked like a file during the walk.
struct Candidate {
    parent_dir: String,
    name: String,
    path: PathBuf,
}

impl LibraryScanner {
    /// Create a scanner with `threads` workers (0 = one per CPU).
    pub fn new(threads: usize) -> Result<Self, ShopError> {
        let pool = ThreadPoolBuilder::new()
            .num_threads(threads)
            .thread_name(|i| format!("library-scan-{i}"))
            .build()
            .map_err(|err| ShopError::Scan {
                message: format!("Failed to build scan thread pool: {err}"),
            })?;

        Ok(Self {
            pool: Arc::new(pool),
        })
    }

    /// Scan the configured library.
    ///
    /// Fails when the root is unusable or the walk breaks before reaching
    /// the title directories; per-file problems are collected as warnings on
    /// the returned [`LibraryScan`].
    pub fn scan(&self, config: &ShopConfig) -> Result<LibraryScan, ShopError> {
        let start = Instant::now();
        let root = config.library_path.as_path();

        match std::fs::metadata(root) {
            Ok(metadata) if metadata.is_dir() => {}
            _ => {
                return Err(ShopError::ConfigurationMissing {
                    path: root.to_path_buf(),
                });
            }
        }

        let mut warnings = Vec::new();
        let candidates = self.collect_candidates(root, &mut warnings)?;

        // Stat siblings in parallel; collect keeps walk order.
        let stats: Vec<Result<LibraryFile, ScanWarning>> = self.pool.install(|| {
            candidates
                .into_par_iter()
                .map(|candidate| stat_candidate(root, candidate))
                .collect()
        });

        let mut files = Vec::with_capacity(stats.len());
        for result in stats {
            match result {
                Ok(file) => files.push(file),
                Err(warning) => warnings.push(warning),
            }
        }

        Ok(LibraryScan::new(
            root.to_path_buf(),
            files,
            warnings,
            start.elapsed(),
        ))
    }

    /// Walk the tree and keep depth-2 regular files.
    ///
    /// The root and title directories are yielded too (no `min_depth`) so a
    /// listing failure on them is seen instead of silently dropping files.
    fn collect_candidates(
        &self,
        root: &Path,
        warnings: &mut Vec<ScanWarning>,
    ) -> Result<Vec<Candidate>, ShopError> {
        let walker = WalkDir::new(root)
            .parallelism(Parallelism::RayonExistingPool {
                pool: Arc::clone(&self.pool),
                busy_timeout: None,
            })
            .skip_hidden(false)
            .follow_links(false)
            .sort(true)
            .max_depth(FILE_DEPTH);

        let mut candidates = Vec::new();

        for entry_result in walker {
            let entry = match entry_result {
                Ok(e) => e,
                // Root or title directory unusable (or pool busy): the listing would be incomplete.
                Err(err) if err.depth() < FILE_DEPTH => {
                    let path = err.path().unwrap_or(root).display().to_string();
                    return Err(ShopError::Scan {
                        message: format!("{path}: {err}"),
                    });
                }
                Err(err) => {
                    let path = err.path().map(|p| p.to_path_buf()).unwrap_or_default();
                    warnings.push(ScanWarning::new(path, err.to_string(), WarningKind::ReadError));
                    continue;
                }
            };

            if entry.depth < FILE_DEPTH {
                if let Some(err) = &entry.read_children_error {
                    return Err(ShopError::Scan {
                        message: format!("{}: {err}", entry.path().display()),
                    });
                }
                continue;
            }

            // Symlinks, directories and special files are not served.
            if !entry.file_type().is_file() {
                continue;
            }

            let path = entry.path();
            let name = entry.file_name().to_str().map(str::to_owned);
            let parent_dir = entry
                .parent_path()
                .file_name()
                .and_then(|n| n.to_str())
                .map(str::to_owned);

            match (parent_dir, name) {
                (Some(parent_dir), Some(name)) if !name.is_empty() => candidates.push(Candidate {
                    parent_dir,
                    name,
                    path,
                }),
                _ => warnings.push(ScanWarning::non_utf8_name(path)),
            }
        }

        Ok(candidates)
    }
}

/// Fetch fresh metadata for a candidate and build its record.
fn stat_candidate(root: &Path, candidate: Candidate) -> Result<LibraryFile, ScanWarning> {
    let metadata: Metadata = std::fs::symlink_metadata(&candidate.path)
        .map_err(|err| ScanWarning::metadata_error(&candidate.path, &err))?;

    // Replaced by something else between the walk and the stat.
    if !metadata.is_file() {
        return Err(ScanWarning::new(
            &candidate.path,
            "No longer a regular file",
            WarningKind::MetadataError,
        ));
    }

    Ok(LibraryFile::new(
        root,
        candidate.parent_dir,
        candidate.name,
        metadata.len(),
    ))
}
