//! Library scanning and lookup for switchshop.
//!
//! The library is a two-level tree: the root holds one directory per title
//! and each of those holds the package files. Files directly in the root and
//! anything nested deeper are ignored.
//!
//! # Overview
//!
//! - [`LibraryScanner`] walks the tree with jwalk and stats files in
//!   parallel via rayon. It is synchronous.
//! - [`LibraryIndex`] wraps the scanner for async callers. It keeps no
//!   cache: each call reflects the filesystem as it is now.
//!
//! # Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use switchshop_index::{LibraryIndex, ShopConfig};
//!
//! # async fn run() -> Result<(), switchshop_index::ShopError> {
//! let index = LibraryIndex::new(Arc::new(ShopConfig::new("/srv/library")))?;
//!
//! for file in index.scan().await {
//!     println!("{} ({} bytes)", file.display_name, file.size);
//! }
//! # Ok(())
//! # }
//! ```

mod index;
mod listing;
mod scanner;

pub use index::{LibraryIndex, resolve_in};
pub use listing::LibraryScan;
pub use scanner::LibraryScanner;

// Re-export core types for convenience
pub use switchshop_core::{LibraryFile, ScanWarning, ShopConfig, ShopError, WarningKind};
