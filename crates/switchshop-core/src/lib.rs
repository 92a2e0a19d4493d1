//! Core types for switchshop.
//!
//! This crate provides the data model shared by the index and the delivery
//! layer: library file records, display-name cleanup, the content-type
//! table, configuration and error types.

mod config;
mod content_type;
mod error;
mod file;

pub use config::{
    DEFAULT_CHUNK_SIZE, DEFAULT_LIBRARY_PATH, DEFAULT_PORT, ShopConfig, ShopConfigBuilder,
};
pub use content_type::{OCTET_STREAM, content_type_for};
pub use error::{ScanWarning, ShopError, WarningKind};
pub use file::{LibraryFile, cleanup_file_name, extension_of};
