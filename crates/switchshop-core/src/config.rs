//! Shop configuration types.

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::PathBuf;

use derive_builder::Builder;
use serde::{Deserialize, Serialize};

/// Default library location, relative to the working directory.
pub const DEFAULT_LIBRARY_PATH: &str = "./library";

/// Default HTTP port.
pub const DEFAULT_PORT: u16 = 3000;

/// Default read size for streamed downloads.
pub const DEFAULT_CHUNK_SIZE: usize = 64 * 1024;

/// Process-wide configuration, built once at startup and shared read-only.
#[derive(Debug, Clone, Builder, Serialize, Deserialize)]
#[builder(setter(into), build_fn(validate = "Self::validate"))]
pub struct ShopConfig {
    /// Root of the library: one subdirectory per title, files inside.
    #[builder(default = "PathBuf::from(DEFAULT_LIBRARY_PATH)")]
    #[serde(default = "default_library_path")]
    pub library_path: PathBuf,

    /// Address to bind the HTTP listener to.
    #[builder(default = "IpAddr::V4(Ipv4Addr::UNSPECIFIED)")]
    #[serde(default = "default_bind_address")]
    pub bind_address: IpAddr,

    /// HTTP port (0 picks a free port).
    #[builder(default = "DEFAULT_PORT")]
    #[serde(default = "default_port")]
    pub port: u16,

    /// Bytes read per chunk when streaming a download.
    #[builder(default = "DEFAULT_CHUNK_SIZE")]
    #[serde(default = "default_chunk_size")]
    pub chunk_size: usize,

    /// Number of threads for scanning (0 = auto-detect).
    #[builder(default = "0")]
    #[serde(default)]
    pub threads: usize,
}

fn default_library_path() -> PathBuf {
    PathBuf::from(DEFAULT_LIBRARY_PATH)
}

fn default_bind_address() -> IpAddr {
    IpAddr::V4(Ipv4Addr::UNSPECIFIED)
}

fn default_port() -> u16 {
    DEFAULT_PORT
}

fn default_chunk_size() -> usize {
    DEFAULT_CHUNK_SIZE
}

impl ShopConfigBuilder {
    fn validate(&self) -> Result<(), String> {
        if let Some(ref path) = self.library_path {
            if path.as_os_str().is_empty() {
                return Err("Library path cannot be empty".to_string());
            }
        }
        if self.chunk_size == Some(0) {
            return Err("Chunk size must be greater than zero".to_string());
        }
        Ok(())
    }
}

impl ShopConfig {
    /// Create a new config builder.
    pub fn builder() -> ShopConfigBuilder {
        ShopConfigBuilder::default()
    }

    /// Create a config for serving the given library with defaults elsewhere.
    pub fn new(library_path: impl Into<PathBuf>) -> Self {
        Self {
            library_path: library_path.into(),
            ..Self::default()
        }
    }

    /// Socket address the server listens on.
    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.bind_address, self.port)
    }
}

impl Default for ShopConfig {
    fn default() -> Self {
        Self {
            library_path: default_library_path(),
            bind_address: default_bind_address(),
            port: DEFAULT_PORT,
            chunk_size: DEFAULT_CHUNK_SIZE,
            threads: 0,
        }
    }
}
