//! TCP listener and graceful shutdown around the router.

use std::net::SocketAddr;
use std::sync::Arc;

use thiserror::Error;
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tracing::info;

use switchshop_core::{ShopConfig, ShopError};
use switchshop_index::LibraryIndex;

use crate::routes::router;

/// Errors from running the HTTP server.
#[derive(Debug, Error)]
pub enum ServeError {
    /// Could not bind the listener.
    #[error("Failed to bind {addr}: {source}")]
    Bind {
        addr: SocketAddr,
        #[source]
        source: std::io::Error,
    },

    /// The server loop stopped with an error.
    #[error("Server error: {0}")]
    Serve(#[from] std::io::Error),

    /// The library index could not be set up.
    #[error("Failed to open library: {0}")]
    Index(#[from] ShopError),

    /// The server task panicked or was aborted.
    #[error("Server task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

/// A running shop server. Dropping it triggers a graceful shutdown.
pub struct ShopServer {
    addr: SocketAddr,
    shutdown: Option<oneshot::Sender<()>>,
    handle: Option<JoinHandle<std::io::Result<()>>>,
}

impl ShopServer {
    /// Bind the configured address and start serving in the background.
    pub async fn start(config: Arc<ShopConfig>) -> Result<Self, ServeError> {
        let index = LibraryIndex::new(Arc::clone(&config))?;
        let requested = config.socket_addr();
        let listener = TcpListener::bind(requested)
            .await
            .map_err(|source| ServeError::Bind {
                addr: requested,
                source,
            })?;
        let addr = listener.local_addr()?;

        info!(
            %addr,
            library = %config.library_path.display(),
            "serving library"
        );

        let app = router(index);
        let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();

        let handle = tokio::spawn(async move {
            axum::serve(listener, app)
                .with_graceful_shutdown(async move {
                    let _ = shutdown_rx.await;
                })
                .await
        });

        Ok(Self {
            addr,
            shutdown: Some(shutdown_tx),
            handle: Some(handle),
        })
    }

    /// Address actually bound (useful with port 0).
    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    /// Ask the server to stop accepting connections.
    pub fn shutdown(&mut self) {
        if let Some(sender) = self.shutdown.take() {
            let _ = sender.send(());
        }
    }

    /// Wait until the server loop exits.
    pub async fn wait(mut self) -> Result<(), ServeError> {
        match self.handle.take() {
            Some(handle) => Ok(handle.await??),
            None => Ok(()),
        }
    }
}

impl Drop for ShopServer {
    fn drop(&mut self) {
        self.shutdown();
    }
}
