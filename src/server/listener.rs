//! Leaderboard server listener
//!
//! Binds the HTTP listener, spawns the leaderboard actor and serves the
//! routes until shutdown.

use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;

use tokio::net::TcpListener;

use crate::actor::LeaderboardActor;
use crate::error::Result;
use crate::hub::SubscriberHub;
use crate::server::config::{ServerConfig, StorageConfig};
use crate::server::routes;
use crate::store::{FileStore, KvStore, MemoryStore};

/// Leaderboard HTTP/websocket server
pub struct LeaderboardServer {
    config: ServerConfig,
}

impl LeaderboardServer {
    /// Create a new server with the given configuration
    pub fn new(config: ServerConfig) -> Self {
        Self { config }
    }

    /// Get the server configuration
    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    /// Get the bind address
    pub fn bind_addr(&self) -> SocketAddr {
        self.config.bind_addr
    }

    /// Run the server
    ///
    /// This method blocks until the server fails.
    pub async fn run(&self) -> Result<()> {
        self.run_until(std::future::pending()).await
    }

    /// Run the server with graceful shutdown
    pub async fn run_until<F>(&self, shutdown: F) -> Result<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let listener = TcpListener::bind(self.config.bind_addr).await?;
        self.serve(listener, shutdown).await
    }

    /// Serve on an already bound listener
    pub async fn serve<F>(&self, listener: TcpListener, shutdown: F) -> Result<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        match &self.config.storage {
            StorageConfig::Memory => {
                tracing::info!("Using in-memory storage");
                self.serve_with_store(listener, MemoryStore::new(), shutdown)
                    .await
            }
            StorageConfig::File(dir) => {
                tracing::info!(dir = %dir.display(), "Using file storage");
                let store = FileStore::open(dir).await?;
                self.serve_with_store(listener, store, shutdown).await
            }
        }
    }

    async fn serve_with_store<S, F>(&self, listener: TcpListener, store: S, shutdown: F) -> Result<()>
    where
        S: KvStore,
        F: Future<Output = ()> + Send + 'static,
    {
        let hub = Arc::new(SubscriberHub::with_queue_capacity(
            self.config.leaderboard.subscriber_queue,
        ));
        let (handle, actor_task) =
            LeaderboardActor::spawn(store, hub, self.config.leaderboard.clone());

        let app = routes::router(handle, self.config.max_body_bytes);

        let addr = listener.local_addr()?;
        tracing::info!(addr = %addr, "Leaderboard server listening");

        let result = axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                shutdown.await;
                tracing::info!("Shutdown signal received");
            })
            .await;

        // Websocket sessions may still hold handles; stop the actor explicitly
        actor_task.abort();

        result.map_err(Into::into)
    }
}
