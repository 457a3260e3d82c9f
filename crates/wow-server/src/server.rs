use std::future::Future;
use std::sync::Arc;

use tokio::net::TcpListener;
use tracing::{info, warn};
use wow_engine::MutationEngine;
use wow_hub::{BroadcastHub, HubConfig};
use wow_store::{InMemoryWishStore, SqliteWishStore, WishStore};

use crate::config::{DatabaseConfig, ServerConfig};
use crate::error::{ServerError, ServerResult};
use crate::router::{build_router, AppState};

/// Wall of Wishes server.
pub struct WowServer {
    config: ServerConfig,
    engine: Arc<MutationEngine>,
}

impl WowServer {
    /// Open the store, pick the ledger, and wire up the engine.
    pub fn new(config: ServerConfig) -> ServerResult<Self> {
        let store = open_store(&config.database)?;
        let ledger = config.ledger.build()?;
        let hub = Arc::new(BroadcastHub::new(HubConfig {
            observer_buffer: config.observer_buffer,
        }));
        info!(ledger = %ledger.mode(), "engine ready");
        let engine = Arc::new(MutationEngine::new(store, ledger, hub));
        Ok(Self { config, engine })
    }

    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    pub fn engine(&self) -> &Arc<MutationEngine> {
        &self.engine
    }

    /// Build the router (useful for testing).
    pub fn router(&self) -> axum::Router {
        build_router(
            AppState::new(Arc::clone(&self.engine)),
            self.config.allow_any_origin,
        )
    }

    /// Serve until Ctrl-C.
    pub async fn serve(self) -> ServerResult<()> {
        let listener = TcpListener::bind(&self.config.bind_addr).await?;
        self.serve_on(listener, shutdown_signal()).await
    }

    /// Serve on an already bound listener until `shutdown` resolves.
    pub async fn serve_on<F>(self, listener: TcpListener, shutdown: F) -> ServerResult<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let app = self.router();
        info!("wow server listening on {}", listener.local_addr()?);
        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown)
            .await
            .map_err(|e| ServerError::Internal(e.to_string()))
    }
}

/// Open the configured store, creating the schema if needed.
pub fn open_store(database: &DatabaseConfig) -> ServerResult<Arc<dyn WishStore>> {
    match database {
        DatabaseConfig::Memory => {
            warn!("using in-memory store; wishes will not survive a restart");
            Ok(Arc::new(InMemoryWishStore::new()))
        }
        DatabaseConfig::Sqlite { path, pool_size } => {
            info!(path = %path.display(), pool_size, "opening sqlite store");
            Ok(Arc::new(SqliteWishStore::open(path, *pool_size)?))
        }
    }
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        warn!(error = %err, "could not listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("shutting down");
}
