//! HTTP server for the device-flow test double.

pub mod device_flow;
pub mod routes;

use crate::config::Config;
use device_flow::DeviceFlowStore;

/// The coauth HTTP server.
pub struct CoauthServer {
    config: Config,

    /// Registry shared with every handler.
    store: DeviceFlowStore,
}

impl CoauthServer {
    /// Create a new server with an empty registry.
    #[must_use]
    pub fn new(config: Config) -> Self {
        Self { config, store: DeviceFlowStore::new() }
    }

    /// Handle to the registry, for inspection.
    #[must_use]
    pub const fn store(&self) -> &DeviceFlowStore {
        &self.store
    }

    /// Build the router without binding a socket.
    #[must_use]
    pub fn router(&self) -> axum::Router {
        routes::create_router(self.store.clone(), self.config.verification_uri())
    }

    /// Bind and serve until Ctrl-C.
    ///
    /// # Errors
    ///
    /// Returns error if the address cannot be bound or the server fails.
    pub async fn run(self) -> anyhow::Result<()> {
        let router = self.router();
        let addr = self.config.bind;

        let listener = tokio::net::TcpListener::bind(addr).await?;
        tracing::info!(
            verification_uri = %self.config.verification_uri(),
            "HTTP server listening on http://{}",
            addr
        );

        axum::serve(listener, router).with_graceful_shutdown(shutdown_signal()).await?;

        tracing::info!("HTTP server shut down");
        Ok(())
    }
}

impl std::fmt::Debug for CoauthServer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CoauthServer").field("bind", &self.config.bind).finish()
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to install Ctrl-C handler");
        std::future::pending::<()>().await;
    }
    tracing::info!("Received shutdown signal");
}
