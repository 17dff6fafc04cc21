use log::{error, info};
use std::sync::Arc;
use tokio::net::TcpListener;

use crate::config::ExplorerConfig;
use crate::error::ExplorerError;
use crate::server::routes::{AppState, app};
use crate::storage::{AzureConnector, Broker, Connector};

pub struct Server {
    listener: TcpListener,
    config: Arc<ExplorerConfig>,
    state: AppState,
}

impl Server {
    /// Binds the configured socket and wires the broker to Azure Blob Storage.
    pub async fn new(config: ExplorerConfig) -> Result<Self, ExplorerError> {
        let connector: Arc<dyn Connector> = Arc::new(AzureConnector::new(&config.storage)?);
        Self::with_connector(config, connector).await
    }

    /// Like [`Server::new`], over any storage connector.
    pub async fn with_connector(
        config: ExplorerConfig,
        connector: Arc<dyn Connector>,
    ) -> Result<Self, ExplorerError> {
        let socket = config.server.socket();
        let listener = TcpListener::bind(&socket).await.map_err(|e| {
            error!("Failed to bind to {}: {}", socket, e);
            e
        })?;
        info!("Server bound to {}", socket);

        let broker = Broker::new(connector, config.storage.directory_marker.clone());
        Ok(Self {
            listener,
            config: Arc::new(config),
            state: AppState::new(Arc::new(broker)),
        })
    }

    pub async fn start(self) -> Result<(), ExplorerError> {
        info!(
            "Starting blob-explorer broker on {} (uploads up to {} MB)",
            self.config.server.socket(),
            self.config.server.max_upload_mb
        );

        let router = app(self.state, &self.config.server);
        axum::serve(self.listener, router)
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        info!("Server stopped");
        Ok(())
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for shutdown signal: {}", e);
    }
    info!("Shutdown signal received");
}
