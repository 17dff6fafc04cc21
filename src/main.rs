//! blob-explorer broker - Entry Point
//!
//! Serves the metadata API over HTTP for browser sessions.

use log::{error, info};
use std::process::ExitCode;

use blob_explorer::Server;
use blob_explorer::config::ExplorerConfig;
use blob_explorer::error::ExplorerError;
use blob_explorer::error::handlers::handle_error;

#[tokio::main]
async fn main() -> ExitCode {
    // Initialize the logger (env_logger picks up RUST_LOG environment variable)
    env_logger::init();

    info!("Launching blob-explorer broker...");

    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            handle_error(&e);
            ExitCode::FAILURE
        }
    }
}

async fn run() -> Result<(), ExplorerError> {
    let config = ExplorerConfig::load().map_err(|e| {
        error!("Failed to load configuration: {}", e);
        e
    })?;

    let server = Server::new(config).await?;
    server.start().await
}
