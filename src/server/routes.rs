//! Route table and middleware

use axum::{
    Router,
    extract::DefaultBodyLimit,
    http::HeaderValue,
    routing::{delete, get, post},
};
use log::warn;
use std::sync::Arc;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};

use crate::config::ServerConfig;
use crate::server::handlers;
use crate::storage::Broker;

// Shared state
#[derive(Clone)]
pub struct AppState {
    pub broker: Arc<Broker>,
}

impl AppState {
    pub fn new(broker: Arc<Broker>) -> Self {
        Self { broker }
    }
}

// Routes
pub fn api_router() -> Router<AppState> {
    Router::new()
        .route("/health", get(handlers::health))
        .route("/connect", post(handlers::connect))
        .route("/disconnect", post(handlers::disconnect))
        .route("/files", get(handlers::list_files))
        .route("/upload", post(handlers::upload_file))
        .route("/download", get(handlers::download_file))
        .route("/create-directory", post(handlers::create_directory))
        .route("/delete", delete(handlers::delete_path))
}

/// Full application: API under `/api`, CORS and the upload size limit.
pub fn app(state: AppState, config: &ServerConfig) -> Router {
    Router::new()
        .nest("/api", api_router())
        .with_state(state)
        .layer(DefaultBodyLimit::max(config.max_upload_bytes()))
        .layer(cors_layer(&config.allowed_origins))
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(_) => {
                warn!("Ignoring invalid CORS origin '{}'", origin);
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods(Any)
        .allow_headers(Any)
}
