//! API handlers
//!
//! Every failure renders as `{"detail": "<message>"}`.

use axum::{
    Json,
    body::Bytes,
    extract::{Query, State},
    http::{HeaderMap, StatusCode, header},
    response::{IntoResponse, Response},
};
use log::{debug, warn};
use serde::Deserialize;
use serde_json::json;

use crate::auth::{ConnectionInfo, Credentials};
use crate::error::BrokerError;
use crate::error::handlers::{broker_error_status, connect_error_status};
use crate::path::VirtualPath;
use crate::server::routes::AppState;
use crate::storage::DEFAULT_CONTENT_TYPE;

#[derive(Debug, Deserialize)]
pub struct PathQuery {
    #[serde(default)]
    pub path: String,
}

#[derive(Debug, Deserialize)]
pub struct UploadQuery {
    #[serde(default)]
    pub path: String,
    pub filename: String,
}

fn detail(status: StatusCode, message: impl Into<String>) -> Response {
    (status, Json(json!({ "detail": message.into() }))).into_response()
}

fn broker_failure(err: BrokerError) -> Response {
    let status = broker_error_status(&err);
    if status.is_server_error() {
        warn!("Broker request failed: {}", err);
    }
    detail(status, err.to_string())
}

// Handlers

pub async fn health() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

pub async fn connect(State(state): State<AppState>, Json(info): Json<ConnectionInfo>) -> Response {
    let credentials = match Credentials::try_from(info) {
        Ok(credentials) => credentials,
        Err(e) => return detail(StatusCode::BAD_REQUEST, e.to_string()),
    };

    match state.broker.open_connection(&credentials).await {
        Ok(()) => Json(json!({ "status": "connected" })).into_response(),
        Err(e) => {
            warn!("Connect to '{}' failed: {}", credentials.container(), e);
            detail(connect_error_status(&e), e.to_string())
        }
    }
}

pub async fn disconnect(State(state): State<AppState>) -> Json<serde_json::Value> {
    state.broker.close_connection().await;
    Json(json!({ "status": "disconnected" }))
}

pub async fn list_files(State(state): State<AppState>, Query(query): Query<PathQuery>) -> Response {
    let path = VirtualPath::from_key(&query.path);
    match state.broker.list_objects(&path).await {
        Ok(records) => Json(records).into_response(),
        Err(e) => broker_failure(e),
    }
}

pub async fn upload_file(
    State(state): State<AppState>,
    Query(query): Query<UploadQuery>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let dir = VirtualPath::from_key(&query.path);
    let content_type = headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
        .unwrap_or_else(|| {
            mime_guess::from_path(&query.filename)
                .first()
                .map(|m| m.essence_str().to_string())
                .unwrap_or_else(|| DEFAULT_CONTENT_TYPE.to_string())
        });
    debug!("Upload '{}' into '{}' ({} bytes)", query.filename, dir, body.len());

    match state
        .broker
        .upload_object(&dir, &query.filename, body, &content_type)
        .await
    {
        Ok(key) => Json(json!({ "status": "uploaded", "key": key })).into_response(),
        Err(e) => broker_failure(e),
    }
}

pub async fn download_file(
    State(state): State<AppState>,
    Query(query): Query<PathQuery>,
) -> Response {
    let path = VirtualPath::from_key(&query.path);
    match state.broker.download_object(&path).await {
        Ok(content) => {
            let filename = path.file_name().unwrap_or_default().to_string();
            (
                StatusCode::OK,
                [
                    (header::CONTENT_TYPE, content.content_type),
                    (
                        header::CONTENT_DISPOSITION,
                        format!("attachment; filename={}", filename),
                    ),
                ],
                content.data,
            )
                .into_response()
        }
        Err(e) => broker_failure(e),
    }
}

pub async fn create_directory(
    State(state): State<AppState>,
    Query(query): Query<PathQuery>,
) -> Response {
    let path = VirtualPath::from_key(&query.path);
    if path.as_str().trim().is_empty() {
        return detail(StatusCode::BAD_REQUEST, "Directory path is required");
    }

    match state.broker.create_directory(&path).await {
        Ok(_) => Json(json!({ "message": "Directory created successfully" })).into_response(),
        Err(e) => broker_failure(e),
    }
}

pub async fn delete_path(State(state): State<AppState>, Query(query): Query<PathQuery>) -> Response {
    let path = VirtualPath::from_key(&query.path);
    match state.broker.delete_path(&path).await {
        Ok(_) => Json(json!({ "status": "deleted" })).into_response(),
        Err(e) => broker_failure(e),
    }
}
