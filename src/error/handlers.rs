//! Error handlers
//!
//! Maps errors onto HTTP responses for the broker API.

use axum::http::StatusCode;
use log::error;

use crate::error::types::{BrokerError, ExplorerError, RemoteErrorKind};

/// Handle an explorer error
pub fn handle_error(err: &ExplorerError) {
    error!("Explorer error: {}", err);
}

/// Convert a broker error to an HTTP status code
pub fn broker_error_status(err: &BrokerError) -> StatusCode {
    match err {
        BrokerError::NotConnected => StatusCode::BAD_REQUEST,
        BrokerError::InvalidPath(_) => StatusCode::BAD_REQUEST,
        BrokerError::Remote(e) => match e.kind() {
            RemoteErrorKind::NotFound => StatusCode::NOT_FOUND,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        },
    }
}

/// Convert a failed connect attempt to an HTTP status code.
///
/// Connect failures are the caller's fault (bad account, container or token).
pub fn connect_error_status(_err: &BrokerError) -> StatusCode {
    StatusCode::BAD_REQUEST
}
