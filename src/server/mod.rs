//! Broker HTTP server
//!
//! Exposes the metadata broker (and proxied transfers) as a small JSON API
//! under `/api`.

pub mod core;
pub mod handlers;
pub mod routes;

pub use core::Server;
pub use routes::{AppState, api_router, app};
