//! Error handling
//!
//! Defines error types and handling for the explorer.

pub mod handlers;
pub mod types;

pub use types::*;
