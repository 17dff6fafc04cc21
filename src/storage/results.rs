//! Storage result types
//!
//! Defines result structures returned by storage operations.

use bytes::Bytes;
use serde::{Deserialize, Serialize};

/// One object as reported by a container listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObjectRecord {
    pub key: String,
    pub size: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_modified: Option<String>,
}

impl ObjectRecord {
    pub fn new(key: impl Into<String>, size: u64) -> Self {
        Self {
            key: key.into(),
            size,
            content_type: None,
            last_modified: None,
        }
    }
}

/// Bytes of a downloaded object together with its stored content type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlobContent {
    pub data: Bytes,
    pub content_type: String,
}
