//! Session operation inputs and results

use bytes::Bytes;

use crate::path::VirtualPath;

/// One file queued for upload.
#[derive(Debug, Clone)]
pub struct UploadFile {
    /// Leaf name; becomes the last segment of the object key.
    pub name: String,
    pub data: Bytes,
    /// Guessed from `name` when absent.
    pub content_type: Option<String>,
}

impl UploadFile {
    pub fn new(name: impl Into<String>, data: impl Into<Bytes>) -> Self {
        Self {
            name: name.into(),
            data: data.into(),
            content_type: None,
        }
    }

    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }
}

/// Outcome of a fully stored upload batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadReport {
    pub uploaded: Vec<VirtualPath>,
    /// Failure of the listing refresh that followed the batch, if any.
    pub refresh_error: Option<String>,
}

/// A downloaded file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Download {
    pub name: String,
    pub data: Bytes,
    pub content_type: String,
}
