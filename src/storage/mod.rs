//! Object storage
//!
//! The flat container store, the collaborators a browser session consumes,
//! and their Azure Blob, in-memory, broker and HTTP implementations.

pub mod api_client;
pub mod azure;
pub mod broker;
pub mod direct;
pub mod memory;
pub mod operations;
pub mod results;

use async_trait::async_trait;
use bytes::Bytes;
use std::sync::Arc;

use crate::auth::Credentials;
use crate::error::RemoteError;
use crate::path::VirtualPath;

pub use api_client::ApiClient;
pub use azure::{AzureConnector, AzureContainer};
pub use broker::Broker;
pub use direct::DirectStore;
pub use memory::{MemoryConnector, MemoryContainer};
pub use results::{BlobContent, ObjectRecord};

/// Receives the number of bytes transferred so far.
pub type ProgressFn<'a> = dyn Fn(u64) + Send + Sync + 'a;

pub const DEFAULT_CONTENT_TYPE: &str = "application/octet-stream";

/// A single container of a flat key/value object store.
#[async_trait]
pub trait ContainerClient: Send + Sync {
    /// Cheap request proving the container is reachable with these credentials.
    async fn probe(&self) -> Result<(), RemoteError>;

    /// Every object whose key starts with `prefix`, at any depth.
    async fn list_blobs(&self, prefix: &str) -> Result<Vec<ObjectRecord>, RemoteError>;

    /// Create or overwrite an object.
    async fn put_blob(&self, key: &str, data: Bytes, content_type: &str)
    -> Result<(), RemoteError>;

    /// Like [`ContainerClient::put_blob`], reporting progress as bytes land.
    async fn put_blob_with_progress(
        &self,
        key: &str,
        data: Bytes,
        content_type: &str,
        progress: &ProgressFn<'_>,
    ) -> Result<(), RemoteError> {
        let total = data.len() as u64;
        self.put_blob(key, data, content_type).await?;
        progress(total);
        Ok(())
    }

    async fn get_blob(&self, key: &str) -> Result<BlobContent, RemoteError>;

    async fn delete_blob(&self, key: &str) -> Result<(), RemoteError>;

    /// URL from which the object can be fetched directly.
    fn blob_url(&self, key: &str) -> String;
}

/// Turns credentials into a container client.
#[async_trait]
pub trait Connector: Send + Sync {
    /// Build a client without touching the network.
    fn open(&self, credentials: &Credentials) -> Result<Arc<dyn ContainerClient>, RemoteError>;

    /// Build a client and verify the container answers.
    async fn connect(
        &self,
        credentials: &Credentials,
    ) -> Result<Arc<dyn ContainerClient>, RemoteError> {
        let container = self.open(credentials)?;
        container.probe().await?;
        Ok(container)
    }
}

/// Metadata side of the storage service: connect, list, delete, mkdir.
#[async_trait]
pub trait MetadataApi: Send + Sync {
    async fn connect(&self, credentials: &Credentials) -> Result<(), RemoteError>;

    async fn disconnect(&self) -> Result<(), RemoteError> {
        Ok(())
    }

    /// Flat listing of every object under `path`.
    async fn list(&self, path: &VirtualPath) -> Result<Vec<ObjectRecord>, RemoteError>;

    async fn delete(&self, path: &VirtualPath) -> Result<(), RemoteError>;

    /// Make `path` visible as a directory in later listings.
    async fn mkdir(&self, path: &VirtualPath) -> Result<(), RemoteError>;
}

/// Data plane of the storage service: object bytes in and out.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    async fn upload(
        &self,
        credentials: &Credentials,
        key: &VirtualPath,
        data: Bytes,
        content_type: &str,
        progress: &ProgressFn<'_>,
    ) -> Result<(), RemoteError>;

    async fn download(
        &self,
        credentials: &Credentials,
        key: &VirtualPath,
    ) -> Result<BlobContent, RemoteError>;

    fn download_url(&self, credentials: &Credentials, key: &VirtualPath)
    -> Result<String, RemoteError>;
}
