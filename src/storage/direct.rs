//! Direct data plane
//!
//! Moves object bytes straight between the caller and the container,
//! bypassing the broker.

use async_trait::async_trait;
use bytes::Bytes;
use log::{debug, info};
use std::sync::Arc;

use crate::auth::Credentials;
use crate::error::RemoteError;
use crate::path::VirtualPath;
use crate::storage::{BlobContent, Connector, ObjectStore, ProgressFn};

/// [`ObjectStore`] over any [`Connector`].
pub struct DirectStore {
    connector: Arc<dyn Connector>,
}

impl DirectStore {
    pub fn new(connector: Arc<dyn Connector>) -> Self {
        Self { connector }
    }
}

#[async_trait]
impl ObjectStore for DirectStore {
    async fn upload(
        &self,
        credentials: &Credentials,
        key: &VirtualPath,
        data: Bytes,
        content_type: &str,
        progress: &ProgressFn<'_>,
    ) -> Result<(), RemoteError> {
        let container = self.connector.open(credentials)?;
        let size = data.len();
        debug!("Uploading '{}' ({} bytes) directly", key, size);

        container
            .put_blob_with_progress(key.as_str(), data, content_type, progress)
            .await?;

        info!("Uploaded '{}' ({} bytes)", key, size);
        Ok(())
    }

    async fn download(
        &self,
        credentials: &Credentials,
        key: &VirtualPath,
    ) -> Result<BlobContent, RemoteError> {
        let container = self.connector.open(credentials)?;
        container.get_blob(key.as_str()).await
    }

    fn download_url(
        &self,
        credentials: &Credentials,
        key: &VirtualPath,
    ) -> Result<String, RemoteError> {
        let container = self.connector.open(credentials)?;
        Ok(container.blob_url(key.as_str()))
    }
}
