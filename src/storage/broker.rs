//! Metadata broker
//!
//! Holds the single active container connection and serves listing,
//! deletion, directory creation and proxied transfers against it.

use async_trait::async_trait;
use bytes::Bytes;
use log::info;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::auth::Credentials;
use crate::error::{BrokerError, RemoteError};
use crate::path::VirtualPath;
use crate::storage::operations;
use crate::storage::{BlobContent, Connector, ContainerClient, MetadataApi, ObjectRecord};

pub struct Broker {
    connector: Arc<dyn Connector>,
    directory_marker: String,
    active: RwLock<Option<Arc<dyn ContainerClient>>>,
}

impl Broker {
    pub fn new(connector: Arc<dyn Connector>, directory_marker: impl Into<String>) -> Self {
        Self {
            connector,
            directory_marker: directory_marker.into(),
            active: RwLock::new(None),
        }
    }

    /// Connects to the container named by `credentials`, replacing any
    /// previous connection only on success.
    pub async fn open_connection(&self, credentials: &Credentials) -> Result<(), BrokerError> {
        let container = self.connector.connect(credentials).await?;
        *self.active.write().await = Some(container);
        info!(
            "Connected to container '{}' on account '{}'",
            credentials.container(),
            credentials.account()
        );
        Ok(())
    }

    pub async fn close_connection(&self) {
        if self.active.write().await.take().is_some() {
            info!("Disconnected from container");
        }
    }

    pub async fn is_connected(&self) -> bool {
        self.active.read().await.is_some()
    }

    async fn container(&self) -> Result<Arc<dyn ContainerClient>, BrokerError> {
        self.active
            .read()
            .await
            .clone()
            .ok_or(BrokerError::NotConnected)
    }

    pub async fn list_objects(&self, path: &VirtualPath) -> Result<Vec<ObjectRecord>, BrokerError> {
        let container = self.container().await?;
        operations::list_objects(container.as_ref(), path).await
    }

    pub async fn upload_object(
        &self,
        dir: &VirtualPath,
        filename: &str,
        data: Bytes,
        content_type: &str,
    ) -> Result<VirtualPath, BrokerError> {
        let container = self.container().await?;
        operations::upload_object(container.as_ref(), dir, filename, data, content_type).await
    }

    pub async fn download_object(&self, path: &VirtualPath) -> Result<BlobContent, BrokerError> {
        let container = self.container().await?;
        operations::download_object(container.as_ref(), path).await
    }

    pub async fn delete_path(&self, path: &VirtualPath) -> Result<usize, BrokerError> {
        let container = self.container().await?;
        operations::delete_path(container.as_ref(), path).await
    }

    pub async fn create_directory(&self, path: &VirtualPath) -> Result<VirtualPath, BrokerError> {
        let container = self.container().await?;
        operations::create_directory(container.as_ref(), path, &self.directory_marker).await
    }
}

#[async_trait]
impl MetadataApi for Broker {
    async fn connect(&self, credentials: &Credentials) -> Result<(), RemoteError> {
        Ok(self.open_connection(credentials).await?)
    }

    async fn disconnect(&self) -> Result<(), RemoteError> {
        self.close_connection().await;
        Ok(())
    }

    async fn list(&self, path: &VirtualPath) -> Result<Vec<ObjectRecord>, RemoteError> {
        Ok(self.list_objects(path).await?)
    }

    async fn delete(&self, path: &VirtualPath) -> Result<(), RemoteError> {
        self.delete_path(path).await?;
        Ok(())
    }

    async fn mkdir(&self, path: &VirtualPath) -> Result<(), RemoteError> {
        self.create_directory(path).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{MemoryConnector, MemoryContainer};

    fn broker(container: Arc<MemoryContainer>) -> Broker {
        Broker::new(Arc::new(MemoryConnector::new(container)), ".keep")
    }

    #[tokio::test]
    async fn test_requires_connection() {
        let broker = broker(Arc::new(MemoryContainer::new("box")));
        let err = broker.list_objects(&VirtualPath::root()).await.unwrap_err();
        assert_eq!(err, BrokerError::NotConnected);
        assert_eq!(err.to_string(), "Not connected");
    }

    #[tokio::test]
    async fn test_failed_connect_keeps_previous_connection() {
        let container = Arc::new(MemoryContainer::with_objects("box", [("a.txt", "1")]));
        let broker = broker(container);

        broker
            .open_connection(&Credentials::new("acct", "box", "sv=1").unwrap())
            .await
            .unwrap();
        assert!(
            broker
                .open_connection(&Credentials::new("acct", "missing", "sv=1").unwrap())
                .await
                .is_err()
        );
        assert!(broker.is_connected().await);
        assert_eq!(broker.list_objects(&VirtualPath::root()).await.unwrap().len(), 1);

        broker.close_connection().await;
        assert!(!broker.is_connected().await);
    }
}
