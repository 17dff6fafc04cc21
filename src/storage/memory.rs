//! In-memory container for testing
//!
//! Provides an ephemeral flat key store with failure injection, so sessions
//! and the broker can be exercised without network access.

use async_trait::async_trait;
use bytes::Bytes;
use std::collections::{BTreeMap, HashSet};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, RwLock};

use crate::auth::Credentials;
use crate::error::RemoteError;
use crate::storage::{BlobContent, Connector, ContainerClient, DEFAULT_CONTENT_TYPE, ObjectRecord};

#[derive(Clone, Debug)]
struct StoredObject {
    data: Bytes,
    content_type: String,
}

/// In-memory container
///
/// Keys are kept sorted, matching the lexicographic order of real listings.
pub struct MemoryContainer {
    name: String,
    objects: RwLock<BTreeMap<String, StoredObject>>,
    failing_keys: RwLock<HashSet<String>>,
    fail_listings: AtomicBool,
}

fn poisoned() -> RemoteError {
    RemoteError::transport("Lock poisoned")
}

impl MemoryContainer {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            objects: RwLock::new(BTreeMap::new()),
            failing_keys: RwLock::new(HashSet::new()),
            fail_listings: AtomicBool::new(false),
        }
    }

    /// Create with initial objects
    pub fn with_objects<K, V>(name: &str, objects: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: AsRef<[u8]>,
    {
        let container = Self::new(name);
        for (key, data) in objects {
            container.insert(key, data.as_ref());
        }
        container
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Store an object directly, bypassing failure injection.
    pub fn insert(&self, key: impl Into<String>, data: &[u8]) {
        if let Ok(mut objects) = self.objects.write() {
            objects.insert(
                key.into(),
                StoredObject {
                    data: Bytes::copy_from_slice(data),
                    content_type: DEFAULT_CONTENT_TYPE.to_string(),
                },
            );
        }
    }

    pub fn contains(&self, key: &str) -> bool {
        self.objects
            .read()
            .map(|objects| objects.contains_key(key))
            .unwrap_or(false)
    }

    /// All stored keys, sorted.
    pub fn keys(&self) -> Vec<String> {
        self.objects
            .read()
            .map(|objects| objects.keys().cloned().collect())
            .unwrap_or_default()
    }

    pub fn content_type_of(&self, key: &str) -> Option<String> {
        self.objects
            .read()
            .ok()
            .and_then(|objects| objects.get(key).map(|o| o.content_type.clone()))
    }

    /// Make every later upload to `key` fail.
    pub fn fail_uploads_to(&self, key: impl Into<String>) {
        if let Ok(mut failing) = self.failing_keys.write() {
            failing.insert(key.into());
        }
    }

    /// Make listings fail (or succeed again).
    pub fn fail_listings(&self, fail: bool) {
        self.fail_listings.store(fail, Ordering::SeqCst);
    }
}

#[async_trait]
impl ContainerClient for MemoryContainer {
    async fn probe(&self) -> Result<(), RemoteError> {
        if self.fail_listings.load(Ordering::SeqCst) {
            return Err(RemoteError::transport("Simulated listing failure"));
        }
        Ok(())
    }

    async fn list_blobs(&self, prefix: &str) -> Result<Vec<ObjectRecord>, RemoteError> {
        if self.fail_listings.load(Ordering::SeqCst) {
            return Err(RemoteError::transport("Simulated listing failure"));
        }

        let objects = self.objects.read().map_err(|_| poisoned())?;
        Ok(objects
            .iter()
            .filter(|(key, _)| key.starts_with(prefix))
            .map(|(key, object)| ObjectRecord {
                key: key.clone(),
                size: object.data.len() as u64,
                content_type: Some(object.content_type.clone()),
                last_modified: None,
            })
            .collect())
    }

    async fn put_blob(&self, key: &str, data: Bytes, content_type: &str) -> Result<(), RemoteError> {
        let failing = self.failing_keys.read().map_err(|_| poisoned())?;
        if failing.contains(key) {
            return Err(RemoteError::transport(format!(
                "Simulated network failure uploading {}",
                key
            )));
        }
        drop(failing);

        let mut objects = self.objects.write().map_err(|_| poisoned())?;
        objects.insert(
            key.to_string(),
            StoredObject {
                data,
                content_type: content_type.to_string(),
            },
        );
        Ok(())
    }

    async fn get_blob(&self, key: &str) -> Result<BlobContent, RemoteError> {
        let objects = self.objects.read().map_err(|_| poisoned())?;
        match objects.get(key) {
            Some(object) => Ok(BlobContent {
                data: object.data.clone(),
                content_type: object.content_type.clone(),
            }),
            None => Err(RemoteError::not_found(format!(
                "BlobNotFound: The specified blob does not exist. ({})",
                key
            ))),
        }
    }

    async fn delete_blob(&self, key: &str) -> Result<(), RemoteError> {
        let mut objects = self.objects.write().map_err(|_| poisoned())?;
        match objects.remove(key) {
            Some(_) => Ok(()),
            None => Err(RemoteError::not_found(format!(
                "BlobNotFound: The specified blob does not exist. ({})",
                key
            ))),
        }
    }

    fn blob_url(&self, key: &str) -> String {
        format!("memory://{}/{}", self.name, key)
    }
}

/// Connector handing out one shared [`MemoryContainer`].
pub struct MemoryConnector {
    container: Arc<MemoryContainer>,
    rejection: Option<String>,
}

impl MemoryConnector {
    pub fn new(container: Arc<MemoryContainer>) -> Self {
        Self {
            container,
            rejection: None,
        }
    }

    /// A connector that refuses every connection with `detail`.
    pub fn rejecting(container: Arc<MemoryContainer>, detail: impl Into<String>) -> Self {
        Self {
            container,
            rejection: Some(detail.into()),
        }
    }
}

#[async_trait]
impl Connector for MemoryConnector {
    fn open(&self, credentials: &Credentials) -> Result<Arc<dyn ContainerClient>, RemoteError> {
        if let Some(detail) = &self.rejection {
            return Err(RemoteError::rejected(detail.clone()));
        }
        if credentials.container() != self.container.name() {
            return Err(RemoteError::rejected(
                "ContainerNotFound: The specified container does not exist.",
            ));
        }
        Ok(self.container.clone())
    }
}
