//! Storage operations
//!
//! Directory-shaped operations over a flat container: list, upload, download,
//! delete and create-directory.

use bytes::Bytes;
use log::{error, info};

use crate::error::{BrokerError, RemoteErrorKind};
use crate::path::{VirtualPath, join};
use crate::storage::{BlobContent, ContainerClient, ObjectRecord};

/// Lists every object stored under `path` (all of them for the root).
pub async fn list_objects(
    container: &dyn ContainerClient,
    path: &VirtualPath,
) -> Result<Vec<ObjectRecord>, BrokerError> {
    let prefix = path.list_prefix();
    let records = container.list_blobs(&prefix).await.map_err(|e| {
        error!("Failed to list '{}': {}", path, e);
        BrokerError::Remote(e)
    })?;

    info!("Listed '{}' - {} objects", path, records.len());
    Ok(records)
}

/// Stores `data` as `filename` inside `dir` and returns the new key.
pub async fn upload_object(
    container: &dyn ContainerClient,
    dir: &VirtualPath,
    filename: &str,
    data: Bytes,
    content_type: &str,
) -> Result<VirtualPath, BrokerError> {
    let key = join(dir, filename).map_err(|e| BrokerError::InvalidPath(e.to_string()))?;
    let size = data.len();

    container
        .put_blob(key.as_str(), data, content_type)
        .await
        .map_err(|e| {
            error!("Failed to upload '{}': {}", key, e);
            BrokerError::Remote(e)
        })?;

    info!("Uploaded '{}' ({} bytes, {})", key, size, content_type);
    Ok(key)
}

/// Fetches the object stored at `path`.
pub async fn download_object(
    container: &dyn ContainerClient,
    path: &VirtualPath,
) -> Result<BlobContent, BrokerError> {
    if path.is_root() {
        return Err(BrokerError::InvalidPath("Empty path".into()));
    }

    let content = container.get_blob(path.as_str()).await.map_err(|e| {
        error!("Failed to download '{}': {}", path, e);
        BrokerError::Remote(e)
    })?;

    info!("Downloaded '{}' ({} bytes)", path, content.data.len());
    Ok(content)
}

/// Deletes the object at `path`, or every object under it when `path` is a
/// pseudo-directory.
pub async fn delete_path(
    container: &dyn ContainerClient,
    path: &VirtualPath,
) -> Result<usize, BrokerError> {
    if path.is_root() {
        return Err(BrokerError::InvalidPath("Refusing to delete the container root".into()));
    }

    let children = container.list_blobs(&path.list_prefix()).await?;
    if children.is_empty() {
        container.delete_blob(path.as_str()).await.map_err(|e| {
            error!("Failed to delete '{}': {}", path, e);
            BrokerError::Remote(e)
        })?;
        info!("Deleted object '{}'", path);
        return Ok(1);
    }

    for child in &children {
        container.delete_blob(&child.key).await.map_err(|e| {
            error!("Failed to delete '{}' under '{}': {}", child.key, path, e);
            BrokerError::Remote(e)
        })?;
    }

    // A same-named object next to the directory is shadowed in listings; drop it too.
    match container.delete_blob(path.as_str()).await {
        Ok(()) => {}
        Err(e) if e.kind() == RemoteErrorKind::NotFound => {}
        Err(e) => return Err(BrokerError::Remote(e)),
    }

    info!("Deleted directory '{}' ({} objects)", path, children.len());
    Ok(children.len())
}

/// Makes `path` visible as a directory by storing a zero-byte marker inside it.
pub async fn create_directory(
    container: &dyn ContainerClient,
    path: &VirtualPath,
    marker: &str,
) -> Result<VirtualPath, BrokerError> {
    if path.is_root() {
        return Err(BrokerError::InvalidPath("Empty directory name".into()));
    }

    let marker_key = join(path, marker).map_err(|e| BrokerError::InvalidPath(e.to_string()))?;
    container
        .put_blob(marker_key.as_str(), Bytes::new(), super::DEFAULT_CONTENT_TYPE)
        .await
        .map_err(|e| {
            error!("Failed to create directory '{}': {}", path, e);
            BrokerError::Remote(e)
        })?;

    info!("Created directory '{}'", path);
    Ok(marker_key)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::path::normalize;
    use crate::storage::MemoryContainer;

    fn container() -> MemoryContainer {
        MemoryContainer::with_objects(
            "box",
            [
                ("a/b.txt", "0123456789"),
                ("a/c/d.txt", "hello"),
                ("e.txt", "twenty bytes of text"),
            ],
        )
    }

    #[tokio::test]
    async fn test_list_objects_uses_directory_prefix() {
        let container = container();
        let records = list_objects(&container, &normalize("a")).await.unwrap();
        let keys: Vec<&str> = records.iter().map(|r| r.key.as_str()).collect();
        assert_eq!(keys, vec!["a/b.txt", "a/c/d.txt"]);

        let all = list_objects(&container, &VirtualPath::root()).await.unwrap();
        assert_eq!(all.len(), 3);
    }

    #[tokio::test]
    async fn test_delete_single_object() {
        let container = container();
        let removed = delete_path(&container, &normalize("e.txt")).await.unwrap();
        assert_eq!(removed, 1);
        assert!(!container.contains("e.txt"));
    }

    #[tokio::test]
    async fn test_delete_directory_removes_subtree() {
        let container = container();
        let removed = delete_path(&container, &normalize("a")).await.unwrap();
        assert_eq!(removed, 2);
        assert_eq!(container.keys(), vec!["e.txt".to_string()]);
    }

    #[tokio::test]
    async fn test_delete_missing_object_is_not_found() {
        let container = container();
        let err = delete_path(&container, &normalize("nope.txt")).await.unwrap_err();
        match err {
            BrokerError::Remote(e) => assert_eq!(e.kind(), RemoteErrorKind::NotFound),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_create_directory_writes_marker() {
        let container = container();
        let marker = create_directory(&container, &normalize("new/dir"), ".keep")
            .await
            .unwrap();
        assert_eq!(marker.as_str(), "new/dir/.keep");
        assert!(container.contains("new/dir/.keep"));
    }

    #[tokio::test]
    async fn test_upload_object_rejects_nested_filename() {
        let container = container();
        let err = upload_object(&container, &VirtualPath::root(), "x/y", Bytes::new(), "text/plain")
            .await
            .unwrap_err();
        assert!(matches!(err, BrokerError::InvalidPath(_)));
    }
}
