//! In-memory blob store for tests.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use cutroom_models::BlobLocator;

use crate::error::{StorageError, StorageResult};
use crate::store::BlobStore;

/// In-memory [`BlobStore`] implementation.
#[derive(Default)]
pub struct MemBlobStore {
    blobs: RwLock<HashMap<String, Vec<u8>>>,
}

impl MemBlobStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored blobs.
    pub async fn len(&self) -> usize {
        self.blobs.read().await.len()
    }

    /// Whether no blobs are stored.
    pub async fn is_empty(&self) -> bool {
        self.blobs.read().await.is_empty()
    }
}

#[async_trait]
impl BlobStore for MemBlobStore {
    async fn put(
        &self,
        locator: &BlobLocator,
        bytes: Vec<u8>,
        _content_type: &str,
    ) -> StorageResult<()> {
        self.blobs
            .write()
            .await
            .insert(locator.as_str().to_string(), bytes);
        Ok(())
    }

    async fn fetch(&self, locator: &BlobLocator) -> StorageResult<Vec<u8>> {
        self.blobs
            .read()
            .await
            .get(locator.as_str())
            .cloned()
            .ok_or_else(|| StorageError::not_found(locator.as_str()))
    }

    async fn delete(&self, locator: &BlobLocator) -> StorageResult<()> {
        self.blobs.write().await.remove(locator.as_str());
        Ok(())
    }

    async fn exists(&self, locator: &BlobLocator) -> StorageResult<bool> {
        Ok(self.blobs.read().await.contains_key(locator.as_str()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_put_fetch_delete() {
        let store = MemBlobStore::new();
        let locator = BlobLocator::from_string("drafts/c/v/source.mp4");

        store
            .put(&locator, b"mp4 bytes".to_vec(), "video/mp4")
            .await
            .unwrap();
        assert!(store.exists(&locator).await.unwrap());
        assert_eq!(store.fetch(&locator).await.unwrap(), b"mp4 bytes");

        store.delete(&locator).await.unwrap();
        assert!(!store.exists(&locator).await.unwrap());
        assert!(matches!(
            store.fetch(&locator).await,
            Err(StorageError::NotFound(_))
        ));

        // Deleting again is a no-op
        store.delete(&locator).await.unwrap();
    }
}
