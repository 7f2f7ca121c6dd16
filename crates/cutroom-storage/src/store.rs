//! The blob store trait.

use async_trait::async_trait;

use cutroom_models::BlobLocator;

use crate::error::StorageResult;

/// Byte storage for draft videos.
///
/// Implementations must make a successful `put` durable before returning;
/// the video record referencing the locator is only created afterwards.
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Store a blob under the given locator.
    async fn put(
        &self,
        locator: &BlobLocator,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> StorageResult<()>;

    /// Fetch a blob's bytes.
    async fn fetch(&self, locator: &BlobLocator) -> StorageResult<Vec<u8>>;

    /// Delete a blob. Deleting a missing blob is not an error.
    async fn delete(&self, locator: &BlobLocator) -> StorageResult<()>;

    /// Whether a blob exists.
    async fn exists(&self, locator: &BlobLocator) -> StorageResult<bool>;
}
