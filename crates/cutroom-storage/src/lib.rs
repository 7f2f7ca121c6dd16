//! Draft blob storage for the CutRoom backend.
//!
//! Draft video files live in an S3-compatible bucket (R2, minio or S3
//! proper), addressed by opaque [`BlobLocator`] keys. The [`BlobStore`]
//! trait is the boundary the services program against; [`MemBlobStore`]
//! stands in for tests.

pub mod client;
pub mod error;
pub mod keys;
pub mod memory;
pub mod store;

pub use client::{S3BlobStore, S3Config};
pub use cutroom_models::BlobLocator;
pub use error::{StorageError, StorageResult};
pub use keys::draft_locator;
pub use memory::MemBlobStore;
pub use store::BlobStore;
