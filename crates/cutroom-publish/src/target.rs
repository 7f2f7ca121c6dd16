//! The publish target trait.

use async_trait::async_trait;

use crate::error::PublishResult;

/// Upload request for the hosting platform.
#[derive(Debug, Clone)]
pub struct PublishRequest {
    /// Video title
    pub title: String,
    /// Video description
    pub description: String,
    /// Source bytes of the approved draft
    pub source: Vec<u8>,
}

impl PublishRequest {
    pub fn new(
        title: impl Into<String>,
        description: impl Into<String>,
        source: Vec<u8>,
    ) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
            source,
        }
    }
}

/// Receipt returned by a successful upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishReceipt {
    /// The platform's ID for the published video
    pub external_id: String,
}

/// The external hosting platform.
///
/// Implementations perform exactly one upload attempt per call; retry
/// policy belongs to the caller. Uploads are not deduplicated here; a
/// caller re-invoking `publish` for the same video is the platform's
/// concern, not this trait's.
#[async_trait]
pub trait PublishTarget: Send + Sync {
    /// Upload a video, returning the platform's ID for it.
    async fn publish(&self, request: PublishRequest) -> PublishResult<PublishReceipt>;
}
