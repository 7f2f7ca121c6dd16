//! Publish error types.

use thiserror::Error;

/// Result type for publish operations.
pub type PublishResult<T> = Result<T, PublishError>;

/// Errors that can occur while uploading to the hosting platform.
#[derive(Debug, Error)]
pub enum PublishError {
    #[error("Failed to configure publisher: {0}")]
    ConfigError(String),

    #[error("Upload rejected by platform: {0}")]
    Rejected(String),

    #[error("Platform unavailable: {0}")]
    Unavailable(String),

    #[error("Upload timed out after {0}s")]
    Timeout(u64),

    #[error("Invalid platform response: {0}")]
    InvalidResponse(String),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),
}

impl PublishError {
    pub fn config_error(msg: impl Into<String>) -> Self {
        Self::ConfigError(msg.into())
    }

    pub fn rejected(msg: impl Into<String>) -> Self {
        Self::Rejected(msg.into())
    }

    pub fn unavailable(msg: impl Into<String>) -> Self {
        Self::Unavailable(msg.into())
    }

    pub fn invalid_response(msg: impl Into<String>) -> Self {
        Self::InvalidResponse(msg.into())
    }

    /// True when a later retry of the same upload can reasonably succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            PublishError::Unavailable(_) | PublishError::Timeout(_) | PublishError::Network(_)
        )
    }
}
