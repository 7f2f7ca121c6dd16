//! API error types.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use cutroom_models::ReviewStatus;
use serde::Serialize;
use thiserror::Error;

pub type ApiResult<T> = Result<T, ApiError>;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Not authorized: {0}")]
    NotAuthorized(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invite not found or no longer open")]
    InviteNotFound,

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Cannot {action} a video that is {status}")]
    InvalidTransition {
        action: &'static str,
        status: ReviewStatus,
    },

    #[error("No associated creator: accept a creator's invite before submitting drafts")]
    NoAssociatedCreator,

    #[error("Video approved but not yet published: {0}")]
    PublishFailed(String),

    #[error("Rate limited")]
    RateLimited,

    #[error("Internal error: {0}")]
    Internal(String),

    #[error("Store error: {0}")]
    Store(cutroom_store::StoreError),

    #[error("Storage error: {0}")]
    Storage(#[from] cutroom_storage::StorageError),
}

impl ApiError {
    pub fn unauthorized(msg: impl Into<String>) -> Self {
        Self::Unauthorized(msg.into())
    }

    pub fn not_authorized(msg: impl Into<String>) -> Self {
        Self::NotAuthorized(msg.into())
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    pub fn bad_request(msg: impl Into<String>) -> Self {
        Self::BadRequest(msg.into())
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    pub fn invalid_transition(action: &'static str, status: ReviewStatus) -> Self {
        Self::InvalidTransition { action, status }
    }

    pub fn publish_failed(msg: impl Into<String>) -> Self {
        Self::PublishFailed(msg.into())
    }

    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::NotAuthorized(_) => StatusCode::FORBIDDEN,
            ApiError::NotFound(_) | ApiError::InviteNotFound => StatusCode::NOT_FOUND,
            ApiError::BadRequest(_) | ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::Conflict(_) | ApiError::InvalidTransition { .. } => StatusCode::CONFLICT,
            ApiError::NoAssociatedCreator => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::PublishFailed(_) => StatusCode::BAD_GATEWAY,
            ApiError::RateLimited => StatusCode::TOO_MANY_REQUESTS,
            ApiError::Internal(_) | ApiError::Store(_) | ApiError::Storage(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Stable machine-readable code so callers can tell "your request was
    /// illegal" from "a dependency is temporarily down".
    fn code(&self) -> Option<&'static str> {
        match self {
            ApiError::InviteNotFound => Some("invite_not_found"),
            ApiError::InvalidTransition { .. } => Some("invalid_transition"),
            ApiError::NoAssociatedCreator => Some("no_associated_creator"),
            ApiError::PublishFailed(_) => Some("approved_unpublished"),
            ApiError::Store(_) | ApiError::Storage(_) => Some("dependency_unavailable"),
            _ => None,
        }
    }
}

impl From<cutroom_store::StoreError> for ApiError {
    fn from(err: cutroom_store::StoreError) -> Self {
        use cutroom_store::StoreError;
        match err {
            StoreError::NotFound(what) => ApiError::NotFound(what),
            StoreError::AlreadyExists(what) => ApiError::Conflict(format!("{} already exists", what)),
            other => ApiError::Store(other),
        }
    }
}

#[derive(Serialize)]
struct ErrorResponse {
    detail: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    code: Option<&'static str>,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        // Don't expose internal error details in production
        let detail = match &self {
            ApiError::Internal(_) | ApiError::Store(_) | ApiError::Storage(_) => {
                if std::env::var("ENVIRONMENT").unwrap_or_default() == "production" {
                    "An internal error occurred".to_string()
                } else {
                    self.to_string()
                }
            }
            _ => self.to_string(),
        };

        let body = ErrorResponse {
            detail,
            code: self.code(),
        };

        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            ApiError::InviteNotFound.status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            ApiError::invalid_transition("approve", ReviewStatus::Rejected).status_code(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            ApiError::NoAssociatedCreator.status_code(),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(
            ApiError::publish_failed("platform down").status_code(),
            StatusCode::BAD_GATEWAY
        );
    }

    #[test]
    fn test_publish_failure_carries_code() {
        assert_eq!(
            ApiError::publish_failed("x").code(),
            Some("approved_unpublished")
        );
        assert_eq!(ApiError::unauthorized("x").code(), None);
    }
}
