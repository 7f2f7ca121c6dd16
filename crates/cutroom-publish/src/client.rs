//! HTTP client for the hosting platform's upload API.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use serde_json::json;
use tracing::{debug, info};

use crate::error::{PublishError, PublishResult};
use crate::target::{PublishReceipt, PublishRequest, PublishTarget};

/// Configuration for the hosting platform client.
#[derive(Debug, Clone)]
pub struct PublisherConfig {
    /// Platform API base URL
    pub api_base: String,
    /// Bearer token for the channel's upload credential
    pub api_token: String,
    /// Request timeout (covers the whole upload)
    pub timeout: Duration,
}

impl PublisherConfig {
    /// Create config from environment variables.
    pub fn from_env() -> PublishResult<Self> {
        Ok(Self {
            api_base: std::env::var("PUBLISH_API_BASE")
                .map_err(|_| PublishError::config_error("PUBLISH_API_BASE not set"))?,
            api_token: std::env::var("PUBLISH_API_TOKEN")
                .map_err(|_| PublishError::config_error("PUBLISH_API_TOKEN not set"))?,
            timeout: Duration::from_secs(
                std::env::var("PUBLISH_TIMEOUT_SECS")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(120),
            ),
        })
    }
}

/// Upload response from the platform.
#[derive(Debug, Deserialize)]
struct UploadResponse {
    id: String,
}

/// Publisher over the hosting platform's HTTP upload endpoint.
pub struct HostedPublisher {
    http: Client,
    api_base: String,
    api_token: String,
    timeout_secs: u64,
}

impl HostedPublisher {
    /// Create a new publisher from configuration.
    pub fn new(config: PublisherConfig) -> PublishResult<Self> {
        let http = Client::builder()
            .timeout(config.timeout)
            .connect_timeout(Duration::from_secs(10))
            .build()?;

        Ok(Self {
            http,
            api_base: config.api_base.trim_end_matches('/').to_string(),
            api_token: config.api_token,
            timeout_secs: config.timeout.as_secs(),
        })
    }

    /// Create from environment variables.
    pub fn from_env() -> PublishResult<Self> {
        Self::new(PublisherConfig::from_env()?)
    }
}

#[async_trait]
impl PublishTarget for HostedPublisher {
    async fn publish(&self, request: PublishRequest) -> PublishResult<PublishReceipt> {
        let url = format!("{}/upload/videos", self.api_base);
        debug!(title = %request.title, bytes = request.source.len(), "Uploading to platform");

        // Ingest as private; the creator flips visibility on the platform.
        let metadata = json!({
            "title": request.title,
            "description": request.description,
            "visibility": "private",
        });

        let form = Form::new()
            .part(
                "metadata",
                Part::text(metadata.to_string()).mime_str("application/json")?,
            )
            .part(
                "media",
                Part::bytes(request.source).mime_str("video/mp4")?,
            );

        let response = self
            .http
            .post(&url)
            .bearer_auth(&self.api_token)
            .multipart(form)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    PublishError::Timeout(self.timeout_secs)
                } else {
                    PublishError::from(e)
                }
            })?;

        let status = response.status();
        if status.is_success() {
            let body: UploadResponse = response
                .json()
                .await
                .map_err(|e| PublishError::invalid_response(e.to_string()))?;
            info!(external_id = %body.id, "Platform accepted upload");
            return Ok(PublishReceipt {
                external_id: body.id,
            });
        }

        let detail = response.text().await.unwrap_or_default();
        match status {
            StatusCode::TOO_MANY_REQUESTS => Err(PublishError::unavailable(format!(
                "rate limited: {}",
                detail
            ))),
            s if s.is_server_error() => Err(PublishError::unavailable(format!("{}: {}", s, detail))),
            s => Err(PublishError::rejected(format!("{}: {}", s, detail))),
        }
    }
}

#[cfg(test)]
mod tests {
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    fn publisher_for(server: &MockServer) -> HostedPublisher {
        HostedPublisher::new(PublisherConfig {
            api_base: server.uri(),
            api_token: "test-token".into(),
            timeout: Duration::from_secs(5),
        })
        .unwrap()
    }

    fn sample_request() -> PublishRequest {
        PublishRequest::new("Draft 1", "first cut", b"mp4 bytes".to_vec())
    }

    #[tokio::test]
    async fn test_successful_upload_returns_external_id() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/upload/videos"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "id": "yt123"
            })))
            .mount(&server)
            .await;

        let receipt = publisher_for(&server)
            .publish(sample_request())
            .await
            .unwrap();
        assert_eq!(receipt.external_id, "yt123");
    }

    #[tokio::test]
    async fn test_server_error_is_retryable() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/upload/videos"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let err = publisher_for(&server)
            .publish(sample_request())
            .await
            .unwrap_err();
        assert!(matches!(err, PublishError::Unavailable(_)));
        assert!(err.is_retryable());
    }

    #[tokio::test]
    async fn test_client_error_is_not_retryable() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/upload/videos"))
            .respond_with(ResponseTemplate::new(400).set_body_string("bad metadata"))
            .mount(&server)
            .await;

        let err = publisher_for(&server)
            .publish(sample_request())
            .await
            .unwrap_err();
        assert!(matches!(err, PublishError::Rejected(_)));
        assert!(!err.is_retryable());
    }

    #[tokio::test]
    async fn test_malformed_body_is_invalid_response() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/upload/videos"))
            .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
            .mount(&server)
            .await;

        let err = publisher_for(&server)
            .publish(sample_request())
            .await
            .unwrap_err();
        assert!(matches!(err, PublishError::InvalidResponse(_)));
    }
}
