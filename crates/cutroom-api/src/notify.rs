//! Outbound invite notification.
//!
//! Delivery is best-effort: `InviteService` logs a failed send and keeps
//! going, because the invite link is returned to the creator either way.

use async_trait::async_trait;
use reqwest::Client;
use serde_json::json;
use thiserror::Error;
use tracing::{debug, info};

/// Notification error.
#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("Failed to send notification: {0}")]
    SendFailed(String),

    #[error("Invalid notifier configuration: {0}")]
    InvalidConfig(String),
}

/// Outbound notification channel for invite links.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Send an invite link to a prospective editor.
    async fn send_invite(
        &self,
        to: &str,
        link: &str,
        creator_name: &str,
    ) -> Result<(), NotifyError>;
}

/// Notifier over an HTTP email API.
pub struct HttpEmailNotifier {
    http: Client,
    api_base: String,
    api_key: String,
    from_address: String,
}

impl HttpEmailNotifier {
    pub fn new(api_base: impl Into<String>, api_key: impl Into<String>, from_address: impl Into<String>) -> Result<Self, NotifyError> {
        let http = Client::builder()
            .timeout(std::time::Duration::from_secs(10))
            .build()
            .map_err(|e| NotifyError::InvalidConfig(e.to_string()))?;

        Ok(Self {
            http,
            api_base: api_base.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            from_address: from_address.into(),
        })
    }
}

#[async_trait]
impl Notifier for HttpEmailNotifier {
    async fn send_invite(
        &self,
        to: &str,
        link: &str,
        creator_name: &str,
    ) -> Result<(), NotifyError> {
        let body = json!({
            "from": self.from_address,
            "to": [to],
            "subject": format!("{} invited you to edit their videos", creator_name),
            "text": format!(
                "{} wants you to edit for them on CutRoom.\n\nJoin here: {}\n",
                creator_name, link
            ),
        });

        let response = self
            .http
            .post(format!("{}/emails", self.api_base))
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| NotifyError::SendFailed(e.to_string()))?;

        if !response.status().is_success() {
            return Err(NotifyError::SendFailed(format!(
                "mail API returned {}",
                response.status()
            )));
        }

        info!(to = %to, "Sent invite email");
        Ok(())
    }
}

/// Notifier that only logs. Used in development and tests.
#[derive(Default)]
pub struct NoopNotifier;

#[async_trait]
impl Notifier for NoopNotifier {
    async fn send_invite(
        &self,
        to: &str,
        link: &str,
        _creator_name: &str,
    ) -> Result<(), NotifyError> {
        debug!(to = %to, link = %link, "Invite email suppressed (no notifier configured)");
        Ok(())
    }
}

/// Build a notifier from the environment: the HTTP provider when mail API
/// credentials are present, the no-op one otherwise.
pub fn notifier_from_env() -> Result<std::sync::Arc<dyn Notifier>, NotifyError> {
    match (std::env::var("MAIL_API_BASE"), std::env::var("MAIL_API_KEY")) {
        (Ok(base), Ok(key)) => {
            let from = std::env::var("MAIL_FROM_ADDRESS")
                .unwrap_or_else(|_| "invites@cutroom.app".to_string());
            Ok(std::sync::Arc::new(HttpEmailNotifier::new(base, key, from)?))
        }
        _ => Ok(std::sync::Arc::new(NoopNotifier)),
    }
}
