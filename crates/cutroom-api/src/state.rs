//! Application state.

use std::sync::Arc;

use cutroom_publish::{HostedPublisher, PublishTarget};
use cutroom_storage::{BlobStore, S3BlobStore};
use cutroom_store::{PgStore, Store};

use crate::auth::AuthKeys;
use crate::config::ApiConfig;
use crate::notify::{notifier_from_env, Notifier};
use crate::services::{InviteService, ReviewService};

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub config: ApiConfig,
    pub store: Arc<dyn Store>,
    pub blobs: Arc<dyn BlobStore>,
    pub auth: Arc<AuthKeys>,
    pub invites: InviteService,
    pub review: ReviewService,
}

impl AppState {
    /// Create state with production collaborators: Postgres, the
    /// S3-compatible bucket, the hosting platform client and whichever
    /// notifier the environment configures.
    pub async fn new(config: ApiConfig) -> Result<Self, Box<dyn std::error::Error>> {
        let store = PgStore::from_env().await?;
        store.migrate().await?;

        let blobs = S3BlobStore::from_env()?;
        let publisher = HostedPublisher::from_env()?;
        let notifier = notifier_from_env()?;

        Ok(Self::with_collaborators(
            config,
            Arc::new(store),
            Arc::new(blobs),
            Arc::new(publisher),
            notifier,
        ))
    }

    /// Create state from explicit collaborators. Tests inject the in-memory
    /// store/blob doubles and a stub publisher here.
    pub fn with_collaborators(
        config: ApiConfig,
        store: Arc<dyn Store>,
        blobs: Arc<dyn BlobStore>,
        publisher: Arc<dyn PublishTarget>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        let auth = Arc::new(AuthKeys::new(
            config.jwt_secret.as_bytes(),
            config.token_ttl,
        ));

        let invites = InviteService::new(
            Arc::clone(&store),
            notifier,
            config.public_base_url.clone(),
        );
        let review = ReviewService::new(
            Arc::clone(&store),
            Arc::clone(&blobs),
            publisher,
            config.publish_timeout,
        );

        Self {
            config,
            store,
            blobs,
            auth,
            invites,
            review,
        }
    }
}
