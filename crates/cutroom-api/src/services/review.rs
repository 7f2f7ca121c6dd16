//! Draft submission, review decisions and publication.
//!
//! Approval and publication are two separate steps on purpose: the
//! creator's decision commits first (`pending -> approved`), then the
//! upload to the hosting platform runs. A failed upload leaves the video
//! `approved`, a recoverable state the caller can retry, and never undoes
//! the decision.

use std::sync::Arc;
use std::time::Duration;

use metrics::counter;
use tracing::{info, warn};

use cutroom_models::{AccountId, ReviewStatus, Role, Video, VideoId};
use cutroom_publish::{PublishRequest, PublishTarget};
use cutroom_storage::{draft_locator, BlobStore};
use cutroom_store::Store;

use crate::auth::AuthUser;
use crate::error::{ApiError, ApiResult};
use crate::metrics::names;

/// A draft upload, already read off the wire.
pub struct SubmitDraft {
    pub title: String,
    pub description: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

/// Review and publish operations.
#[derive(Clone)]
pub struct ReviewService {
    store: Arc<dyn Store>,
    blobs: Arc<dyn BlobStore>,
    publisher: Arc<dyn PublishTarget>,
    publish_timeout: Duration,
}

impl ReviewService {
    pub fn new(
        store: Arc<dyn Store>,
        blobs: Arc<dyn BlobStore>,
        publisher: Arc<dyn PublishTarget>,
        publish_timeout: Duration,
    ) -> Self {
        Self {
            store,
            blobs,
            publisher,
            publish_timeout,
        }
    }

    /// Submit a draft. Editors must be bound to a creator through an
    /// accepted invite; creators may submit to themselves.
    ///
    /// The blob is stored before the record so a visible video always has
    /// its source; if the record insert fails the blob is cleaned up again.
    pub async fn submit(&self, uploader: &AuthUser, draft: SubmitDraft) -> ApiResult<Video> {
        if draft.title.trim().is_empty() {
            return Err(ApiError::validation("title must not be empty"));
        }
        if draft.bytes.is_empty() {
            return Err(ApiError::validation("draft file must not be empty"));
        }

        let (creator_id, editor_id) = self.resolve_owner(uploader).await?;

        let video_id = VideoId::new();
        let locator = draft_locator(&creator_id, &video_id);
        self.blobs
            .put(&locator, draft.bytes, &draft.content_type)
            .await?;

        let video = Video::new(
            video_id,
            draft.title.trim(),
            draft.description,
            locator.clone(),
            creator_id,
            editor_id,
        );

        if let Err(e) = self.store.create_video(&video).await {
            if let Err(cleanup) = self.blobs.delete(&locator).await {
                warn!(locator = %locator, error = %cleanup, "Failed to clean up orphaned draft blob");
            }
            return Err(e.into());
        }

        counter!(names::VIDEOS_SUBMITTED_TOTAL).increment(1);
        info!(video_id = %video.id, creator_id = %video.creator_id, "Draft submitted");
        Ok(video)
    }

    /// Pending videos for the calling creator, oldest first.
    pub async fn list_pending(&self, caller: &AuthUser) -> ApiResult<Vec<Video>> {
        caller.require_role(Role::Creator)?;
        Ok(self
            .store
            .list_pending_for_creator(&caller.account_id)
            .await?)
    }

    /// All videos visible to the caller: a creator sees their library, an
    /// editor sees their own uploads.
    pub async fn list_videos(&self, caller: &AuthUser) -> ApiResult<Vec<Video>> {
        match caller.role {
            Role::Creator => Ok(self
                .store
                .list_videos_for_creator(&caller.account_id)
                .await?),
            Role::Editor => Ok(self
                .store
                .list_videos_for_editor(&caller.account_id)
                .await?),
            Role::Admin => Err(ApiError::not_authorized(
                "admins do not have a video library",
            )),
        }
    }

    /// Fetch one video, visible to its creator or its uploader.
    pub async fn get_video(&self, caller: &AuthUser, id: &VideoId) -> ApiResult<Video> {
        let video = self
            .store
            .get_video(id)
            .await?
            .ok_or_else(|| ApiError::not_found(format!("video {}", id)))?;

        let is_owner = video.creator_id == caller.account_id;
        let is_uploader = video.editor_id.as_ref() == Some(&caller.account_id);
        if !is_owner && !is_uploader {
            return Err(ApiError::not_authorized("not your video"));
        }
        Ok(video)
    }

    /// Approve a pending video and immediately push it to the hosting
    /// platform.
    ///
    /// The decision commits first; when the upload then fails the video
    /// stays `approved` and the error tells the caller the approval stuck.
    pub async fn approve(&self, caller: &AuthUser, id: &VideoId) -> ApiResult<Video> {
        let video = self.authorize_decision(caller, id, "approve").await?;

        let approved = self.decide(&video.id, ReviewStatus::Approved, "approve").await?;
        info!(video_id = %approved.id, "Video approved");

        self.run_publication(approved).await
    }

    /// Reject a pending video. Terminal.
    pub async fn reject(&self, caller: &AuthUser, id: &VideoId) -> ApiResult<Video> {
        let video = self.authorize_decision(caller, id, "reject").await?;

        let rejected = self.decide(&video.id, ReviewStatus::Rejected, "reject").await?;
        info!(video_id = %rejected.id, "Video rejected");
        Ok(rejected)
    }

    /// Retry publication of an approved-but-unpublished video.
    ///
    /// Safe to call repeatedly: only the guarded `approved -> uploaded`
    /// commit changes the record, and a concurrent retry that already
    /// committed counts as success.
    pub async fn publish(&self, caller: &AuthUser, id: &VideoId) -> ApiResult<Video> {
        let video = self.authorize_decision(caller, id, "publish").await?;

        if video.status != ReviewStatus::Approved {
            return Err(ApiError::invalid_transition("publish", video.status));
        }

        self.run_publication(video).await
    }

    /// Resolve which creator a submission belongs to.
    async fn resolve_owner(
        &self,
        uploader: &AuthUser,
    ) -> ApiResult<(AccountId, Option<AccountId>)> {
        match uploader.role {
            Role::Creator => Ok((uploader.account_id.clone(), None)),
            Role::Editor => {
                let invite = self
                    .store
                    .find_accepted_invite_for_editor(&uploader.account_id)
                    .await?
                    .ok_or(ApiError::NoAssociatedCreator)?;
                Ok((invite.creator_id, Some(uploader.account_id.clone())))
            }
            Role::Admin => Err(ApiError::not_authorized("admins cannot submit drafts")),
        }
    }

    /// Only the creator recorded on the video decides its fate.
    async fn authorize_decision(
        &self,
        caller: &AuthUser,
        id: &VideoId,
        action: &'static str,
    ) -> ApiResult<Video> {
        let video = self
            .store
            .get_video(id)
            .await?
            .ok_or_else(|| ApiError::not_found(format!("video {}", id)))?;

        if video.creator_id != caller.account_id {
            return Err(ApiError::not_authorized(format!(
                "only the owning creator may {}",
                action
            )));
        }
        Ok(video)
    }

    /// Run the guarded decision, translating a lost race or repeated call
    /// into `InvalidTransition`.
    async fn decide(
        &self,
        id: &VideoId,
        decision: ReviewStatus,
        action: &'static str,
    ) -> ApiResult<Video> {
        match self.store.record_decision(id, decision).await {
            Ok(video) => {
                counter!(names::REVIEW_DECISIONS_TOTAL, "decision" => decision.as_str())
                    .increment(1);
                Ok(video)
            }
            Err(e) if e.is_precondition_failed() => {
                let status = self
                    .store
                    .get_video(id)
                    .await?
                    .map(|v| v.status)
                    .unwrap_or(decision);
                Err(ApiError::invalid_transition(action, status))
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Upload an approved video and commit the result.
    async fn run_publication(&self, video: Video) -> ApiResult<Video> {
        counter!(names::PUBLISH_ATTEMPTS_TOTAL).increment(1);

        let source = match self.blobs.fetch(&video.blob_locator).await {
            Ok(bytes) => bytes,
            Err(e) => {
                warn!(video_id = %video.id, error = %e, "Draft blob unavailable, video stays approved");
                counter!(names::PUBLISH_FAILURES_TOTAL).increment(1);
                return Err(ApiError::publish_failed(e.to_string()));
            }
        };

        let request = PublishRequest::new(&video.title, &video.description, source);
        let receipt = match tokio::time::timeout(
            self.publish_timeout,
            self.publisher.publish(request),
        )
        .await
        {
            Ok(Ok(receipt)) => receipt,
            Ok(Err(e)) => {
                warn!(video_id = %video.id, error = %e, "Publish failed, video stays approved");
                counter!(names::PUBLISH_FAILURES_TOTAL).increment(1);
                return Err(ApiError::publish_failed(e.to_string()));
            }
            Err(_) => {
                warn!(video_id = %video.id, "Publish timed out, video stays approved");
                counter!(names::PUBLISH_FAILURES_TOTAL).increment(1);
                return Err(ApiError::publish_failed(format!(
                    "upload timed out after {}s",
                    self.publish_timeout.as_secs()
                )));
            }
        };

        match self
            .store
            .commit_publication(&video.id, &receipt.external_id)
            .await
        {
            Ok(uploaded) => {
                info!(video_id = %uploaded.id, external_id = %receipt.external_id, "Video published");
                Ok(uploaded)
            }
            Err(e) if e.is_precondition_failed() => {
                // A concurrent retry won the commit. The video is published
                // either way; report the stored record.
                let current = self
                    .store
                    .get_video(&video.id)
                    .await?
                    .ok_or_else(|| ApiError::not_found(format!("video {}", video.id)))?;
                if current.status == ReviewStatus::Uploaded {
                    Ok(current)
                } else {
                    Err(ApiError::invalid_transition("publish", current.status))
                }
            }
            Err(e) => Err(e.into()),
        }
    }
}
