//! The store trait.

use async_trait::async_trait;

use cutroom_models::{Account, AccountId, Invite, ReviewStatus, Role, Video, VideoId};

use crate::error::StoreResult;

/// Persistence operations for accounts, invites and videos.
///
/// Handed to services as an `Arc<dyn Store>` so the core logic never touches
/// a global connection and tests can substitute [`crate::MemStore`].
///
/// Mutations that change a status are compare-and-set: they only commit when
/// the record is still in the expected prior status, and fail with
/// `PreconditionFailed` (or report a lost race) otherwise. Every operation
/// reads current state fresh; implementations must not cache entities.
#[async_trait]
pub trait Store: Send + Sync {
    // ------------------------------------------------------------------
    // Accounts
    // ------------------------------------------------------------------

    /// Insert a new account. Fails with `AlreadyExists` when an account with
    /// the same role and email is already present.
    async fn create_account(&self, account: &Account) -> StoreResult<()>;

    /// Fetch an account by ID.
    async fn get_account(&self, id: &AccountId) -> StoreResult<Option<Account>>;

    /// Look up an account by role and normalized email.
    async fn find_account_by_email(&self, role: Role, email: &str)
        -> StoreResult<Option<Account>>;

    // ------------------------------------------------------------------
    // Invites
    // ------------------------------------------------------------------

    /// Insert a new invite. The token must be unique.
    async fn create_invite(&self, invite: &Invite) -> StoreResult<()>;

    /// Look up an invite by its token, regardless of status.
    async fn get_invite_by_token(&self, token: &str) -> StoreResult<Option<Invite>>;

    /// All invites owned by a creator, newest first.
    async fn list_invites_for_creator(&self, creator_id: &AccountId) -> StoreResult<Vec<Invite>>;

    /// Compare-and-set acceptance: transition the invite with this token
    /// from `invited` to `accepted` and bind `editor_id`.
    ///
    /// Returns `Ok(true)` when this call performed the transition, and
    /// `Ok(false)` when no open invite with this token exists (unknown
    /// token, or a concurrent acceptance already won).
    async fn accept_invite(&self, token: &str, editor_id: &AccountId) -> StoreResult<bool>;

    /// The most recently accepted invite binding this editor to a creator.
    async fn find_accepted_invite_for_editor(
        &self,
        editor_id: &AccountId,
    ) -> StoreResult<Option<Invite>>;

    // ------------------------------------------------------------------
    // Videos
    // ------------------------------------------------------------------

    /// Insert a new video record.
    async fn create_video(&self, video: &Video) -> StoreResult<()>;

    /// Fetch a video by ID.
    async fn get_video(&self, id: &VideoId) -> StoreResult<Option<Video>>;

    /// Pending videos awaiting a creator's decision, oldest first.
    async fn list_pending_for_creator(&self, creator_id: &AccountId) -> StoreResult<Vec<Video>>;

    /// All videos owned by a creator, newest first.
    async fn list_videos_for_creator(&self, creator_id: &AccountId) -> StoreResult<Vec<Video>>;

    /// All videos uploaded by an editor, newest first.
    async fn list_videos_for_editor(&self, editor_id: &AccountId) -> StoreResult<Vec<Video>>;

    /// Compare-and-set review decision: move a `pending` video to
    /// `approved` or `rejected`, stamping `reviewed_at`.
    ///
    /// Fails with `NotFound` when the video does not exist and with
    /// `PreconditionFailed` when its status is no longer `pending`.
    /// Returns the updated record.
    async fn record_decision(&self, id: &VideoId, decision: ReviewStatus) -> StoreResult<Video>;

    /// Compare-and-set publication commit: move an `approved` video to
    /// `uploaded`, setting the hosting platform ID and `published_at`.
    ///
    /// Fails with `NotFound` / `PreconditionFailed` like
    /// [`Store::record_decision`]. Returns the updated record.
    async fn commit_publication(&self, id: &VideoId, external_id: &str) -> StoreResult<Video>;
}
