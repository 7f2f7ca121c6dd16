//! Postgres store implementation.
//!
//! Status transitions are single-row conditional updates
//! (`... WHERE status = <expected>`), so the database is the arbiter when
//! two requests race: one `UPDATE` matches, the other returns zero rows and
//! surfaces as `PreconditionFailed`.

use std::time::Duration;

use async_trait::async_trait;
use sqlx::postgres::{PgPool, PgPoolOptions, PgRow};
use sqlx::Row;
use tracing::info;

use cutroom_models::{
    Account, AccountId, BlobLocator, Invite, InviteId, InviteStatus, ReviewStatus, Role, Video,
    VideoId,
};

use crate::error::{StoreError, StoreResult};
use crate::store::Store;

/// Postgres unique-violation SQLSTATE.
const UNIQUE_VIOLATION: &str = "23505";

/// Postgres-backed [`Store`].
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    /// Connect to Postgres.
    pub async fn connect(database_url: &str) -> StoreResult<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(10)
            .acquire_timeout(Duration::from_secs(5))
            .connect(database_url)
            .await?;
        Ok(Self { pool })
    }

    /// Connect using the `DATABASE_URL` environment variable.
    pub async fn from_env() -> StoreResult<Self> {
        let url = std::env::var("DATABASE_URL")
            .map_err(|_| StoreError::config_error("DATABASE_URL not set"))?;
        Self::connect(&url).await
    }

    /// Run pending migrations.
    pub async fn migrate(&self) -> StoreResult<()> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        info!("Store migrations applied");
        Ok(())
    }

    /// Access the underlying pool (readiness probes).
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

fn map_unique_violation(err: sqlx::Error, what: &str) -> StoreError {
    if let sqlx::Error::Database(ref db) = err {
        if db.code().as_deref() == Some(UNIQUE_VIOLATION) {
            return StoreError::already_exists(what);
        }
    }
    StoreError::from(err)
}

fn row_to_account(row: &PgRow) -> StoreResult<Account> {
    let role: String = row.try_get("role")?;
    Ok(Account {
        id: AccountId::from_string(row.try_get::<String, _>("id")?),
        email: row.try_get("email")?,
        password_hash: row.try_get("password_hash")?,
        display_name: row.try_get("display_name")?,
        role: Role::parse(&role)
            .ok_or_else(|| StoreError::corrupt(format!("unknown role '{}'", role)))?,
        created_at: row.try_get("created_at")?,
    })
}

fn row_to_invite(row: &PgRow) -> StoreResult<Invite> {
    let status: String = row.try_get("status")?;
    Ok(Invite {
        id: InviteId::from_string(row.try_get::<String, _>("id")?),
        creator_id: AccountId::from_string(row.try_get::<String, _>("creator_id")?),
        editor_email: row.try_get("editor_email")?,
        token: row.try_get("token")?,
        status: InviteStatus::parse(&status)
            .ok_or_else(|| StoreError::corrupt(format!("unknown invite status '{}'", status)))?,
        editor_id: row
            .try_get::<Option<String>, _>("editor_id")?
            .map(AccountId::from_string),
        created_at: row.try_get("created_at")?,
        accepted_at: row.try_get("accepted_at")?,
    })
}

fn row_to_video(row: &PgRow) -> StoreResult<Video> {
    let status: String = row.try_get("status")?;
    Ok(Video {
        id: VideoId::from_string(row.try_get::<String, _>("id")?),
        title: row.try_get("title")?,
        description: row.try_get("description")?,
        blob_locator: BlobLocator::from_string(row.try_get::<String, _>("blob_locator")?),
        creator_id: AccountId::from_string(row.try_get::<String, _>("creator_id")?),
        editor_id: row
            .try_get::<Option<String>, _>("editor_id")?
            .map(AccountId::from_string),
        status: ReviewStatus::parse(&status)
            .ok_or_else(|| StoreError::corrupt(format!("unknown review status '{}'", status)))?,
        external_id: row.try_get("external_id")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
        reviewed_at: row.try_get("reviewed_at")?,
        published_at: row.try_get("published_at")?,
    })
}

#[async_trait]
impl Store for PgStore {
    async fn create_account(&self, account: &Account) -> StoreResult<()> {
        sqlx::query(
            "INSERT INTO accounts (id, email, password_hash, display_name, role, created_at)
             VALUES ($1, $2, $3, $4, $5, $6)",
        )
        .bind(account.id.as_str())
        .bind(&account.email)
        .bind(&account.password_hash)
        .bind(&account.display_name)
        .bind(account.role.as_str())
        .bind(account.created_at)
        .execute(&self.pool)
        .await
        .map_err(|e| map_unique_violation(e, "account email"))?;

        info!(account_id = %account.id, role = %account.role, "Created account");
        Ok(())
    }

    async fn get_account(&self, id: &AccountId) -> StoreResult<Option<Account>> {
        let row = sqlx::query("SELECT * FROM accounts WHERE id = $1")
            .bind(id.as_str())
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref().map(row_to_account).transpose()
    }

    async fn find_account_by_email(
        &self,
        role: Role,
        email: &str,
    ) -> StoreResult<Option<Account>> {
        let row = sqlx::query("SELECT * FROM accounts WHERE role = $1 AND email = $2")
            .bind(role.as_str())
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref().map(row_to_account).transpose()
    }

    async fn create_invite(&self, invite: &Invite) -> StoreResult<()> {
        sqlx::query(
            "INSERT INTO invites (id, creator_id, editor_email, token, status, created_at)
             VALUES ($1, $2, $3, $4, $5, $6)",
        )
        .bind(invite.id.as_str())
        .bind(invite.creator_id.as_str())
        .bind(&invite.editor_email)
        .bind(&invite.token)
        .bind(invite.status.as_str())
        .bind(invite.created_at)
        .execute(&self.pool)
        .await
        .map_err(|e| map_unique_violation(e, "invite token"))?;

        info!(invite_id = %invite.id, creator_id = %invite.creator_id, "Created invite");
        Ok(())
    }

    async fn get_invite_by_token(&self, token: &str) -> StoreResult<Option<Invite>> {
        let row = sqlx::query("SELECT * FROM invites WHERE token = $1")
            .bind(token)
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref().map(row_to_invite).transpose()
    }

    async fn list_invites_for_creator(&self, creator_id: &AccountId) -> StoreResult<Vec<Invite>> {
        let rows =
            sqlx::query("SELECT * FROM invites WHERE creator_id = $1 ORDER BY created_at DESC")
                .bind(creator_id.as_str())
                .fetch_all(&self.pool)
                .await?;
        rows.iter().map(row_to_invite).collect()
    }

    async fn accept_invite(&self, token: &str, editor_id: &AccountId) -> StoreResult<bool> {
        let result = sqlx::query(
            "UPDATE invites
             SET status = 'accepted', editor_id = $2, accepted_at = NOW()
             WHERE token = $1 AND status = 'invited'",
        )
        .bind(token)
        .bind(editor_id.as_str())
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() == 1)
    }

    async fn find_accepted_invite_for_editor(
        &self,
        editor_id: &AccountId,
    ) -> StoreResult<Option<Invite>> {
        let row = sqlx::query(
            "SELECT * FROM invites
             WHERE editor_id = $1 AND status = 'accepted'
             ORDER BY accepted_at DESC
             LIMIT 1",
        )
        .bind(editor_id.as_str())
        .fetch_optional(&self.pool)
        .await?;
        row.as_ref().map(row_to_invite).transpose()
    }

    async fn create_video(&self, video: &Video) -> StoreResult<()> {
        sqlx::query(
            "INSERT INTO videos
                 (id, title, description, blob_locator, creator_id, editor_id,
                  status, created_at, updated_at)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)",
        )
        .bind(video.id.as_str())
        .bind(&video.title)
        .bind(&video.description)
        .bind(video.blob_locator.as_str())
        .bind(video.creator_id.as_str())
        .bind(video.editor_id.as_ref().map(|id| id.as_str().to_string()))
        .bind(video.status.as_str())
        .bind(video.created_at)
        .bind(video.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| map_unique_violation(e, "video id"))?;

        info!(video_id = %video.id, creator_id = %video.creator_id, "Created video record");
        Ok(())
    }

    async fn get_video(&self, id: &VideoId) -> StoreResult<Option<Video>> {
        let row = sqlx::query("SELECT * FROM videos WHERE id = $1")
            .bind(id.as_str())
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref().map(row_to_video).transpose()
    }

    async fn list_pending_for_creator(&self, creator_id: &AccountId) -> StoreResult<Vec<Video>> {
        let rows = sqlx::query(
            "SELECT * FROM videos
             WHERE creator_id = $1 AND status = 'pending'
             ORDER BY created_at ASC",
        )
        .bind(creator_id.as_str())
        .fetch_all(&self.pool)
        .await?;
        rows.iter().map(row_to_video).collect()
    }

    async fn list_videos_for_creator(&self, creator_id: &AccountId) -> StoreResult<Vec<Video>> {
        let rows =
            sqlx::query("SELECT * FROM videos WHERE creator_id = $1 ORDER BY created_at DESC")
                .bind(creator_id.as_str())
                .fetch_all(&self.pool)
                .await?;
        rows.iter().map(row_to_video).collect()
    }

    async fn list_videos_for_editor(&self, editor_id: &AccountId) -> StoreResult<Vec<Video>> {
        let rows =
            sqlx::query("SELECT * FROM videos WHERE editor_id = $1 ORDER BY created_at DESC")
                .bind(editor_id.as_str())
                .fetch_all(&self.pool)
                .await?;
        rows.iter().map(row_to_video).collect()
    }

    async fn record_decision(&self, id: &VideoId, decision: ReviewStatus) -> StoreResult<Video> {
        if !ReviewStatus::Pending.can_transition_to(decision) {
            return Err(StoreError::precondition_failed(format!(
                "{} is not a review decision",
                decision
            )));
        }

        let row = sqlx::query(
            "UPDATE videos
             SET status = $2, reviewed_at = NOW(), updated_at = NOW()
             WHERE id = $1 AND status = 'pending'
             RETURNING *",
        )
        .bind(id.as_str())
        .bind(decision.as_str())
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(ref r) => row_to_video(r),
            None => Err(self.transition_miss(id).await?),
        }
    }

    async fn commit_publication(&self, id: &VideoId, external_id: &str) -> StoreResult<Video> {
        let row = sqlx::query(
            "UPDATE videos
             SET status = 'uploaded', external_id = $2,
                 published_at = NOW(), updated_at = NOW()
             WHERE id = $1 AND status = 'approved'
             RETURNING *",
        )
        .bind(id.as_str())
        .bind(external_id)
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(ref r) => row_to_video(r),
            None => Err(self.transition_miss(id).await?),
        }
    }
}

impl PgStore {
    /// A conditional update matched zero rows: either the video is gone or
    /// the guard failed. Re-read once to report which.
    async fn transition_miss(&self, id: &VideoId) -> StoreResult<StoreError> {
        match self.get_video(id).await? {
            Some(video) => Ok(StoreError::precondition_failed(format!(
                "video {} is {}",
                id, video.status
            ))),
            None => Ok(StoreError::not_found(id.to_string())),
        }
    }
}
