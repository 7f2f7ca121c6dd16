//! In-memory store.
//!
//! Backs tests and local development. All mutations take the write lock, so
//! the compare-and-set guarantees match the Postgres implementation.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use cutroom_models::{Account, AccountId, Invite, ReviewStatus, Role, Video, VideoId};

use crate::error::{StoreError, StoreResult};
use crate::store::Store;

#[derive(Default)]
struct Tables {
    accounts: HashMap<AccountId, Account>,
    invites: HashMap<String, Invite>,
    videos: HashMap<VideoId, Video>,
}

/// In-memory [`Store`] implementation.
#[derive(Default)]
pub struct MemStore {
    tables: RwLock<Tables>,
}

impl MemStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Store for MemStore {
    async fn create_account(&self, account: &Account) -> StoreResult<()> {
        let mut tables = self.tables.write().await;
        let duplicate = tables
            .accounts
            .values()
            .any(|a| a.role == account.role && a.email == account.email);
        if duplicate {
            return Err(StoreError::already_exists(format!(
                "{} account for {}",
                account.role, account.email
            )));
        }
        tables.accounts.insert(account.id.clone(), account.clone());
        Ok(())
    }

    async fn get_account(&self, id: &AccountId) -> StoreResult<Option<Account>> {
        Ok(self.tables.read().await.accounts.get(id).cloned())
    }

    async fn find_account_by_email(
        &self,
        role: Role,
        email: &str,
    ) -> StoreResult<Option<Account>> {
        Ok(self
            .tables
            .read()
            .await
            .accounts
            .values()
            .find(|a| a.role == role && a.email == email)
            .cloned())
    }

    async fn create_invite(&self, invite: &Invite) -> StoreResult<()> {
        let mut tables = self.tables.write().await;
        if tables.invites.contains_key(&invite.token) {
            return Err(StoreError::already_exists("invite token"));
        }
        tables.invites.insert(invite.token.clone(), invite.clone());
        Ok(())
    }

    async fn get_invite_by_token(&self, token: &str) -> StoreResult<Option<Invite>> {
        Ok(self.tables.read().await.invites.get(token).cloned())
    }

    async fn list_invites_for_creator(&self, creator_id: &AccountId) -> StoreResult<Vec<Invite>> {
        let tables = self.tables.read().await;
        let mut invites: Vec<Invite> = tables
            .invites
            .values()
            .filter(|i| &i.creator_id == creator_id)
            .cloned()
            .collect();
        invites.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(invites)
    }

    async fn accept_invite(&self, token: &str, editor_id: &AccountId) -> StoreResult<bool> {
        let mut tables = self.tables.write().await;
        match tables.invites.get_mut(token) {
            Some(invite) if invite.is_open() => {
                invite.accept(editor_id.clone());
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn find_accepted_invite_for_editor(
        &self,
        editor_id: &AccountId,
    ) -> StoreResult<Option<Invite>> {
        let tables = self.tables.read().await;
        let mut accepted: Vec<&Invite> = tables
            .invites
            .values()
            .filter(|i| i.editor_id.as_ref() == Some(editor_id))
            .collect();
        accepted.sort_by(|a, b| b.accepted_at.cmp(&a.accepted_at));
        Ok(accepted.first().map(|i| (*i).clone()))
    }

    async fn create_video(&self, video: &Video) -> StoreResult<()> {
        let mut tables = self.tables.write().await;
        if tables.videos.contains_key(&video.id) {
            return Err(StoreError::already_exists(video.id.to_string()));
        }
        tables.videos.insert(video.id.clone(), video.clone());
        Ok(())
    }

    async fn get_video(&self, id: &VideoId) -> StoreResult<Option<Video>> {
        Ok(self.tables.read().await.videos.get(id).cloned())
    }

    async fn list_pending_for_creator(&self, creator_id: &AccountId) -> StoreResult<Vec<Video>> {
        let tables = self.tables.read().await;
        let mut videos: Vec<Video> = tables
            .videos
            .values()
            .filter(|v| &v.creator_id == creator_id && v.status == ReviewStatus::Pending)
            .cloned()
            .collect();
        videos.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        Ok(videos)
    }

    async fn list_videos_for_creator(&self, creator_id: &AccountId) -> StoreResult<Vec<Video>> {
        let tables = self.tables.read().await;
        let mut videos: Vec<Video> = tables
            .videos
            .values()
            .filter(|v| &v.creator_id == creator_id)
            .cloned()
            .collect();
        videos.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(videos)
    }

    async fn list_videos_for_editor(&self, editor_id: &AccountId) -> StoreResult<Vec<Video>> {
        let tables = self.tables.read().await;
        let mut videos: Vec<Video> = tables
            .videos
            .values()
            .filter(|v| v.editor_id.as_ref() == Some(editor_id))
            .cloned()
            .collect();
        videos.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(videos)
    }

    async fn record_decision(&self, id: &VideoId, decision: ReviewStatus) -> StoreResult<Video> {
        if !ReviewStatus::Pending.can_transition_to(decision) {
            return Err(StoreError::precondition_failed(format!(
                "{} is not a review decision",
                decision
            )));
        }

        let mut tables = self.tables.write().await;
        let video = tables
            .videos
            .get_mut(id)
            .ok_or_else(|| StoreError::not_found(id.to_string()))?;

        if video.status != ReviewStatus::Pending {
            return Err(StoreError::precondition_failed(format!(
                "video {} is {}, expected pending",
                id, video.status
            )));
        }

        match decision {
            ReviewStatus::Approved => video.approve(),
            ReviewStatus::Rejected => video.reject(),
            _ => unreachable!(),
        }
        Ok(video.clone())
    }

    async fn commit_publication(&self, id: &VideoId, external_id: &str) -> StoreResult<Video> {
        let mut tables = self.tables.write().await;
        let video = tables
            .videos
            .get_mut(id)
            .ok_or_else(|| StoreError::not_found(id.to_string()))?;

        if video.status != ReviewStatus::Approved {
            return Err(StoreError::precondition_failed(format!(
                "video {} is {}, expected approved",
                id, video.status
            )));
        }

        video.mark_uploaded(external_id);
        Ok(video.clone())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use cutroom_models::BlobLocator;

    use super::*;

    fn creator() -> Account {
        Account::new("creator@example.com", "hash", Some("Cass".into()), Role::Creator)
    }

    fn pending_video(creator_id: &AccountId) -> Video {
        Video::new(
            VideoId::new(),
            "Draft 1",
            "",
            BlobLocator::from_string("drafts/c/v/source.mp4"),
            creator_id.clone(),
            None,
        )
    }

    #[tokio::test]
    async fn test_duplicate_account_rejected() {
        let store = MemStore::new();
        let account = creator();
        store.create_account(&account).await.unwrap();

        let same_email = creator();
        let err = store.create_account(&same_email).await.unwrap_err();
        assert!(matches!(err, StoreError::AlreadyExists(_)));

        // Same email under a different role is a different account
        let editor = Account::new("creator@example.com", "hash", None, Role::Editor);
        store.create_account(&editor).await.unwrap();
    }

    #[tokio::test]
    async fn test_accept_invite_is_single_use() {
        let store = MemStore::new();
        let invite = Invite::new(AccountId::new(), "editor@example.com");
        store.create_invite(&invite).await.unwrap();

        let first = AccountId::new();
        let second = AccountId::new();
        assert!(store.accept_invite(&invite.token, &first).await.unwrap());
        assert!(!store.accept_invite(&invite.token, &second).await.unwrap());

        let stored = store.get_invite_by_token(&invite.token).await.unwrap().unwrap();
        assert_eq!(stored.editor_id, Some(first));
    }

    #[tokio::test]
    async fn test_record_decision_cas() {
        let store = MemStore::new();
        let owner = AccountId::new();
        let video = pending_video(&owner);
        store.create_video(&video).await.unwrap();

        let approved = store
            .record_decision(&video.id, ReviewStatus::Approved)
            .await
            .unwrap();
        assert_eq!(approved.status, ReviewStatus::Approved);

        // The losing decision observes the failed guard
        let err = store
            .record_decision(&video.id, ReviewStatus::Rejected)
            .await
            .unwrap_err();
        assert!(err.is_precondition_failed());
    }

    #[tokio::test]
    async fn test_concurrent_decisions_have_one_winner() {
        let store = Arc::new(MemStore::new());
        let owner = AccountId::new();
        let video = pending_video(&owner);
        store.create_video(&video).await.unwrap();

        let a = {
            let store = Arc::clone(&store);
            let id = video.id.clone();
            tokio::spawn(async move { store.record_decision(&id, ReviewStatus::Approved).await })
        };
        let b = {
            let store = Arc::clone(&store);
            let id = video.id.clone();
            tokio::spawn(async move { store.record_decision(&id, ReviewStatus::Rejected).await })
        };

        let results = [a.await.unwrap(), b.await.unwrap()];
        let winners = results.iter().filter(|r| r.is_ok()).count();
        assert_eq!(winners, 1, "exactly one decision must commit");
    }

    #[tokio::test]
    async fn test_commit_publication_requires_approved() {
        let store = MemStore::new();
        let owner = AccountId::new();
        let video = pending_video(&owner);
        store.create_video(&video).await.unwrap();

        let err = store.commit_publication(&video.id, "yt123").await.unwrap_err();
        assert!(err.is_precondition_failed());

        store
            .record_decision(&video.id, ReviewStatus::Approved)
            .await
            .unwrap();
        let published = store.commit_publication(&video.id, "yt123").await.unwrap();
        assert_eq!(published.status, ReviewStatus::Uploaded);
        assert_eq!(published.external_id.as_deref(), Some("yt123"));
    }

    #[tokio::test]
    async fn test_pending_queue_is_oldest_first() {
        let store = MemStore::new();
        let owner = AccountId::new();

        let mut first = pending_video(&owner);
        first.created_at = chrono::Utc::now() - chrono::Duration::minutes(5);
        let second = pending_video(&owner);

        store.create_video(&second).await.unwrap();
        store.create_video(&first).await.unwrap();

        let pending = store.list_pending_for_creator(&owner).await.unwrap();
        assert_eq!(pending.len(), 2);
        assert_eq!(pending[0].id, first.id);
    }
}
