//! Invite ledger service.
//!
//! Owns the creator-to-editor onboarding handshake. An editor account never
//! depends on invite state: acceptance is attempted after signup and quietly
//! does nothing when the token is unknown or already used.

use std::sync::Arc;

use metrics::counter;
use tracing::{info, warn};
use validator::Validate;

use cutroom_models::{
    is_valid_invite_token, Account, AccountId, CreateInviteRequest, Invite, InviteResponse,
    ResolveInviteResponse, Role,
};
use cutroom_store::Store;

use crate::auth::AuthUser;
use crate::error::{ApiError, ApiResult};
use crate::metrics::names;
use crate::notify::Notifier;

/// Invite operations.
#[derive(Clone)]
pub struct InviteService {
    store: Arc<dyn Store>,
    notifier: Arc<dyn Notifier>,
    base_url: String,
}

impl InviteService {
    pub fn new(store: Arc<dyn Store>, notifier: Arc<dyn Notifier>, base_url: String) -> Self {
        Self {
            store,
            notifier,
            base_url,
        }
    }

    /// Create an invite and send the link, best-effort.
    ///
    /// Duplicate invites to the same email are allowed; the token is the
    /// binding key at acceptance time. The link is always returned so the
    /// creator can relay it manually when email delivery fails.
    pub async fn create(
        &self,
        caller: &AuthUser,
        request: CreateInviteRequest,
    ) -> ApiResult<InviteResponse> {
        caller.require_role(Role::Creator)?;
        request
            .validate()
            .map_err(|e| ApiError::validation(e.to_string()))?;

        let invite = Invite::new(caller.account_id.clone(), &request.editor_email);
        self.store.create_invite(&invite).await?;
        counter!(names::INVITES_CREATED_TOTAL).increment(1);

        let creator_name = self
            .store
            .get_account(&caller.account_id)
            .await?
            .and_then(|a| a.display_name)
            .unwrap_or_else(|| "A creator".to_string());

        let link = invite.link(&self.base_url);
        if let Err(e) = self
            .notifier
            .send_invite(&invite.editor_email, &link, &creator_name)
            .await
        {
            // The link still reaches the caller, so a failed send is not an
            // operation failure.
            warn!(invite_id = %invite.id, error = %e, "Invite email failed, returning link only");
        }

        info!(invite_id = %invite.id, creator_id = %caller.account_id, "Invite created");
        Ok(InviteResponse::from_invite(&invite, &self.base_url))
    }

    /// Resolve a live token before signup. Read-only.
    pub async fn resolve(&self, token: &str) -> ApiResult<ResolveInviteResponse> {
        if !is_valid_invite_token(token) {
            return Err(ApiError::InviteNotFound);
        }

        let invite = match self.store.get_invite_by_token(token).await? {
            Some(invite) if invite.is_open() => invite,
            _ => return Err(ApiError::InviteNotFound),
        };

        let creator_name = self
            .store
            .get_account(&invite.creator_id)
            .await?
            .and_then(|a| a.display_name);

        Ok(ResolveInviteResponse {
            editor_email: invite.editor_email,
            creator_id: invite.creator_id,
            creator_name,
        })
    }

    /// Try to accept the invite this token names, binding the new editor.
    ///
    /// Returns whether a binding happened. Unknown tokens and lost races are
    /// no-ops: signup already succeeded and must stay successful.
    pub async fn accept(&self, token: &str, editor_id: &AccountId) -> ApiResult<bool> {
        if !is_valid_invite_token(token) {
            return Ok(false);
        }

        let accepted = self.store.accept_invite(token, editor_id).await?;
        if accepted {
            counter!(names::INVITES_ACCEPTED_TOTAL).increment(1);
            info!(editor_id = %editor_id, "Invite accepted");
        } else {
            info!(editor_id = %editor_id, "Invite token not open, editor stays unbound");
        }
        Ok(accepted)
    }

    /// Bind a freshly signed-up editor to the invite this token names.
    ///
    /// The token must resolve and its target email must match the new
    /// account's email. Anything else (unknown token, email mismatch, a
    /// token someone else already spent) is a silent no-op and returns
    /// `None`. On success returns the creator the editor is now bound to.
    pub async fn bind_editor(
        &self,
        token: &str,
        account: &Account,
    ) -> ApiResult<Option<AccountId>> {
        if !is_valid_invite_token(token) {
            return Ok(None);
        }

        let invite = match self.store.get_invite_by_token(token).await? {
            Some(invite) => invite,
            None => return Ok(None),
        };

        if invite.editor_email != account.email {
            info!(
                editor_id = %account.id,
                "Invite email does not match signup email, editor stays unbound"
            );
            return Ok(None);
        }

        if self.accept(token, &account.id).await? {
            Ok(Some(invite.creator_id))
        } else {
            Ok(None)
        }
    }

    /// List the caller's invites, newest first.
    pub async fn list(&self, caller: &AuthUser) -> ApiResult<Vec<InviteResponse>> {
        caller.require_role(Role::Creator)?;
        let invites = self.store.list_invites_for_creator(&caller.account_id).await?;
        Ok(invites
            .iter()
            .map(|i| InviteResponse::from_invite(i, &self.base_url))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use cutroom_models::InviteStatus;
    use cutroom_store::MemStore;

    use crate::notify::{MockNotifier, NotifyError};

    use super::*;

    async fn creator_user(store: &Arc<MemStore>) -> AuthUser {
        let account = Account::new(
            "cass@example.com",
            "hash",
            Some("Cass".into()),
            Role::Creator,
        );
        store.create_account(&account).await.unwrap();
        AuthUser {
            account_id: account.id.clone(),
            role: Role::Creator,
        }
    }

    fn service_with(notifier: MockNotifier, store: Arc<MemStore>) -> InviteService {
        InviteService::new(store, Arc::new(notifier), "https://app.test".into())
    }

    #[tokio::test]
    async fn test_create_returns_link_even_when_email_fails() {
        let store = Arc::new(MemStore::new());
        let user = creator_user(&store).await;

        let mut notifier = MockNotifier::new();
        notifier
            .expect_send_invite()
            .returning(|_, _, _| Err(NotifyError::SendFailed("smtp down".into())));

        let service = service_with(notifier, Arc::clone(&store));
        let response = service
            .create(
                &user,
                CreateInviteRequest {
                    editor_email: "editor@example.com".into(),
                },
            )
            .await
            .unwrap();

        assert!(response.invite_link.contains(&response.token));
        assert_eq!(response.status, InviteStatus::Invited);
    }

    #[tokio::test]
    async fn test_editor_cannot_create_invites() {
        let store = Arc::new(MemStore::new());
        let service = service_with(MockNotifier::new(), Arc::clone(&store));

        let editor = AuthUser {
            account_id: AccountId::new(),
            role: Role::Editor,
        };
        let err = service
            .create(
                &editor,
                CreateInviteRequest {
                    editor_email: "someone@example.com".into(),
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::NotAuthorized(_)));
    }

    #[tokio::test]
    async fn test_resolve_rejects_spent_and_unknown_tokens() {
        let store = Arc::new(MemStore::new());
        let user = creator_user(&store).await;

        let mut notifier = MockNotifier::new();
        notifier.expect_send_invite().returning(|_, _, _| Ok(()));
        let service = service_with(notifier, Arc::clone(&store));

        let created = service
            .create(
                &user,
                CreateInviteRequest {
                    editor_email: "editor@example.com".into(),
                },
            )
            .await
            .unwrap();

        // Live token resolves
        let resolved = service.resolve(&created.token).await.unwrap();
        assert_eq!(resolved.editor_email, "editor@example.com");
        assert_eq!(resolved.creator_name.as_deref(), Some("Cass"));

        // Accepted token stops resolving
        let editor_id = AccountId::new();
        assert!(service.accept(&created.token, &editor_id).await.unwrap());
        assert!(matches!(
            service.resolve(&created.token).await,
            Err(ApiError::InviteNotFound)
        ));

        // Unknown token never resolves
        assert!(matches!(
            service.resolve(&"ab".repeat(32)).await,
            Err(ApiError::InviteNotFound)
        ));
    }

    #[tokio::test]
    async fn test_second_acceptance_is_noop() {
        let store = Arc::new(MemStore::new());
        let user = creator_user(&store).await;

        let mut notifier = MockNotifier::new();
        notifier.expect_send_invite().returning(|_, _, _| Ok(()));
        let service = service_with(notifier, Arc::clone(&store));

        let created = service
            .create(
                &user,
                CreateInviteRequest {
                    editor_email: "editor@example.com".into(),
                },
            )
            .await
            .unwrap();

        let first = AccountId::new();
        let second = AccountId::new();
        assert!(service.accept(&created.token, &first).await.unwrap());
        assert!(!service.accept(&created.token, &second).await.unwrap());

        let invite = store
            .get_invite_by_token(&created.token)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(invite.editor_id, Some(first));
    }

    #[tokio::test]
    async fn test_bind_editor_requires_matching_email() {
        let store = Arc::new(MemStore::new());
        let user = creator_user(&store).await;

        let mut notifier = MockNotifier::new();
        notifier.expect_send_invite().returning(|_, _, _| Ok(()));
        let service = service_with(notifier, Arc::clone(&store));

        let created = service
            .create(
                &user,
                CreateInviteRequest {
                    editor_email: "editor@example.com".into(),
                },
            )
            .await
            .unwrap();

        // A signup with a different email does not consume the token
        let stranger = Account::new("other@example.com", "hash", None, Role::Editor);
        store.create_account(&stranger).await.unwrap();
        assert_eq!(
            service.bind_editor(&created.token, &stranger).await.unwrap(),
            None
        );

        // The intended editor still can
        let editor = Account::new("editor@example.com", "hash", None, Role::Editor);
        store.create_account(&editor).await.unwrap();
        assert_eq!(
            service.bind_editor(&created.token, &editor).await.unwrap(),
            Some(user.account_id.clone())
        );
    }
}
