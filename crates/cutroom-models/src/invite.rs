//! Editor invite models.
//!
//! An invite binds a future editor signup to the creator who sent it. The
//! token is the binding key: acceptance is scoped to the invite whose token
//! was presented, never to "any invite for this email".

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::account::normalize_email;
use crate::ids::{AccountId, InviteId};

/// Invite lifecycle status. Monotonic: `invited` may become `accepted`,
/// nothing ever transitions back.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum InviteStatus {
    #[default]
    Invited,
    Accepted,
}

impl InviteStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            InviteStatus::Invited => "invited",
            InviteStatus::Accepted => "accepted",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "invited" => Some(InviteStatus::Invited),
            "accepted" => Some(InviteStatus::Accepted),
            _ => None,
        }
    }
}

impl std::fmt::Display for InviteStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A creator-to-editor invite.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Invite {
    /// Unique invite ID
    pub id: InviteId,

    /// Creator who owns this invite
    pub creator_id: AccountId,

    /// Target editor email, normalized to lowercase
    pub editor_email: String,

    /// Single-use random token
    pub token: String,

    /// Lifecycle status
    #[serde(default)]
    pub status: InviteStatus,

    /// Editor account bound at acceptance. Set exactly once, together with
    /// the transition to `accepted`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub editor_id: Option<AccountId>,

    /// Creation timestamp
    pub created_at: DateTime<Utc>,

    /// Acceptance timestamp
    #[serde(skip_serializing_if = "Option::is_none")]
    pub accepted_at: Option<DateTime<Utc>>,
}

impl Invite {
    /// Create a new open invite with a fresh token.
    pub fn new(creator_id: AccountId, editor_email: impl AsRef<str>) -> Self {
        Self {
            id: InviteId::new(),
            creator_id,
            editor_email: normalize_email(editor_email.as_ref()),
            token: generate_invite_token(),
            status: InviteStatus::Invited,
            editor_id: None,
            created_at: Utc::now(),
            accepted_at: None,
        }
    }

    /// Whether the invite can still be accepted.
    pub fn is_open(&self) -> bool {
        self.status == InviteStatus::Invited
    }

    /// Bind an editor account and mark the invite accepted.
    pub fn accept(&mut self, editor_id: AccountId) {
        self.status = InviteStatus::Accepted;
        self.editor_id = Some(editor_id);
        self.accepted_at = Some(Utc::now());
    }

    /// Build the signup link a prospective editor receives.
    pub fn link(&self, base_url: &str) -> String {
        format!("{}/join?token={}", base_url.trim_end_matches('/'), self.token)
    }
}

/// Invite token length in hex characters (32 random bytes).
pub const INVITE_TOKEN_LEN: usize = 64;

/// Generate an invite token: 32 bytes from the OS-seeded generator,
/// hex-encoded. 256 bits of entropy makes the token unguessable without
/// possession of the link.
pub fn generate_invite_token() -> String {
    use rand::RngCore;

    let mut bytes = [0u8; 32];
    rand::rng().fill_bytes(&mut bytes);

    let mut token = String::with_capacity(INVITE_TOKEN_LEN);
    for b in bytes {
        token.push_str(&format!("{:02x}", b));
    }
    token
}

/// Validate an invite token's format before hitting the store.
pub fn is_valid_invite_token(token: &str) -> bool {
    token.len() == INVITE_TOKEN_LEN && token.chars().all(|c| c.is_ascii_hexdigit())
}

// ============================================================================
// API Request/Response Types
// ============================================================================

/// Request to create an invite.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateInviteRequest {
    /// Editor email to invite.
    #[validate(email)]
    pub editor_email: String,
}

/// Response for invite creation. The link is always returned so it can be
/// relayed manually if email delivery fails.
#[derive(Debug, Clone, Serialize)]
pub struct InviteResponse {
    /// Signup link for the editor.
    pub invite_link: String,

    /// Raw token (for reference).
    pub token: String,

    /// Target editor email.
    pub editor_email: String,

    /// Lifecycle status.
    pub status: InviteStatus,

    /// When created.
    pub created_at: String,
}

impl InviteResponse {
    /// Build from an invite record.
    pub fn from_invite(invite: &Invite, base_url: &str) -> Self {
        Self {
            invite_link: invite.link(base_url),
            token: invite.token.clone(),
            editor_email: invite.editor_email.clone(),
            status: invite.status,
            created_at: invite.created_at.to_rfc3339(),
        }
    }
}

/// Response for resolving a live invite token before signup.
#[derive(Debug, Clone, Serialize)]
pub struct ResolveInviteResponse {
    /// Email the invite was addressed to.
    pub editor_email: String,

    /// Creator the editor will be bound to.
    pub creator_id: AccountId,

    /// Creator display name, when known.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub creator_name: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_format() {
        let token = generate_invite_token();
        assert!(is_valid_invite_token(&token));
        assert_eq!(token.len(), INVITE_TOKEN_LEN);
    }

    #[test]
    fn test_tokens_are_unique() {
        let t1 = generate_invite_token();
        let t2 = generate_invite_token();
        assert_ne!(t1, t2, "tokens should be unique");
    }

    #[test]
    fn test_token_validation() {
        assert!(!is_valid_invite_token("short"));
        assert!(!is_valid_invite_token(&"g".repeat(INVITE_TOKEN_LEN)));
        assert!(is_valid_invite_token(&"0a".repeat(32)));
    }

    #[test]
    fn test_accept_binds_editor_exactly_once() {
        let mut invite = Invite::new(AccountId::new(), "editor@example.com");
        assert!(invite.is_open());
        assert!(invite.editor_id.is_none());

        let editor = AccountId::new();
        invite.accept(editor.clone());

        assert_eq!(invite.status, InviteStatus::Accepted);
        assert_eq!(invite.editor_id, Some(editor));
        assert!(invite.accepted_at.is_some());
        assert!(!invite.is_open());
    }

    #[test]
    fn test_invite_link_trims_trailing_slash() {
        let invite = Invite::new(AccountId::new(), "editor@example.com");
        let link = invite.link("https://app.example.com/");
        assert_eq!(
            link,
            format!("https://app.example.com/join?token={}", invite.token)
        );
    }
}
