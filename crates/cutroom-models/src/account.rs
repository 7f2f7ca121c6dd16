//! Account models.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::ids::AccountId;

/// Account role. Fixed at creation, never changes afterwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Creator,
    Editor,
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Creator => "creator",
            Role::Editor => "editor",
            Role::Admin => "admin",
        }
    }

    /// Parse a role from its wire representation.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "creator" => Some(Role::Creator),
            "editor" => Some(Role::Editor),
            "admin" => Some(Role::Admin),
            _ => None,
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Lowercase and trim an email address so lookups are case-insensitive.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// An account record. The password hash is opaque here; hashing and
/// verification live at the API boundary.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Account {
    /// Unique account ID
    pub id: AccountId,

    /// Email address, normalized to lowercase
    pub email: String,

    /// PHC-formatted password hash
    pub password_hash: String,

    /// Display name (required for creators, optional otherwise)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,

    /// Account role
    pub role: Role,

    /// Creation timestamp
    pub created_at: DateTime<Utc>,
}

impl Account {
    /// Create a new account record.
    pub fn new(
        email: impl AsRef<str>,
        password_hash: impl Into<String>,
        display_name: Option<String>,
        role: Role,
    ) -> Self {
        Self {
            id: AccountId::new(),
            email: normalize_email(email.as_ref()),
            password_hash: password_hash.into(),
            display_name,
            role,
            created_at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_parse_roundtrip() {
        for role in [Role::Creator, Role::Editor, Role::Admin] {
            assert_eq!(Role::parse(role.as_str()), Some(role));
        }
        assert_eq!(Role::parse("superuser"), None);
    }

    #[test]
    fn test_email_is_normalized() {
        let account = Account::new("  Jo@Example.COM ", "hash", None, Role::Editor);
        assert_eq!(account.email, "jo@example.com");
    }

    #[test]
    fn test_normalize_email_idempotent() {
        let once = normalize_email("A@B.com");
        assert_eq!(normalize_email(&once), once);
    }
}
