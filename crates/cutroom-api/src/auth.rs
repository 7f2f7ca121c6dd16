//! Bearer token authentication.
//!
//! One HS256 signing secret for every role; the role travels as a claim and
//! authorization is checked explicitly inside each operation.

use std::time::Duration;

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use chrono::Utc;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use cutroom_models::{AccountId, Role};

use crate::error::ApiError;
use crate::state::AppState;

/// Token claims.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Account ID
    pub sub: String,
    /// Account role
    pub role: String,
    /// Issued at
    pub iat: i64,
    /// Expiration
    pub exp: i64,
}

/// Issues and verifies bearer tokens.
pub struct AuthKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl: Duration,
}

impl AuthKeys {
    /// Create from a shared signing secret.
    pub fn new(secret: &[u8], ttl: Duration) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            ttl,
        }
    }

    /// Issue a token for an account.
    pub fn issue(&self, account_id: &AccountId, role: Role) -> Result<String, ApiError> {
        let now = Utc::now().timestamp();
        let claims = Claims {
            sub: account_id.to_string(),
            role: role.as_str().to_string(),
            iat: now,
            exp: now + self.ttl.as_secs() as i64,
        };

        encode(&Header::default(), &claims, &self.encoding)
            .map_err(|e| ApiError::internal(format!("Token signing failed: {}", e)))
    }

    /// Verify a token and extract the caller's identity.
    pub fn verify(&self, token: &str) -> Result<AuthUser, ApiError> {
        let validation = Validation::new(Algorithm::HS256);
        let data = decode::<Claims>(token, &self.decoding, &validation)
            .map_err(|e| ApiError::unauthorized(format!("Token validation failed: {}", e)))?;

        let role = Role::parse(&data.claims.role)
            .ok_or_else(|| ApiError::unauthorized("Token carries an unknown role"))?;

        Ok(AuthUser {
            account_id: AccountId::from_string(data.claims.sub),
            role,
        })
    }
}

/// Authenticated caller extracted from the request.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub account_id: AccountId,
    pub role: Role,
}

impl AuthUser {
    /// Require a specific role.
    pub fn require_role(&self, role: Role) -> Result<(), ApiError> {
        if self.role == role {
            Ok(())
        } else {
            Err(ApiError::not_authorized(format!(
                "requires the {} role",
                role
            )))
        }
    }
}

/// Axum extractor for the authenticated caller.
#[axum::async_trait]
impl FromRequestParts<AppState> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let auth_header = parts
            .headers
            .get("Authorization")
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| ApiError::unauthorized("Missing Authorization header"))?;

        let token = auth_header
            .strip_prefix("Bearer ")
            .ok_or_else(|| ApiError::unauthorized("Invalid Authorization header format"))?;

        state.auth.verify(token)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn keys() -> AuthKeys {
        AuthKeys::new(b"test-secret", Duration::from_secs(3600))
    }

    #[test]
    fn test_issue_verify_roundtrip() {
        let keys = keys();
        let id = AccountId::new();
        let token = keys.issue(&id, Role::Creator).unwrap();

        let user = keys.verify(&token).unwrap();
        assert_eq!(user.account_id, id);
        assert_eq!(user.role, Role::Creator);
    }

    #[test]
    fn test_tampered_token_rejected() {
        let keys = keys();
        let token = keys.issue(&AccountId::new(), Role::Editor).unwrap();
        let other = AuthKeys::new(b"other-secret", Duration::from_secs(3600));

        assert!(other.verify(&token).is_err());
        assert!(keys.verify("garbage").is_err());
    }

    #[test]
    fn test_role_requirement() {
        let user = AuthUser {
            account_id: AccountId::new(),
            role: Role::Editor,
        };
        assert!(user.require_role(Role::Editor).is_ok());
        assert!(matches!(
            user.require_role(Role::Creator),
            Err(ApiError::NotAuthorized(_))
        ));
    }
}
