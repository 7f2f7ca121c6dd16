//! Signup and signin handlers.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};
use tracing::info;
use validator::Validate;

use cutroom_models::{normalize_email, Account, AccountId, Role};

use crate::error::{ApiError, ApiResult};
use crate::security::{hash_password, verify_password};
use crate::state::AppState;

#[derive(Deserialize, Validate)]
pub struct SignupRequest {
    #[validate(email)]
    pub email: String,
    pub password: String,
    pub display_name: Option<String>,
    /// Editor signups may present an invite token to bind to a creator.
    pub invite_token: Option<String>,
    /// Required for admin signups; compared against the bootstrap key.
    pub admin_key: Option<String>,
}

#[derive(Deserialize, Validate)]
pub struct SigninRequest {
    #[validate(email)]
    pub email: String,
    pub password: String,
}

#[derive(Serialize)]
pub struct AccountResponse {
    pub id: AccountId,
    pub email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    pub role: Role,
    pub created_at: String,
}

impl AccountResponse {
    fn from_account(account: &Account) -> Self {
        Self {
            id: account.id.clone(),
            email: account.email.clone(),
            display_name: account.display_name.clone(),
            role: account.role,
            created_at: account.created_at.to_rfc3339(),
        }
    }
}

#[derive(Serialize)]
pub struct TokenResponse {
    pub token: String,
    pub account: AccountResponse,
    /// Creator the new editor was bound to, when signup consumed an invite.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub joined_creator_id: Option<AccountId>,
}

fn parse_role(role: &str) -> ApiResult<Role> {
    Role::parse(role).ok_or_else(|| ApiError::not_found(format!("unknown role '{}'", role)))
}

/// POST /auth/:role/signup
pub async fn signup(
    State(state): State<AppState>,
    Path(role): Path<String>,
    Json(request): Json<SignupRequest>,
) -> ApiResult<(StatusCode, Json<TokenResponse>)> {
    let role = parse_role(&role)?;
    request
        .validate()
        .map_err(|e| ApiError::validation(e.to_string()))?;

    match role {
        Role::Creator => {
            if request
                .display_name
                .as_deref()
                .map(str::trim)
                .unwrap_or_default()
                .is_empty()
            {
                return Err(ApiError::validation("creators must set a display name"));
            }
        }
        Role::Admin => {
            let expected = state
                .config
                .admin_signup_key
                .as_deref()
                .ok_or_else(|| ApiError::not_authorized("admin signup is disabled"))?;
            if request.admin_key.as_deref() != Some(expected) {
                return Err(ApiError::not_authorized("invalid admin bootstrap key"));
            }
        }
        Role::Editor => {}
    }

    let password_hash = hash_password(&request.password)?;
    let account = Account::new(&request.email, password_hash, request.display_name.clone(), role);
    state.store.create_account(&account).await?;
    info!(account_id = %account.id, role = %role, "Account created");

    // Soft binding: a dead or mismatched token never blocks the signup.
    let mut joined_creator_id = None;
    if role == Role::Editor {
        if let Some(token) = request.invite_token.as_deref() {
            joined_creator_id = state.invites.bind_editor(token, &account).await?;
        }
    }

    let token = state.auth.issue(&account.id, role)?;
    Ok((
        StatusCode::CREATED,
        Json(TokenResponse {
            token,
            account: AccountResponse::from_account(&account),
            joined_creator_id,
        }),
    ))
}

/// POST /auth/:role/signin
pub async fn signin(
    State(state): State<AppState>,
    Path(role): Path<String>,
    Json(request): Json<SigninRequest>,
) -> ApiResult<Json<TokenResponse>> {
    let role = parse_role(&role)?;
    request
        .validate()
        .map_err(|e| ApiError::validation(e.to_string()))?;

    // One error for both unknown email and wrong password, so the endpoint
    // cannot be used to enumerate accounts.
    let invalid = || ApiError::unauthorized("invalid credentials");

    let account = state
        .store
        .find_account_by_email(role, &normalize_email(&request.email))
        .await?
        .ok_or_else(invalid)?;

    if !verify_password(&request.password, &account.password_hash)? {
        return Err(invalid());
    }

    let token = state.auth.issue(&account.id, account.role)?;
    Ok(Json(TokenResponse {
        token,
        account: AccountResponse::from_account(&account),
        joined_creator_id: None,
    }))
}
