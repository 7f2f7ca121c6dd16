//! Invite handlers.

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;

use cutroom_models::{CreateInviteRequest, InviteResponse, ResolveInviteResponse};

use crate::auth::AuthUser;
use crate::error::ApiResult;
use crate::state::AppState;

/// POST /invites
pub async fn create_invite(
    State(state): State<AppState>,
    user: AuthUser,
    Json(request): Json<CreateInviteRequest>,
) -> ApiResult<(StatusCode, Json<InviteResponse>)> {
    let response = state.invites.create(&user, request).await?;
    Ok((StatusCode::CREATED, Json(response)))
}

/// GET /invites
pub async fn list_invites(
    State(state): State<AppState>,
    user: AuthUser,
) -> ApiResult<Json<Vec<InviteResponse>>> {
    Ok(Json(state.invites.list(&user).await?))
}

#[derive(Deserialize)]
pub struct ResolveQuery {
    pub token: String,
}

/// GET /join/resolve?token=...
///
/// Public: prospective editors hit this before they have an account. The
/// route is rate-limited to keep token guessing impractical.
pub async fn resolve_invite(
    State(state): State<AppState>,
    Query(query): Query<ResolveQuery>,
) -> ApiResult<Json<ResolveInviteResponse>> {
    Ok(Json(state.invites.resolve(&query.token).await?))
}
