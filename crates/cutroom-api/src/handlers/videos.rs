//! Video handlers: draft submission, review queue, decisions, publication.

use axum::extract::{Multipart, Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Serialize;

use cutroom_models::{AccountId, ReviewStatus, Video, VideoId};

use crate::auth::AuthUser;
use crate::error::{ApiError, ApiResult};
use crate::services::SubmitDraft;
use crate::state::AppState;

/// Video response.
#[derive(Serialize)]
pub struct VideoResponse {
    pub id: VideoId,
    pub title: String,
    pub description: String,
    pub status: ReviewStatus,
    /// Hosting platform ID, present once the video is uploaded
    #[serde(skip_serializing_if = "Option::is_none")]
    pub external_id: Option<String>,
    pub creator_id: AccountId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub editor_id: Option<AccountId>,
    pub created_at: String,
    pub updated_at: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reviewed_at: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub published_at: Option<String>,
}

impl VideoResponse {
    pub fn from_video(video: &Video) -> Self {
        Self {
            id: video.id.clone(),
            title: video.title.clone(),
            description: video.description.clone(),
            status: video.status,
            external_id: video.external_id.clone(),
            creator_id: video.creator_id.clone(),
            editor_id: video.editor_id.clone(),
            created_at: video.created_at.to_rfc3339(),
            updated_at: video.updated_at.to_rfc3339(),
            reviewed_at: video.reviewed_at.map(|t| t.to_rfc3339()),
            published_at: video.published_at.map(|t| t.to_rfc3339()),
        }
    }
}

/// POST /videos: multipart draft upload with `title`, `description` and
/// `video` fields.
pub async fn submit_video(
    State(state): State<AppState>,
    user: AuthUser,
    mut multipart: Multipart,
) -> ApiResult<(StatusCode, Json<VideoResponse>)> {
    let mut title: Option<String> = None;
    let mut description = String::new();
    let mut content_type = "video/mp4".to_string();
    let mut bytes: Option<Vec<u8>> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::bad_request(format!("malformed multipart body: {}", e)))?
    {
        let name = field.name().map(|s| s.to_string());
        match name.as_deref() {
            Some("title") => {
                title = Some(
                    field
                        .text()
                        .await
                        .map_err(|e| ApiError::bad_request(e.to_string()))?,
                );
            }
            Some("description") => {
                description = field
                    .text()
                    .await
                    .map_err(|e| ApiError::bad_request(e.to_string()))?;
            }
            Some("video") => {
                if let Some(ct) = field.content_type() {
                    content_type = ct.to_string();
                }
                bytes = Some(
                    field
                        .bytes()
                        .await
                        .map_err(|e| ApiError::bad_request(e.to_string()))?
                        .to_vec(),
                );
            }
            _ => {}
        }
    }

    let draft = SubmitDraft {
        title: title.ok_or_else(|| ApiError::bad_request("missing 'title' field"))?,
        description,
        content_type,
        bytes: bytes.ok_or_else(|| ApiError::bad_request("missing 'video' field"))?,
    };

    let video = state.review.submit(&user, draft).await?;
    Ok((StatusCode::CREATED, Json(VideoResponse::from_video(&video))))
}

/// GET /videos/pending: the creator's review queue, oldest first.
pub async fn list_pending(
    State(state): State<AppState>,
    user: AuthUser,
) -> ApiResult<Json<Vec<VideoResponse>>> {
    let videos = state.review.list_pending(&user).await?;
    Ok(Json(videos.iter().map(VideoResponse::from_video).collect()))
}

/// GET /videos: the caller's library (creator) or uploads (editor).
pub async fn list_videos(
    State(state): State<AppState>,
    user: AuthUser,
) -> ApiResult<Json<Vec<VideoResponse>>> {
    let videos = state.review.list_videos(&user).await?;
    Ok(Json(videos.iter().map(VideoResponse::from_video).collect()))
}

/// GET /videos/:video_id
pub async fn get_video(
    State(state): State<AppState>,
    Path(video_id): Path<String>,
    user: AuthUser,
) -> ApiResult<Json<VideoResponse>> {
    let video = state
        .review
        .get_video(&user, &VideoId::from_string(video_id))
        .await?;
    Ok(Json(VideoResponse::from_video(&video)))
}

/// POST /videos/:video_id/approve
///
/// On success the response carries status `uploaded` with the platform ID.
/// When the platform is down the approval still sticks and the caller gets
/// a 502 with code `approved_unpublished`.
pub async fn approve_video(
    State(state): State<AppState>,
    Path(video_id): Path<String>,
    user: AuthUser,
) -> ApiResult<Json<VideoResponse>> {
    let video = state
        .review
        .approve(&user, &VideoId::from_string(video_id))
        .await?;
    Ok(Json(VideoResponse::from_video(&video)))
}

/// POST /videos/:video_id/reject
pub async fn reject_video(
    State(state): State<AppState>,
    Path(video_id): Path<String>,
    user: AuthUser,
) -> ApiResult<Json<VideoResponse>> {
    let video = state
        .review
        .reject(&user, &VideoId::from_string(video_id))
        .await?;
    Ok(Json(VideoResponse::from_video(&video)))
}

/// POST /videos/:video_id/publish: retry an approved-but-unpublished video.
pub async fn publish_video(
    State(state): State<AppState>,
    Path(video_id): Path<String>,
    user: AuthUser,
) -> ApiResult<Json<VideoResponse>> {
    let video = state
        .review
        .publish(&user, &VideoId::from_string(video_id))
        .await?;
    Ok(Json(VideoResponse::from_video(&video)))
}
