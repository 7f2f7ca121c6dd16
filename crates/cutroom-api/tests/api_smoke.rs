//! Router-level tests: the HTTP surface wired to in-memory collaborators.

use std::sync::Arc;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::Value;
use tower::ServiceExt;

use cutroom_api::notify::NoopNotifier;
use cutroom_api::{create_router, ApiConfig, AppState};
use cutroom_publish::{PublishReceipt, PublishRequest, PublishResult, PublishTarget};
use cutroom_storage::MemBlobStore;
use cutroom_store::MemStore;

struct AlwaysPublishes;

#[async_trait]
impl PublishTarget for AlwaysPublishes {
    async fn publish(&self, _request: PublishRequest) -> PublishResult<PublishReceipt> {
        Ok(PublishReceipt {
            external_id: "yt123".to_string(),
        })
    }
}

fn test_router() -> Router {
    let state = AppState::with_collaborators(
        ApiConfig::default(),
        Arc::new(MemStore::new()),
        Arc::new(MemBlobStore::new()),
        Arc::new(AlwaysPublishes),
        Arc::new(NoopNotifier),
    );
    create_router(state, None)
}

async fn json_body(response: axum::response::Response) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

fn json_request(uri: &str, token: Option<&str>, body: Value) -> Request<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

fn multipart_draft(uri: &str, token: &str, title: &str) -> Request<Body> {
    let boundary = "cutroomtestboundary";
    let body = format!(
        "--{b}\r\n\
         Content-Disposition: form-data; name=\"title\"\r\n\r\n\
         {title}\r\n\
         --{b}\r\n\
         Content-Disposition: form-data; name=\"description\"\r\n\r\n\
         smoke test draft\r\n\
         --{b}\r\n\
         Content-Disposition: form-data; name=\"video\"; filename=\"draft.mp4\"\r\n\
         Content-Type: video/mp4\r\n\r\n\
         fake mp4 bytes\r\n\
         --{b}--\r\n",
        b = boundary,
        title = title,
    );

    Request::builder()
        .method("POST")
        .uri(uri)
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={}", boundary),
        )
        .header(header::AUTHORIZATION, format!("Bearer {}", token))
        .body(Body::from(body))
        .unwrap()
}

#[tokio::test]
async fn health_endpoint_responds() {
    let app = test_router();
    let response = app
        .oneshot(Request::get("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = json_body(response).await;
    assert_eq!(body["status"], "healthy");
}

#[tokio::test]
async fn signup_invite_submit_approve_over_http() {
    let app = test_router();

    // Creator signs up
    let response = app
        .clone()
        .oneshot(json_request(
            "/api/auth/creator/signup",
            None,
            serde_json::json!({
                "email": "cass@example.com",
                "password": "a long password",
                "display_name": "Cass",
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let creator = json_body(response).await;
    let creator_token = creator["token"].as_str().unwrap().to_string();

    // Creator invites an editor
    let response = app
        .clone()
        .oneshot(json_request(
            "/api/invites",
            Some(&creator_token),
            serde_json::json!({ "editor_email": "editor@x.com" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let invite = json_body(response).await;
    let invite_token = invite["token"].as_str().unwrap().to_string();
    assert!(invite["invite_link"].as_str().unwrap().contains(&invite_token));

    // The public resolve route sees a live token
    let response = app
        .clone()
        .oneshot(
            Request::get(format!("/join/resolve?token={}", invite_token))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let resolved = json_body(response).await;
    assert_eq!(resolved["editor_email"], "editor@x.com");

    // Editor signs up presenting the token and gets bound
    let response = app
        .clone()
        .oneshot(json_request(
            "/api/auth/editor/signup",
            None,
            serde_json::json!({
                "email": "editor@x.com",
                "password": "another long password",
                "invite_token": invite_token,
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let editor = json_body(response).await;
    let editor_token = editor["token"].as_str().unwrap().to_string();
    assert_eq!(editor["joined_creator_id"], creator["account"]["id"]);

    // Editor submits a draft
    let response = app
        .clone()
        .oneshot(multipart_draft("/api/videos", &editor_token, "Draft 1"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let video = json_body(response).await;
    assert_eq!(video["status"], "pending");
    let video_id = video["id"].as_str().unwrap().to_string();

    // Creator sees it pending, then approves; the approval publishes
    let response = app
        .clone()
        .oneshot(
            Request::get("/api/videos/pending")
                .header(header::AUTHORIZATION, format!("Bearer {}", creator_token))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let pending = json_body(response).await;
    assert_eq!(pending.as_array().unwrap().len(), 1);

    let response = app
        .clone()
        .oneshot(
            Request::post(format!("/api/videos/{}/approve", video_id))
                .header(header::AUTHORIZATION, format!("Bearer {}", creator_token))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let approved = json_body(response).await;
    assert_eq!(approved["status"], "uploaded");
    assert_eq!(approved["external_id"], "yt123");

    // A second approve is rejected as an illegal transition
    let response = app
        .clone()
        .oneshot(
            Request::post(format!("/api/videos/{}/approve", video_id))
                .header(header::AUTHORIZATION, format!("Bearer {}", creator_token))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CONFLICT);
    let conflict = json_body(response).await;
    assert_eq!(conflict["code"], "invalid_transition");
}

#[tokio::test]
async fn requests_without_tokens_are_unauthorized() {
    let app = test_router();

    let response = app
        .clone()
        .oneshot(Request::get("/api/videos").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let response = app
        .oneshot(json_request(
            "/api/invites",
            None,
            serde_json::json!({ "editor_email": "editor@x.com" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn unknown_invite_token_is_not_found() {
    let app = test_router();

    let response = app
        .oneshot(
            Request::get(format!("/join/resolve?token={}", "0a".repeat(32)))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body = json_body(response).await;
    assert_eq!(body["code"], "invite_not_found");
}

#[tokio::test]
async fn signin_rejects_wrong_password() {
    let app = test_router();

    let response = app
        .clone()
        .oneshot(json_request(
            "/api/auth/creator/signup",
            None,
            serde_json::json!({
                "email": "cass@example.com",
                "password": "a long password",
                "display_name": "Cass",
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    let response = app
        .clone()
        .oneshot(json_request(
            "/api/auth/creator/signin",
            None,
            serde_json::json!({
                "email": "cass@example.com",
                "password": "not the password",
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let response = app
        .oneshot(json_request(
            "/api/auth/creator/signin",
            None,
            serde_json::json!({
                "email": "cass@example.com",
                "password": "a long password",
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}
