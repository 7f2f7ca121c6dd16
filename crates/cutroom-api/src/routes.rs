//! API routes.

use std::sync::Arc;

use axum::extract::DefaultBodyLimit;
use axum::middleware;
use axum::routing::{get, post};
use axum::Router;
use metrics_exporter_prometheus::PrometheusHandle;
use tower_http::limit::RequestBodyLimitLayer;

use crate::handlers::auth::{signin, signup};
use crate::handlers::invites::{create_invite, list_invites, resolve_invite};
use crate::handlers::videos::{
    approve_video, get_video, list_pending, list_videos, publish_video, reject_video,
    submit_video,
};
use crate::handlers::{health, ready};
use crate::metrics::metrics_middleware;
use crate::middleware::{
    cors_layer, rate_limit_middleware, request_id, request_logging, security_headers,
    RateLimiterCache,
};
use crate::state::AppState;

/// Create the API router.
pub fn create_router(state: AppState, metrics_handle: Option<PrometheusHandle>) -> Router {
    let auth_routes = Router::new()
        .route("/auth/:role/signup", post(signup))
        .route("/auth/:role/signin", post(signin));

    let invite_routes = Router::new().route("/invites", post(create_invite).get(list_invites));

    let video_routes = Router::new()
        .route("/videos", post(submit_video).get(list_videos))
        .route("/videos/pending", get(list_pending))
        .route("/videos/:video_id", get(get_video))
        .route("/videos/:video_id/approve", post(approve_video))
        .route("/videos/:video_id/reject", post(reject_video))
        .route("/videos/:video_id/publish", post(publish_video));

    let api_routes = Router::new()
        .merge(auth_routes)
        .merge(invite_routes)
        .merge(video_routes);

    // Public invite resolution. Rate-limited per IP so the 256-bit token
    // space cannot be probed at speed.
    let resolve_limiter = Arc::new(RateLimiterCache::new(state.config.resolve_rate_limit_rps));
    let resolve_routes = Router::new()
        .route("/join/resolve", get(resolve_invite))
        .layer(middleware::from_fn_with_state(
            resolve_limiter,
            rate_limit_middleware,
        ));

    let health_routes = Router::new()
        .route("/health", get(health))
        .route("/ready", get(ready));

    // Metrics endpoint (if enabled)
    let metrics_routes = if let Some(handle) = metrics_handle {
        Router::new().route("/metrics", get(move || async move { handle.render() }))
    } else {
        Router::new()
    };

    Router::new()
        .nest("/api", api_routes)
        .merge(resolve_routes)
        .merge(health_routes)
        .merge(metrics_routes)
        // Raise axum's built-in extractor limit too, or draft uploads would
        // cap at its 2MB default
        .layer(DefaultBodyLimit::max(state.config.max_body_size))
        .layer(RequestBodyLimitLayer::new(state.config.max_body_size))
        .layer(middleware::from_fn(metrics_middleware))
        .layer(middleware::from_fn(security_headers))
        .layer(middleware::from_fn(request_id))
        .layer(middleware::from_fn(request_logging))
        .layer(cors_layer(&state.config.cors_origins))
        .with_state(state)
}
