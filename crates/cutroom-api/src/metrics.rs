//! Prometheus metrics for the API server.

use std::time::Instant;

use axum::body::Body;
use axum::http::{Request, Response};
use axum::middleware::Next;
use metrics::{counter, histogram};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};

/// Initialize the Prometheus metrics recorder.
/// Returns a handle that can be used to render metrics.
pub fn init_metrics() -> PrometheusHandle {
    PrometheusBuilder::new()
        .install_recorder()
        .expect("Failed to install Prometheus recorder")
}

/// Metric names as constants for consistency.
pub mod names {
    // HTTP metrics
    pub const HTTP_REQUESTS_TOTAL: &str = "cutroom_http_requests_total";
    pub const HTTP_REQUEST_DURATION_SECONDS: &str = "cutroom_http_request_duration_seconds";

    // Domain metrics
    pub const VIDEOS_SUBMITTED_TOTAL: &str = "cutroom_videos_submitted_total";
    pub const REVIEW_DECISIONS_TOTAL: &str = "cutroom_review_decisions_total";
    pub const PUBLISH_ATTEMPTS_TOTAL: &str = "cutroom_publish_attempts_total";
    pub const PUBLISH_FAILURES_TOTAL: &str = "cutroom_publish_failures_total";
    pub const INVITES_CREATED_TOTAL: &str = "cutroom_invites_created_total";
    pub const INVITES_ACCEPTED_TOTAL: &str = "cutroom_invites_accepted_total";

    // Rate limiting
    pub const RATE_LIMIT_HITS_TOTAL: &str = "cutroom_rate_limit_hits_total";
}

/// HTTP metrics middleware: request counter + duration histogram.
pub async fn metrics_middleware(request: Request<Body>, next: Next) -> Response<Body> {
    let method = request.method().to_string();
    let path = request.uri().path().to_string();
    let start = Instant::now();

    let response = next.run(request).await;

    let status = response.status().as_u16().to_string();
    counter!(
        names::HTTP_REQUESTS_TOTAL,
        "method" => method.clone(),
        "path" => path.clone(),
        "status" => status
    )
    .increment(1);
    histogram!(
        names::HTTP_REQUEST_DURATION_SECONDS,
        "method" => method,
        "path" => path
    )
    .record(start.elapsed().as_secs_f64());

    response
}

/// Record a rate-limited request.
pub fn record_rate_limit_hit(path: &str) {
    counter!(names::RATE_LIMIT_HITS_TOTAL, "path" => path.to_string()).increment(1);
}
