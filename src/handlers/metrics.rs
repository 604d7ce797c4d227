// Metrics endpoint for Prometheus

use axum::{
    extract::State,
    http::header,
    response::IntoResponse,
};

use crate::app_state::AppState;

/// Prometheus metrics endpoint
///
/// Renders nothing when no recorder was installed (tests, embedded use).
#[utoipa::path(
    get,
    path = "/metrics",
    tag = "metrics",
    responses(
        (status = 200, description = "Prometheus metrics", content_type = "text/plain")
    )
)]
pub async fn get_prometheus_metrics(State(state): State<AppState>) -> impl IntoResponse {
    let body = state
        .metrics_handle
        .as_ref()
        .map(|handle| handle.render())
        .unwrap_or_default();

    (
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        body,
    )
}
