//! Router configuration.

use axum::{
    http::StatusCode,
    middleware::from_fn,
    response::Json,
    routing::{any, get},
    Router,
};
use std::time::Duration;
use tower::ServiceBuilder;
use tower_http::{timeout::TimeoutLayer, trace::TraceLayer};
use utoipa::OpenApi;

use crate::app_state::AppState;
use crate::constants::webhook;
use crate::handlers::{health, metrics as metrics_handlers, webhook as webhook_handlers};
use crate::middleware::{metrics_middleware, request_logger_middleware};
use crate::openapi::ApiDoc;

/// Build the application router.
///
/// Webhook routes accept every method so that non-POST requests get the
/// handler's own 405 body instead of axum's empty one.
pub fn build_router(app_state: AppState) -> Router {
    let request_timeout = Duration::from_secs(app_state.config.request_timeout);

    let webhooks = Router::new()
        .route(webhook::ROUTE, any(webhook_handlers::lemon_squeezy_webhook))
        .route(
            webhook::INTEGRATION_ROUTE,
            any(webhook_handlers::lemon_squeezy_integration_webhook),
        );

    let operations = Router::new()
        .route("/health", get(health::health_check))
        .route("/metrics", get(metrics_handlers::get_prometheus_metrics))
        .route("/api/docs/openapi.json", get(openapi_json));

    webhooks
        .merge(operations)
        .route_layer(from_fn(metrics_middleware))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(TimeoutLayer::with_status_code(
                    StatusCode::REQUEST_TIMEOUT,
                    request_timeout,
                ))
                .layer(from_fn(request_logger_middleware)),
        )
        .with_state(app_state)
}

async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}
