//! Lemon Squeezy webhook endpoints.

use axum::{
    extract::{Path, Request, State},
    http::Method,
};
use http_body_util::LengthLimitError;
use metrics::counter;
use tracing::{debug, info};

use crate::app_state::AppState;
use crate::constants::webhook;
use crate::error::{ApiError, Result};

/// Receive a Lemon Squeezy event
/// POST /webhooks/lemon-squeezy
#[utoipa::path(
    post,
    path = "/webhooks/lemon-squeezy",
    tag = "webhooks",
    params(
        ("X-Signature" = String, Header, description = "Hex HMAC-SHA256 of the raw request body")
    ),
    request_body(content = String, description = "Raw Lemon Squeezy event", content_type = "application/json"),
    responses(
        (status = 200, description = "Event accepted (forwarded or ignored)", body = String, content_type = "text/plain"),
        (status = 400, description = "Invalid JSON or missing event name"),
        (status = 401, description = "Missing or invalid signature"),
        (status = 405, description = "Method not allowed"),
        (status = 413, description = "Payload too large"),
        (status = 500, description = "Server configuration error")
    )
)]
pub async fn lemon_squeezy_webhook(
    State(state): State<AppState>,
    request: Request,
) -> Result<&'static str> {
    handle_webhook(&state, None, request).await
}

/// Receive a Lemon Squeezy event on a per-integration URL
/// POST /api/v1/integrations/lemon-squeezy-webhook/{id}
#[utoipa::path(
    post,
    path = "/api/v1/integrations/lemon-squeezy-webhook/{id}",
    tag = "webhooks",
    params(
        ("id" = String, Path, description = "Integration identifier, logged only"),
        ("X-Signature" = String, Header, description = "Hex HMAC-SHA256 of the raw request body")
    ),
    request_body(content = String, description = "Raw Lemon Squeezy event", content_type = "application/json"),
    responses(
        (status = 200, description = "Event accepted (forwarded or ignored)", body = String, content_type = "text/plain"),
        (status = 400, description = "Invalid JSON or missing event name"),
        (status = 401, description = "Missing or invalid signature"),
        (status = 405, description = "Method not allowed"),
        (status = 413, description = "Payload too large"),
        (status = 500, description = "Server configuration error")
    )
)]
pub async fn lemon_squeezy_integration_webhook(
    State(state): State<AppState>,
    Path(integration_id): Path<String>,
    request: Request,
) -> Result<&'static str> {
    handle_webhook(&state, Some(&integration_id), request).await
}

async fn handle_webhook(
    state: &AppState,
    integration_id: Option<&str>,
    request: Request,
) -> Result<&'static str> {
    let result = process_request(state, integration_id, request).await;

    let outcome = match &result {
        Ok(outcome) => *outcome,
        Err(e) => e.error_type(),
    };
    counter!("webhook_requests_total", "outcome" => outcome).increment(1);

    result.map(|_| webhook::OK_BODY)
}

async fn process_request(
    state: &AppState,
    integration_id: Option<&str>,
    request: Request,
) -> Result<&'static str> {
    if request.method() != Method::POST {
        return Err(ApiError::MethodNotAllowed(request.method().to_string()));
    }

    let (parts, body) = request.into_parts();

    let signature = parts
        .headers
        .get(webhook::SIGNATURE_HEADER)
        .map(|value| value.as_bytes())
        .filter(|value| !value.is_empty())
        .ok_or(ApiError::MissingSignature)?;

    // Raw bytes only: the signature covers exactly what was sent
    let limit = state.config.webhook.max_body_bytes;
    let body = axum::body::to_bytes(body, limit).await.map_err(|e| {
        if is_length_limit(&e) {
            ApiError::PayloadTooLarge(limit)
        } else {
            ApiError::InvalidBody(e.to_string())
        }
    })?;

    debug!(
        integration_id = integration_id.unwrap_or("-"),
        body_len = body.len(),
        "Webhook body received"
    );

    let outcome = state.webhook_service.process(Some(signature), &body).await?;

    info!(
        integration_id = integration_id.unwrap_or("-"),
        outcome = ?outcome,
        "Webhook processed"
    );

    Ok(outcome.as_str())
}

fn is_length_limit(err: &axum::Error) -> bool {
    let mut source: Option<&(dyn std::error::Error + 'static)> = Some(err);
    while let Some(e) = source {
        if e.is::<LengthLimitError>() {
            return true;
        }
        source = e.source();
    }
    false
}
