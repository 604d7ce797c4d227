use metrics::counter;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info};

use crate::error::{ApiError, Result};
use crate::models::{TrackRequest, TrackingEvent, WebhookPayload};
use crate::services::analytics::{AnalyticsSink, ForwardOutcome};
use crate::utils::verify_signature;

/// How the best-effort forward of a relayed event ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delivery {
    Delivered,
    Skipped,
    Failed,
}

impl Delivery {
    pub fn as_str(&self) -> &'static str {
        match self {
            Delivery::Delivered => "delivered",
            Delivery::Skipped => "skipped",
            Delivery::Failed => "failed",
        }
    }
}

impl From<ForwardOutcome> for Delivery {
    fn from(outcome: ForwardOutcome) -> Self {
        match outcome {
            ForwardOutcome::Delivered => Delivery::Delivered,
            ForwardOutcome::Skipped => Delivery::Skipped,
        }
    }
}

/// Successful end states of a webhook. Both are answered with 200 OK.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WebhookOutcome {
    /// Event name is outside the allow-list
    Ignored { event_name: String },
    Relayed {
        event: TrackingEvent,
        delivery: Delivery,
    },
}

impl WebhookOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            WebhookOutcome::Ignored { .. } => "ignored",
            WebhookOutcome::Relayed { .. } => "relayed",
        }
    }
}

/// Verifies, classifies and relays Lemon Squeezy webhooks.
///
/// Holds no per-request state; clones share the same sink.
#[derive(Clone)]
pub struct WebhookService {
    secret: Option<Arc<str>>,
    sink: Arc<dyn AnalyticsSink>,
    forward_timeout: Duration,
}

impl WebhookService {
    pub fn new(
        secret: Option<String>,
        sink: Arc<dyn AnalyticsSink>,
        forward_timeout: Duration,
    ) -> Self {
        Self {
            secret: secret.map(Arc::from),
            sink,
            forward_timeout,
        }
    }

    pub fn has_secret(&self) -> bool {
        self.secret.is_some()
    }

    pub fn analytics_configured(&self) -> bool {
        self.sink.is_configured()
    }

    /// Run a raw webhook body through signature check, parsing and relay.
    ///
    /// `signature` is the raw `X-Signature` header value; an empty value
    /// counts as missing. Forward failures never produce an `Err`.
    pub async fn process(&self, signature: Option<&[u8]>, body: &[u8]) -> Result<WebhookOutcome> {
        let signature = signature
            .filter(|value| !value.is_empty())
            .ok_or(ApiError::MissingSignature)?;

        let secret = self.secret.as_deref().ok_or_else(|| {
            ApiError::Configuration("LEMON_SQUEEZY_WEBHOOK_SECRET not configured".to_string())
        })?;

        let is_valid = verify_signature(secret, body, signature)
            .map_err(|e| ApiError::Configuration(format!("Invalid webhook secret: {}", e)))?;
        if !is_valid {
            return Err(ApiError::InvalidSignature);
        }

        let payload =
            WebhookPayload::from_slice(body).map_err(|e| ApiError::InvalidJson(e.to_string()))?;

        let event_name = payload.event_name().ok_or(ApiError::MissingEventName)?;

        let Some(event) = TrackingEvent::classify(event_name) else {
            info!(event_name = %event_name, "Ignoring unhandled webhook event");
            return Ok(WebhookOutcome::Ignored {
                event_name: event_name
                    .as_str()
                    .map(str::to_string)
                    .unwrap_or_else(|| event_name.to_string()),
            });
        };

        let request = TrackRequest::new(event, payload.forwarded_properties());
        let delivery = self.forward(&request).await;

        Ok(WebhookOutcome::Relayed { event, delivery })
    }

    /// Single bounded attempt. The result is logged and then discarded.
    async fn forward(&self, request: &TrackRequest) -> Delivery {
        let delivery = match tokio::time::timeout(self.forward_timeout, self.sink.track(request))
            .await
        {
            Ok(Ok(outcome)) => {
                if outcome == ForwardOutcome::Skipped {
                    error!(
                        event = %request.event(),
                        "OpenPanel credentials not configured, event not forwarded"
                    );
                } else {
                    debug!(event = %request.event(), "Webhook event forwarded");
                }
                Delivery::from(outcome)
            }
            Ok(Err(e)) => {
                error!(event = %request.event(), error = %e, "OpenPanel tracking failed");
                Delivery::Failed
            }
            Err(_) => {
                error!(
                    event = %request.event(),
                    timeout_ms = self.forward_timeout.as_millis() as u64,
                    "OpenPanel tracking timed out"
                );
                Delivery::Failed
            }
        };

        counter!(
            "analytics_forward_total",
            "event" => request.event().as_str(),
            "result" => delivery.as_str()
        )
        .increment(1);

        delivery
    }
}
