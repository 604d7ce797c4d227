//! Application state shared across all handlers.

use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::Arc;

use crate::config::Config;
use crate::services::{AnalyticsSink, WebhookService};

/// Application state shared across handlers.
///
/// Everything in here is immutable after startup, so requests never
/// contend on it.
#[derive(Clone)]
pub struct AppState {
    /// Application configuration
    pub config: Config,
    /// Webhook verification and relay pipeline
    pub webhook_service: WebhookService,
    /// Prometheus recorder handle, absent when no recorder is installed
    pub metrics_handle: Option<PrometheusHandle>,
}

impl AppState {
    /// Build state around an explicit analytics sink.
    pub fn new(config: Config, sink: Arc<dyn AnalyticsSink>) -> Self {
        let webhook_service = WebhookService::new(
            config.webhook.secret.clone(),
            sink,
            config.analytics.timeout(),
        );

        Self {
            config,
            webhook_service,
            metrics_handle: None,
        }
    }

    pub fn with_metrics(mut self, handle: PrometheusHandle) -> Self {
        self.metrics_handle = Some(handle);
        self
    }
}
