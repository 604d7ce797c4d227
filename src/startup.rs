//! Application startup and initialization logic.

use anyhow::Result;
use std::sync::Arc;
use tracing::{info, warn};

use crate::app_state::AppState;
use crate::config::Config;
use crate::services::{AnalyticsSink, OpenPanelClient};

/// Initialize services and create the AppState.
pub fn initialize_app(config: &Config) -> Result<AppState> {
    // Initialize Prometheus metrics exporter
    let metrics_handle = metrics_exporter_prometheus::PrometheusBuilder::new()
        .install_recorder()
        .map_err(|e| anyhow::anyhow!("Failed to install Prometheus recorder: {}", e))?;
    info!("Prometheus metrics initialized");

    if config.webhook.secret.is_none() {
        warn!(
            "LEMON_SQUEEZY_WEBHOOK_SECRET not configured. Every webhook will be rejected with 500"
        );
    }

    let openpanel = OpenPanelClient::new(&config.analytics)
        .map_err(|e| anyhow::anyhow!("Failed to build OpenPanel client: {}", e))?;

    if openpanel.is_configured() {
        info!(
            url = %config.analytics.api_url,
            timeout_ms = config.analytics.timeout_ms,
            "OpenPanel client initialized"
        );
    } else {
        warn!("OpenPanel credentials not configured. Webhook events will not be forwarded");
    }

    Ok(AppState::new(config.clone(), Arc::new(openpanel)).with_metrics(metrics_handle))
}
