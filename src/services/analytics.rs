//! Analytics collector client.
//!
//! The webhook pipeline only sees the [`AnalyticsSink`] trait, so tests can
//! substitute a fake collector for the OpenPanel HTTP client.

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info};

use crate::config::AnalyticsConfig;
use crate::constants::analytics;
use crate::models::TrackRequest;

/// Failure of a single forward. Never surfaced to the webhook caller.
#[derive(Debug, Error)]
pub enum ForwardError {
    #[error("Analytics request failed: {0}")]
    Transport(#[source] reqwest::Error),

    #[error("Analytics collector responded with status {0}")]
    Status(StatusCode),

    #[error("Analytics request timed out after {0:?}")]
    Timeout(Duration),

    #[error("Analytics sink error: {0}")]
    Sink(String),
}

/// Result of a forward that did not fail
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ForwardOutcome {
    Delivered,
    /// Collector credentials are not configured; nothing was sent
    Skipped,
}

/// Destination for tracking events
#[async_trait]
pub trait AnalyticsSink: Send + Sync {
    /// Send one track request. Implementations must not retry.
    async fn track(&self, request: &TrackRequest) -> Result<ForwardOutcome, ForwardError>;

    /// Whether forwards can actually reach a collector
    fn is_configured(&self) -> bool {
        true
    }
}

#[derive(Clone)]
struct Credentials {
    client_id: String,
    client_secret: String,
}

/// OpenPanel `track` API client
#[derive(Clone)]
pub struct OpenPanelClient {
    client: Client,
    api_url: String,
    credentials: Option<Credentials>,
    timeout: Duration,
}

impl OpenPanelClient {
    pub fn new(config: &AnalyticsConfig) -> Result<Self, reqwest::Error> {
        let timeout = config.timeout();
        let client = Client::builder().timeout(timeout).build()?;

        let credentials = config
            .credentials()
            .map(|(client_id, client_secret)| Credentials {
                client_id: client_id.to_string(),
                client_secret: client_secret.to_string(),
            });

        Ok(Self {
            client,
            api_url: config.api_url.clone(),
            credentials,
            timeout,
        })
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }
}

#[async_trait]
impl AnalyticsSink for OpenPanelClient {
    async fn track(&self, request: &TrackRequest) -> Result<ForwardOutcome, ForwardError> {
        let Some(credentials) = &self.credentials else {
            return Ok(ForwardOutcome::Skipped);
        };

        debug!(event = %request.event(), url = %self.api_url, "Sending OpenPanel track request");

        let response = self
            .client
            .post(&self.api_url)
            .header(analytics::CLIENT_ID_HEADER, &credentials.client_id)
            .header(analytics::CLIENT_SECRET_HEADER, &credentials.client_secret)
            .json(request)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    ForwardError::Timeout(self.timeout)
                } else {
                    ForwardError::Transport(e)
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(ForwardError::Status(status));
        }

        info!(event = %request.event(), "OpenPanel event tracked");
        Ok(ForwardOutcome::Delivered)
    }

    fn is_configured(&self) -> bool {
        self.credentials.is_some()
    }
}
