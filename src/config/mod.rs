use anyhow::Result;
use std::env;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use crate::constants::{analytics, server, webhook};

/// Service configuration, resolved once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    pub environment: String,
    pub port: u16,
    pub request_timeout: u64,
    pub log_format: LogFormat,
    pub webhook: WebhookConfig,
    pub analytics: AnalyticsConfig,
}

/// Log output format for the tracing subscriber
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Pretty,
    Json,
}

impl FromStr for LogFormat {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "pretty" | "text" => Ok(LogFormat::Pretty),
            "json" => Ok(LogFormat::Json),
            other => Err(anyhow::anyhow!(
                "LOG_FORMAT must be 'pretty' or 'json', got '{}'",
                other
            )),
        }
    }
}

/// Inbound webhook settings.
///
/// The secret stays optional here: a missing secret is reported on every
/// webhook call as a server configuration error instead of skipping checks.
#[derive(Clone)]
pub struct WebhookConfig {
    pub secret: Option<String>,
    pub max_body_bytes: usize,
}

/// OpenPanel collector settings
#[derive(Clone)]
pub struct AnalyticsConfig {
    pub api_url: String,
    pub client_id: Option<String>,
    pub client_secret: Option<String>,
    pub timeout_ms: u64,
}

impl AnalyticsConfig {
    /// Both credentials, or `None` when either one is missing
    pub fn credentials(&self) -> Option<(&str, &str)> {
        match (&self.client_id, &self.client_secret) {
            (Some(id), Some(secret)) => Some((id.as_str(), secret.as_str())),
            _ => None,
        }
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

impl fmt::Debug for WebhookConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WebhookConfig")
            .field("secret", &redacted(&self.secret))
            .field("max_body_bytes", &self.max_body_bytes)
            .finish()
    }
}

impl fmt::Debug for AnalyticsConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AnalyticsConfig")
            .field("api_url", &self.api_url)
            .field("client_id", &self.client_id)
            .field("client_secret", &redacted(&self.client_secret))
            .field("timeout_ms", &self.timeout_ms)
            .finish()
    }
}

fn redacted(value: &Option<String>) -> &'static str {
    if value.is_some() {
        "<redacted>"
    } else {
        "<unset>"
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // Load .env file if it exists

        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build the configuration from an arbitrary key lookup.
    ///
    /// Blank values are treated as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        Ok(Config {
            environment: var("ENVIRONMENT").unwrap_or_else(|| "development".to_string()),
            port: parse_or(var("PORT"), server::DEFAULT_PORT, "PORT")?,
            request_timeout: parse_or(
                var("REQUEST_TIMEOUT_SECS"),
                server::DEFAULT_REQUEST_TIMEOUT_SECS,
                "REQUEST_TIMEOUT_SECS",
            )?,
            log_format: parse_or(var("LOG_FORMAT"), LogFormat::Pretty, "LOG_FORMAT")?,
            webhook: WebhookConfig {
                secret: var("LEMON_SQUEEZY_WEBHOOK_SECRET"),
                max_body_bytes: parse_or(
                    var("WEBHOOK_MAX_BODY_BYTES"),
                    webhook::DEFAULT_MAX_BODY_BYTES,
                    "WEBHOOK_MAX_BODY_BYTES",
                )?,
            },
            analytics: AnalyticsConfig {
                api_url: var("OPENPANEL_API_URL")
                    .unwrap_or_else(|| analytics::DEFAULT_API_URL.to_string()),
                client_id: var("OPENPANEL_CLIENT_ID"),
                client_secret: var("OPENPANEL_CLIENT_SECRET"),
                timeout_ms: parse_or(
                    var("OPENPANEL_TIMEOUT_MS"),
                    analytics::DEFAULT_TIMEOUT_MS,
                    "OPENPANEL_TIMEOUT_MS",
                )?,
            },
        })
    }
}

fn parse_or<T>(value: Option<String>, default: T, key: &str) -> Result<T>
where
    T: FromStr,
    T::Err: fmt::Display,
{
    match value {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|e| anyhow::anyhow!("{} has an invalid value '{}': {}", key, raw, e)),
        None => Ok(default),
    }
}
