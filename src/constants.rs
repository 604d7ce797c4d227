//! Application constants and configuration values.
//!
//! This module centralizes header names, route paths, the event allow-list
//! and default settings so they can be adjusted in one place.

/// Inbound webhook constants
pub mod webhook {
    /// Header carrying the hex HMAC-SHA256 signature of the raw body
    pub const SIGNATURE_HEADER: &str = "X-Signature";

    /// Primary webhook route
    pub const ROUTE: &str = "/webhooks/lemon-squeezy";

    /// Integration route kept for stores configured with a per-integration id
    pub const INTEGRATION_ROUTE: &str = "/api/v1/integrations/lemon-squeezy-webhook/{id}";

    /// Default maximum accepted raw body size (1 MiB)
    pub const DEFAULT_MAX_BODY_BYTES: usize = 1024 * 1024;

    /// Body returned for every accepted webhook, forwarded or ignored
    pub const OK_BODY: &str = "OK";
}

/// Provider event names and their tracking counterparts
pub mod events {
    /// Lemon Squeezy order event
    pub const ORDER_CREATED: &str = "order_created";

    /// Lemon Squeezy subscription event
    pub const SUBSCRIPTION_CREATED: &str = "subscription_created";

    /// Tracking name used for subscriptions while the funnel is being validated
    pub const SUBSCRIPTION_CREATED_TRACKING: &str = "subscription_created_test";
}

/// Analytics collector constants
pub mod analytics {
    /// Default OpenPanel track endpoint
    pub const DEFAULT_API_URL: &str = "https://api.openpanel.dev/track";

    /// Client id header expected by OpenPanel
    pub const CLIENT_ID_HEADER: &str = "openpanel-client-id";

    /// Client secret header expected by OpenPanel
    pub const CLIENT_SECRET_HEADER: &str = "openpanel-client-secret";

    /// Event envelope type for track calls
    pub const TRACK_TYPE: &str = "track";

    /// Default outbound timeout in milliseconds
    pub const DEFAULT_TIMEOUT_MS: u64 = 5_000;
}

/// Server defaults
pub mod server {
    /// Default listen port
    pub const DEFAULT_PORT: u16 = 8080;

    /// Default whole-request timeout in seconds
    pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

    /// Request id response header
    pub const REQUEST_ID_HEADER: &str = "x-request-id";
}
