// Data models: inbound webhook payloads and outbound analytics requests

pub mod webhook;

pub use webhook::{ForwardedProperties, TrackPayload, TrackRequest, TrackingEvent, WebhookPayload};
