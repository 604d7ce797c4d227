//! Lemon Squeezy webhook payloads and the OpenPanel track envelope.

use serde::Serialize;
use serde_json::Value;

use crate::constants::{analytics, events};

/// Parsed webhook body.
///
/// Kept as a raw JSON tree: the provider's shape is not guaranteed, so every
/// read goes through a tolerant accessor instead of a strict struct.
#[derive(Debug, Clone)]
pub struct WebhookPayload(Value);

impl WebhookPayload {
    pub fn from_slice(raw: &[u8]) -> Result<Self, serde_json::Error> {
        serde_json::from_slice(raw).map(WebhookPayload)
    }

    /// `meta.event_name`, or `None` when it is absent, `null`, `false`, `0` or empty.
    pub fn event_name(&self) -> Option<&Value> {
        self.0
            .pointer("/meta/event_name")
            .filter(|value| is_truthy(value))
    }

    /// A raw node of `data.attributes`, passed through untouched.
    pub fn attribute(&self, key: &str) -> Option<&Value> {
        self.0
            .pointer("/data/attributes")
            .and_then(|attributes| attributes.get(key))
    }

    pub fn forwarded_properties(&self) -> ForwardedProperties {
        ForwardedProperties {
            user_name: self.attribute("user_name").cloned(),
            user_email: self.attribute("user_email").cloned(),
            subtotal_usd: self.attribute("subtotal_usd").cloned(),
        }
    }
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::String(s) => !s.is_empty(),
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// Semantic event name sent to the analytics collector
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TrackingEvent {
    OrderCreated,
    SubscriptionCreatedTest,
}

/// Provider event name → tracking event. Anything else is ignored.
const EVENT_TABLE: &[(&str, TrackingEvent)] = &[
    (events::ORDER_CREATED, TrackingEvent::OrderCreated),
    (events::SUBSCRIPTION_CREATED, TrackingEvent::SubscriptionCreatedTest),
];

impl TrackingEvent {
    pub fn from_provider_event(name: &str) -> Option<Self> {
        EVENT_TABLE
            .iter()
            .find(|(provider, _)| *provider == name)
            .map(|(_, event)| *event)
    }

    /// Classify a raw `meta.event_name` node. Non-string names never match.
    pub fn classify(event_name: &Value) -> Option<Self> {
        event_name.as_str().and_then(Self::from_provider_event)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TrackingEvent::OrderCreated => events::ORDER_CREATED,
            TrackingEvent::SubscriptionCreatedTest => events::SUBSCRIPTION_CREATED_TRACKING,
        }
    }
}

impl Serialize for TrackingEvent {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}

impl std::fmt::Display for TrackingEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// User and order fields relayed to analytics.
///
/// Values are not validated or coerced. An absent attribute is left out of
/// the serialized object; an explicit `null` is kept.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ForwardedProperties {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_name: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_email: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subtotal_usd: Option<Value>,
}

/// OpenPanel `track` request body
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrackRequest {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub payload: TrackPayload,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrackPayload {
    pub name: TrackingEvent,
    pub properties: ForwardedProperties,
}

impl TrackRequest {
    pub fn new(event: TrackingEvent, properties: ForwardedProperties) -> Self {
        Self {
            kind: analytics::TRACK_TYPE,
            payload: TrackPayload {
                name: event,
                properties,
            },
        }
    }

    pub fn event(&self) -> TrackingEvent {
        self.payload.name
    }
}
