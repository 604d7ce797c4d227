// Business logic services
// Webhook verification pipeline and the analytics collector client

pub mod analytics;
pub mod webhook_service;

pub use analytics::{AnalyticsSink, ForwardError, ForwardOutcome, OpenPanelClient};
pub use webhook_service::{Delivery, WebhookOutcome, WebhookService};
