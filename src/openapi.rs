use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Lemon Relay API",
        version = "0.1.0",
        description = "Verifies Lemon Squeezy webhooks and relays purchase events to OpenPanel",
        license(name = "MIT")
    ),
    paths(
        // Webhooks
        crate::handlers::webhook::lemon_squeezy_webhook,
        crate::handlers::webhook::lemon_squeezy_integration_webhook,

        // Operations
        crate::handlers::health::health_check,
        crate::handlers::metrics::get_prometheus_metrics,
    ),
    components(schemas(crate::handlers::health::HealthStatus)),
    tags(
        (name = "webhooks", description = "Payment provider webhooks"),
        (name = "health", description = "Service health"),
        (name = "metrics", description = "Prometheus metrics")
    )
)]
pub struct ApiDoc;
