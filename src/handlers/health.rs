use axum::{extract::State, response::Json};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::app_state::AppState;

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct HealthStatus {
    pub status: String,
    pub timestamp: chrono::DateTime<chrono::Utc>,
    pub version: String,
    pub environment: String,
    pub webhook_secret_configured: bool,
    pub analytics_configured: bool,
}

impl HealthStatus {
    pub fn from_state(state: &AppState) -> Self {
        let webhook_secret_configured = state.webhook_service.has_secret();
        let analytics_configured = state.webhook_service.analytics_configured();

        // A missing secret means every webhook fails; missing analytics
        // credentials only drop events
        let status = if !webhook_secret_configured {
            "unhealthy"
        } else if !analytics_configured {
            "degraded"
        } else {
            "healthy"
        };

        Self {
            status: status.to_string(),
            timestamp: chrono::Utc::now(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            environment: state.config.environment.clone(),
            webhook_secret_configured,
            analytics_configured,
        }
    }
}

/// Basic health check endpoint
#[utoipa::path(
    get,
    path = "/health",
    tag = "health",
    responses(
        (status = 200, description = "Service status and configuration flags", body = HealthStatus)
    )
)]
pub async fn health_check(State(state): State<AppState>) -> Json<HealthStatus> {
    Json(HealthStatus::from_state(&state))
}
