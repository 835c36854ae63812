use axum::{extract::State, http::StatusCode, Json};
use serde_json::{json, Value};

use crate::registry::HealthStatus;
use crate::state::AppState;

/// GET /health
/// Aggregated agent health. Critical registries answer 503 so load balancers
/// can drain the instance.
pub async fn health_handler(State(state): State<AppState>) -> (StatusCode, Json<Value>) {
    let health = state.registry.health().await;
    let status = match health.status {
        HealthStatus::Critical => StatusCode::SERVICE_UNAVAILABLE,
        HealthStatus::Healthy | HealthStatus::Degraded => StatusCode::OK,
    };
    (
        status,
        Json(json!({
            "status": health.status,
            "agents": health.counts,
            "version": env!("CARGO_PKG_VERSION"),
            "service": env!("CARGO_PKG_NAME"),
        })),
    )
}
