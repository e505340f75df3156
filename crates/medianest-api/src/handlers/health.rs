//! Health check handler.

use axum::Json;
use axum::extract::State;
use tracing::warn;

use medianest_entity::action::ActionResponse;

use crate::dto::HealthResponse;
use crate::state::AppState;

/// GET /api/health
pub async fn health_check(State(state): State<AppState>) -> Json<ActionResponse<HealthResponse>> {
    let storage_ok = match state.stores.health_check().await {
        Ok(ok) => ok,
        Err(e) => {
            warn!(error = %e, "Storage health check failed");
            false
        }
    };

    Json(ActionResponse::ok(HealthResponse {
        status: if storage_ok { "ok" } else { "degraded" }.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_seconds: state.started_at.elapsed().as_secs(),
        storage_ok,
    }))
}
