//! Health check handler.

use axum::Json;
use axum::extract::State;

use crate::dto::response::{ApiResponse, HealthResponse};
use crate::state::AppState;

/// GET /api/health
pub async fn health(State(state): State<AppState>) -> Json<ApiResponse<HealthResponse>> {
    let (status, database) = match (&state.stores.pool, state.stores.ping().await) {
        (None, _) => ("ok", "memory"),
        (Some(_), Ok(())) => ("ok", "connected"),
        (Some(_), Err(e)) => {
            tracing::warn!(error = %e, "Database ping failed");
            ("degraded", "unreachable")
        }
    };

    Json(ApiResponse::ok(HealthResponse {
        status: status.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        database: database.to_string(),
        notifications: state.dispatcher.is_enabled(),
    }))
}
