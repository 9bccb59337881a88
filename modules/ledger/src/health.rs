use axum::{extract::State, http::StatusCode, Json};
use serde_json::{json, Value};
use std::sync::Arc;

use crate::routes::AppState;

/// Liveness: the process is up
pub async fn health() -> Json<Value> {
    Json(json!({
        "status": "healthy",
        "service": "ledger-rs",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

/// Readiness: the database answers
pub async fn ready(State(state): State<Arc<AppState>>) -> Result<Json<Value>, StatusCode> {
    sqlx::query("SELECT 1")
        .execute(&state.pool)
        .await
        .map_err(|e| {
            tracing::warn!(error = %e, "Readiness check failed");
            StatusCode::SERVICE_UNAVAILABLE
        })?;

    Ok(Json(json!({
        "status": "ready",
        "database": "connected"
    })))
}
