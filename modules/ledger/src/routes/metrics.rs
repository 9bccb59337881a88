use axum::{extract::State, http::StatusCode, response::IntoResponse};
use std::sync::Arc;

use super::AppState;

pub async fn render_metrics(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    match state.metrics.render() {
        Ok(body) => (StatusCode::OK, body),
        Err(e) => (StatusCode::INTERNAL_SERVER_ERROR, format!("metrics error: {e}")),
    }
}
