//! HTTP surface for the ledger module
//!
//! Handlers are thin: decode, call one service function, record the write
//! metric, encode. All error-to-status mapping lives in [`ApiError`].

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::Serialize;
use serde_json::{json, Value};
use sqlx::PgPool;
use std::sync::Arc;
use std::time::Duration;
use tower_http::cors::CorsLayer;

use crate::error::{LedgerError, NotFoundKind};
use crate::health::{health, ready};
use crate::metrics::Metrics;

pub mod deposits;
pub mod inventory;
pub mod ledgers;
pub mod metrics;
pub mod suppliers;

/// Shared handler state
#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub tx_timeout: Duration,
    pub metrics: Metrics,
}

/// Build the module router
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/health", get(health))
        .route("/api/ready", get(ready))
        .route("/metrics", get(metrics::render_metrics))
        .route(
            "/api/projects/{project_id}/ledgers",
            get(ledgers::list_ledgers).post(ledgers::create_ledger),
        )
        .route(
            "/api/projects/{project_id}/ledgers/by-date/{date}",
            get(ledgers::get_ledger_by_date),
        )
        .route(
            "/api/projects/{project_id}/opening-balance",
            get(ledgers::get_opening_balance),
        )
        .route(
            "/api/ledgers/{ledger_id}",
            get(ledgers::get_ledger)
                .put(ledgers::update_ledger)
                .delete(ledgers::delete_ledger),
        )
        .route(
            "/api/projects/{project_id}/cash-deposits",
            get(deposits::list_cash_deposits).post(deposits::record_cash_deposit),
        )
        .route(
            "/api/projects/{project_id}/inventory-receipts",
            get(inventory::list_inventory_receipts),
        )
        .route(
            "/api/projects/{project_id}/suppliers",
            get(suppliers::list_suppliers).post(suppliers::create_supplier),
        )
        .route("/api/suppliers/{supplier_id}", get(suppliers::get_supplier))
        .route(
            "/api/suppliers/{supplier_id}/deposits",
            get(suppliers::list_supplier_deposits).post(suppliers::record_supplier_deposit),
        )
        .route(
            "/api/suppliers/{supplier_id}/purchases",
            get(suppliers::list_supplier_purchases),
        )
        .with_state(state)
        .layer(
            CorsLayer::new()
                .allow_origin(tower_http::cors::Any)
                .allow_methods(tower_http::cors::Any)
                .allow_headers(tower_http::cors::Any),
        )
}

/// Error response body
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub kind: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Value>,
}

/// Ledger error rendered as an HTTP response
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub body: ErrorResponse,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(self.body)).into_response()
    }
}

impl From<LedgerError> for ApiError {
    fn from(error: LedgerError) -> Self {
        let kind = error.kind();
        let (status, details) = match &error {
            LedgerError::DuplicateLedgerDate { project_id, date } => (
                StatusCode::CONFLICT,
                Some(json!({ "project_id": project_id, "date": date })),
            ),
            LedgerError::InsufficientSupplierBalance {
                supplier_id,
                requested_minor,
                available_minor,
                shortfall_minor,
            } => (
                StatusCode::UNPROCESSABLE_ENTITY,
                Some(json!({
                    "supplier_id": supplier_id,
                    "requested_minor": requested_minor,
                    "available_minor": available_minor,
                    "shortfall_minor": shortfall_minor,
                })),
            ),
            LedgerError::SupplierState { supplier_id, .. } => (
                StatusCode::UNPROCESSABLE_ENTITY,
                Some(json!({ "supplier_id": supplier_id })),
            ),
            LedgerError::NotFound(what) => (StatusCode::NOT_FOUND, Some(not_found_details(what))),
            LedgerError::Validation(_) => (StatusCode::BAD_REQUEST, None),
            LedgerError::Timeout { after_ms } => (
                StatusCode::SERVICE_UNAVAILABLE,
                Some(json!({ "after_ms": after_ms, "retryable": true })),
            ),
            LedgerError::Database(e) => {
                tracing::error!(error = %e, "Database error while serving request");
                (StatusCode::INTERNAL_SERVER_ERROR, None)
            }
        };

        let message = match &error {
            // Don't leak internal details
            LedgerError::Database(_) => "Database error".to_string(),
            other => other.to_string(),
        };

        ApiError {
            status,
            body: ErrorResponse {
                error: message,
                kind,
                details,
            },
        }
    }
}

fn not_found_details(what: &NotFoundKind) -> Value {
    match what {
        NotFoundKind::Ledger(id) => json!({ "ledger_id": id }),
        NotFoundKind::Supplier(id) => json!({ "supplier_id": id }),
        NotFoundKind::LedgerOnDate(project_id, date) => {
            json!({ "project_id": project_id, "date": date })
        }
    }
}
