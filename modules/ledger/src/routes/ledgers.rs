//! Ledger API routes
//!
//! - Create / update / delete a day's ledger (one atomic transaction each)
//! - Read a ledger by id or by project and date
//! - Preview the opening balance a new ledger would receive

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use chrono::NaiveDate;
use std::sync::Arc;
use uuid::Uuid;

use super::{ApiError, AppState};
use crate::contracts::ledger_v1::{CreateLedgerRequest, OpeningBalanceQuery, UpdateLedgerRequest};
use crate::metrics::Metrics;
use crate::repos::ledger_repo::LedgerWithLines;
use crate::services::balance_calculator::{self, OpeningBalance};
use crate::services::ledger_service;

/// Handler for POST /api/projects/{project_id}/ledgers
pub async fn create_ledger(
    State(state): State<Arc<AppState>>,
    Path(project_id): Path<Uuid>,
    Json(request): Json<CreateLedgerRequest>,
) -> Result<(StatusCode, Json<LedgerWithLines>), ApiError> {
    let started = Metrics::timer();
    let result =
        ledger_service::create_ledger(&state.pool, state.tx_timeout, project_id, &request).await;
    state.metrics.observe_write("create_ledger", started, &result);

    Ok((StatusCode::CREATED, Json(result?)))
}

/// Handler for PUT /api/ledgers/{ledger_id}
///
/// The request's `lines` replace the ledger's line set wholesale.
pub async fn update_ledger(
    State(state): State<Arc<AppState>>,
    Path(ledger_id): Path<Uuid>,
    Json(request): Json<UpdateLedgerRequest>,
) -> Result<Json<LedgerWithLines>, ApiError> {
    let started = Metrics::timer();
    let result =
        ledger_service::update_ledger(&state.pool, state.tx_timeout, ledger_id, &request).await;
    state.metrics.observe_write("update_ledger", started, &result);

    Ok(Json(result?))
}

/// Handler for DELETE /api/ledgers/{ledger_id}
pub async fn delete_ledger(
    State(state): State<Arc<AppState>>,
    Path(ledger_id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    let started = Metrics::timer();
    let result = ledger_service::delete_ledger(&state.pool, state.tx_timeout, ledger_id).await;
    state.metrics.observe_write("delete_ledger", started, &result);

    result?;
    Ok(StatusCode::NO_CONTENT)
}

/// Handler for GET /api/ledgers/{ledger_id}
pub async fn get_ledger(
    State(state): State<Arc<AppState>>,
    Path(ledger_id): Path<Uuid>,
) -> Result<Json<LedgerWithLines>, ApiError> {
    Ok(Json(ledger_service::get_ledger(&state.pool, ledger_id).await?))
}

/// Handler for GET /api/projects/{project_id}/ledgers
pub async fn list_ledgers(
    State(state): State<Arc<AppState>>,
    Path(project_id): Path<Uuid>,
) -> Result<Json<Vec<LedgerWithLines>>, ApiError> {
    Ok(Json(ledger_service::list_ledgers(&state.pool, project_id).await?))
}

/// Handler for GET /api/projects/{project_id}/ledgers/by-date/{date}
pub async fn get_ledger_by_date(
    State(state): State<Arc<AppState>>,
    Path((project_id, date)): Path<(Uuid, NaiveDate)>,
) -> Result<Json<LedgerWithLines>, ApiError> {
    Ok(Json(
        ledger_service::get_ledger_by_date(&state.pool, project_id, date).await?,
    ))
}

/// Handler for GET /api/projects/{project_id}/opening-balance?date=YYYY-MM-DD
pub async fn get_opening_balance(
    State(state): State<Arc<AppState>>,
    Path(project_id): Path<Uuid>,
    Query(query): Query<OpeningBalanceQuery>,
) -> Result<Json<OpeningBalance>, ApiError> {
    Ok(Json(
        balance_calculator::opening_balance(&state.pool, project_id, query.date).await?,
    ))
}
