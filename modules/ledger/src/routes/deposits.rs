//! Project cash deposit routes

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use std::sync::Arc;
use uuid::Uuid;

use super::{ApiError, AppState};
use crate::contracts::ledger_v1::RecordCashDepositRequest;
use crate::metrics::Metrics;
use crate::repos::cash_deposit_repo::CashDeposit;
use crate::services::cash_deposit_service;

/// Handler for POST /api/projects/{project_id}/cash-deposits
pub async fn record_cash_deposit(
    State(state): State<Arc<AppState>>,
    Path(project_id): Path<Uuid>,
    Json(request): Json<RecordCashDepositRequest>,
) -> Result<(StatusCode, Json<CashDeposit>), ApiError> {
    let started = Metrics::timer();
    let result = cash_deposit_service::record_cash_deposit(
        &state.pool,
        state.tx_timeout,
        project_id,
        &request,
    )
    .await;
    state.metrics.observe_write("cash_deposit", started, &result);

    Ok((StatusCode::CREATED, Json(result?)))
}

pub async fn list_cash_deposits(
    State(state): State<Arc<AppState>>,
    Path(project_id): Path<Uuid>,
) -> Result<Json<Vec<CashDeposit>>, ApiError> {
    Ok(Json(
        cash_deposit_service::list_cash_deposits(&state.pool, project_id).await?,
    ))
}
