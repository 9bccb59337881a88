//! Supplier account routes

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use std::sync::Arc;
use uuid::Uuid;

use super::{ApiError, AppState};
use crate::contracts::ledger_v1::{CreateSupplierRequest, SupplierDepositRequest};
use crate::domain::Supplier;
use crate::metrics::Metrics;
use crate::repos::purchase_repo::SupplierPurchase;
use crate::repos::supplier_repo::SupplierDeposit;
use crate::services::supplier_service;

/// Handler for POST /api/projects/{project_id}/suppliers
pub async fn create_supplier(
    State(state): State<Arc<AppState>>,
    Path(project_id): Path<Uuid>,
    Json(request): Json<CreateSupplierRequest>,
) -> Result<(StatusCode, Json<Supplier>), ApiError> {
    let started = Metrics::timer();
    let result =
        supplier_service::create_supplier(&state.pool, state.tx_timeout, project_id, &request)
            .await;
    state.metrics.observe_write("create_supplier", started, &result);

    Ok((StatusCode::CREATED, Json(result?)))
}

pub async fn list_suppliers(
    State(state): State<Arc<AppState>>,
    Path(project_id): Path<Uuid>,
) -> Result<Json<Vec<Supplier>>, ApiError> {
    Ok(Json(supplier_service::list_suppliers(&state.pool, project_id).await?))
}

pub async fn get_supplier(
    State(state): State<Arc<AppState>>,
    Path(supplier_id): Path<Uuid>,
) -> Result<Json<Supplier>, ApiError> {
    Ok(Json(supplier_service::get_supplier(&state.pool, supplier_id).await?))
}

/// Handler for POST /api/suppliers/{supplier_id}/deposits
pub async fn record_supplier_deposit(
    State(state): State<Arc<AppState>>,
    Path(supplier_id): Path<Uuid>,
    Json(request): Json<SupplierDepositRequest>,
) -> Result<Json<Supplier>, ApiError> {
    let started = Metrics::timer();
    let result = supplier_service::record_supplier_deposit(
        &state.pool,
        state.tx_timeout,
        supplier_id,
        &request,
    )
    .await;
    state.metrics.observe_write("supplier_deposit", started, &result);

    Ok(Json(result?))
}

pub async fn list_supplier_deposits(
    State(state): State<Arc<AppState>>,
    Path(supplier_id): Path<Uuid>,
) -> Result<Json<Vec<SupplierDeposit>>, ApiError> {
    Ok(Json(supplier_service::list_deposits(&state.pool, supplier_id).await?))
}

pub async fn list_supplier_purchases(
    State(state): State<Arc<AppState>>,
    Path(supplier_id): Path<Uuid>,
) -> Result<Json<Vec<SupplierPurchase>>, ApiError> {
    Ok(Json(supplier_service::list_purchases(&state.pool, supplier_id).await?))
}
