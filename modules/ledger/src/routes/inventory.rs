//! Inventory receipt routes

use axum::{
    extract::{Path, State},
    Json,
};
use std::sync::Arc;
use uuid::Uuid;

use super::{ApiError, AppState};
use crate::repos::inventory_repo::InventoryReceipt;
use crate::services::inventory_service;

/// Handler for GET /api/projects/{project_id}/inventory-receipts
pub async fn list_inventory_receipts(
    State(state): State<Arc<AppState>>,
    Path(project_id): Path<Uuid>,
) -> Result<Json<Vec<InventoryReceipt>>, ApiError> {
    Ok(Json(
        inventory_service::list_inventory_receipts(&state.pool, project_id).await?,
    ))
}
