//! Stock view derived from ledger lines
//!
//! Receipts are written and removed only by the fan-out; this module reads them.

use sqlx::PgPool;
use uuid::Uuid;

use crate::error::LedgerResult;
use crate::repos::inventory_repo::{self, InventoryReceipt};

/// Inventory receipts produced by a project's ledgers, newest delivery first
pub async fn list_inventory_receipts(
    pool: &PgPool,
    project_id: Uuid,
) -> LedgerResult<Vec<InventoryReceipt>> {
    Ok(inventory_repo::list_by_project(pool, project_id).await?)
}
