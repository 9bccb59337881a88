//! Repository for inventory receipts generated by ledger fan-out

use chrono::NaiveDate;
use serde::Serialize;
use sqlx::{FromRow, PgPool, Postgres, Transaction};
use uuid::Uuid;

use crate::domain::LineCategory;

/// Stock received on site, tied back to the ledger line that recorded it
#[derive(Debug, Clone, PartialEq, Serialize, FromRow)]
pub struct InventoryReceipt {
    pub id: Uuid,
    pub project_id: Uuid,
    pub ledger_id: Uuid,
    pub line_no: i32,
    pub item: String,
    pub category: LineCategory,
    pub quantity: f64,
    pub quantity_used: f64,
    pub quantity_remaining: f64,
    pub unit: String,
    pub supplier_id: Option<Uuid>,
    pub delivery_date: NaiveDate,
}

const RECEIPT_COLUMNS: &str = r#"
    id, project_id, ledger_id, line_no, item, category, quantity,
    quantity_used, quantity_remaining, unit, supplier_id, delivery_date
"#;

pub async fn insert_receipt(
    tx: &mut Transaction<'_, Postgres>,
    receipt: &InventoryReceipt,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        INSERT INTO inventory_receipts
            (id, project_id, ledger_id, line_no, item, category, quantity,
             quantity_used, quantity_remaining, unit, supplier_id, delivery_date)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
        "#,
    )
    .bind(receipt.id)
    .bind(receipt.project_id)
    .bind(receipt.ledger_id)
    .bind(receipt.line_no)
    .bind(&receipt.item)
    .bind(receipt.category)
    .bind(receipt.quantity)
    .bind(receipt.quantity_used)
    .bind(receipt.quantity_remaining)
    .bind(&receipt.unit)
    .bind(receipt.supplier_id)
    .bind(receipt.delivery_date)
    .execute(&mut **tx)
    .await?;

    Ok(())
}

/// Delete the receipt produced by one ledger line, returning it if it existed
pub async fn delete_for_line(
    tx: &mut Transaction<'_, Postgres>,
    ledger_id: Uuid,
    line_no: i32,
) -> Result<Option<InventoryReceipt>, sqlx::Error> {
    let sql = format!(
        r#"
        DELETE FROM inventory_receipts
        WHERE ledger_id = $1 AND line_no = $2
        RETURNING {RECEIPT_COLUMNS}
        "#
    );
    sqlx::query_as::<_, InventoryReceipt>(&sql)
        .bind(ledger_id)
        .bind(line_no)
        .fetch_optional(&mut **tx)
        .await
}

pub async fn list_by_project(
    pool: &PgPool,
    project_id: Uuid,
) -> Result<Vec<InventoryReceipt>, sqlx::Error> {
    let sql = format!(
        r#"
        SELECT {RECEIPT_COLUMNS} FROM inventory_receipts
        WHERE project_id = $1
        ORDER BY delivery_date DESC, ledger_id, line_no
        "#
    );
    sqlx::query_as::<_, InventoryReceipt>(&sql)
        .bind(project_id)
        .fetch_all(pool)
        .await
}

pub async fn list_by_ledger(
    pool: &PgPool,
    ledger_id: Uuid,
) -> Result<Vec<InventoryReceipt>, sqlx::Error> {
    let sql = format!(
        "SELECT {RECEIPT_COLUMNS} FROM inventory_receipts WHERE ledger_id = $1 ORDER BY line_no"
    );
    sqlx::query_as::<_, InventoryReceipt>(&sql)
        .bind(ledger_id)
        .fetch_all(pool)
        .await
}
