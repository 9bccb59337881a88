//! Repository for supplier purchases generated by ledger fan-out

use chrono::NaiveDate;
use serde::Serialize;
use sqlx::{FromRow, PgPool, Postgres, Transaction};
use uuid::Uuid;

/// One supplier-credit spend, tied back to the ledger line that produced it
#[derive(Debug, Clone, PartialEq, Serialize, FromRow)]
pub struct SupplierPurchase {
    pub id: Uuid,
    pub supplier_id: Uuid,
    pub project_id: Uuid,
    pub ledger_id: Uuid,
    pub line_no: i32,
    pub amount_minor: i64,
    pub item: String,
    pub purchase_date: NaiveDate,
}

pub async fn insert_purchase(
    tx: &mut Transaction<'_, Postgres>,
    purchase: &SupplierPurchase,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        INSERT INTO supplier_purchases
            (id, supplier_id, project_id, ledger_id, line_no, amount_minor, item, purchase_date)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
        "#,
    )
    .bind(purchase.id)
    .bind(purchase.supplier_id)
    .bind(purchase.project_id)
    .bind(purchase.ledger_id)
    .bind(purchase.line_no)
    .bind(purchase.amount_minor)
    .bind(&purchase.item)
    .bind(purchase.purchase_date)
    .execute(&mut **tx)
    .await?;

    Ok(())
}

/// Delete the purchase produced by one ledger line, returning it if it existed
pub async fn delete_for_line(
    tx: &mut Transaction<'_, Postgres>,
    ledger_id: Uuid,
    line_no: i32,
) -> Result<Option<SupplierPurchase>, sqlx::Error> {
    sqlx::query_as::<_, SupplierPurchase>(
        r#"
        DELETE FROM supplier_purchases
        WHERE ledger_id = $1 AND line_no = $2
        RETURNING id, supplier_id, project_id, ledger_id, line_no, amount_minor, item, purchase_date
        "#,
    )
    .bind(ledger_id)
    .bind(line_no)
    .fetch_optional(&mut **tx)
    .await
}

pub async fn list_by_supplier(
    pool: &PgPool,
    supplier_id: Uuid,
) -> Result<Vec<SupplierPurchase>, sqlx::Error> {
    sqlx::query_as::<_, SupplierPurchase>(
        r#"
        SELECT id, supplier_id, project_id, ledger_id, line_no, amount_minor, item, purchase_date
        FROM supplier_purchases
        WHERE supplier_id = $1
        ORDER BY purchase_date DESC, ledger_id, line_no
        "#,
    )
    .bind(supplier_id)
    .fetch_all(pool)
    .await
}

pub async fn list_by_ledger(
    pool: &PgPool,
    ledger_id: Uuid,
) -> Result<Vec<SupplierPurchase>, sqlx::Error> {
    sqlx::query_as::<_, SupplierPurchase>(
        r#"
        SELECT id, supplier_id, project_id, ledger_id, line_no, amount_minor, item, purchase_date
        FROM supplier_purchases
        WHERE ledger_id = $1
        ORDER BY line_no
        "#,
    )
    .bind(ledger_id)
    .fetch_all(pool)
    .await
}
