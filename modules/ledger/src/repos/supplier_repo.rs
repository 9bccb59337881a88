//! Repository for supplier credit accounts and their deposits
//!
//! Balance columns are only written through [`store_balance`], which takes an
//! aggregate value that has already passed its invariant checks.

use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use sqlx::{FromRow, PgPool, Postgres, Transaction};
use uuid::Uuid;

use crate::domain::{Supplier, SupplierBalance};

/// Credit deposit made on a supplier account
#[derive(Debug, Clone, PartialEq, Serialize, FromRow)]
pub struct SupplierDeposit {
    pub id: Uuid,
    pub supplier_id: Uuid,
    pub amount_minor: i64,
    pub deposit_date: NaiveDate,
    pub note: Option<String>,
    pub created_at: DateTime<Utc>,
}

const SUPPLIER_COLUMNS: &str = r#"
    id, project_id, name, total_deposited_minor, total_spent_minor,
    current_balance_minor, created_at, updated_at
"#;

pub async fn insert_supplier(
    tx: &mut Transaction<'_, Postgres>,
    supplier_id: Uuid,
    project_id: Uuid,
    name: &str,
) -> Result<Supplier, sqlx::Error> {
    let sql = format!(
        r#"
        INSERT INTO suppliers (id, project_id, name)
        VALUES ($1, $2, $3)
        RETURNING {SUPPLIER_COLUMNS}
        "#
    );
    sqlx::query_as::<_, Supplier>(&sql)
        .bind(supplier_id)
        .bind(project_id)
        .bind(name)
        .fetch_one(&mut **tx)
        .await
}

pub async fn find_by_id(pool: &PgPool, supplier_id: Uuid) -> Result<Option<Supplier>, sqlx::Error> {
    let sql = format!("SELECT {SUPPLIER_COLUMNS} FROM suppliers WHERE id = $1");
    sqlx::query_as::<_, Supplier>(&sql)
        .bind(supplier_id)
        .fetch_optional(pool)
        .await
}

/// Read and row-lock a supplier within a transaction
///
/// The lock is held until the enclosing transaction ends, so a
/// read-check-decrement against the same supplier from another transaction
/// waits and then sees the committed balance.
pub async fn find_for_update_tx(
    tx: &mut Transaction<'_, Postgres>,
    supplier_id: Uuid,
) -> Result<Option<Supplier>, sqlx::Error> {
    let sql = format!("SELECT {SUPPLIER_COLUMNS} FROM suppliers WHERE id = $1 FOR UPDATE");
    sqlx::query_as::<_, Supplier>(&sql)
        .bind(supplier_id)
        .fetch_optional(&mut **tx)
        .await
}

/// Row-lock a set of suppliers in ascending id order
///
/// Returns the ids that exist. Taking every lock a transaction needs up front,
/// in one global order, keeps two ledgers touching the same suppliers from
/// deadlocking.
pub async fn lock_many_tx(
    tx: &mut Transaction<'_, Postgres>,
    supplier_ids: &[Uuid],
) -> Result<Vec<Uuid>, sqlx::Error> {
    if supplier_ids.is_empty() {
        return Ok(Vec::new());
    }

    sqlx::query_scalar::<_, Uuid>(
        r#"
        SELECT id FROM suppliers
        WHERE id = ANY($1)
        ORDER BY id
        FOR UPDATE
        "#,
    )
    .bind(supplier_ids)
    .fetch_all(&mut **tx)
    .await
}

pub async fn list_by_project(pool: &PgPool, project_id: Uuid) -> Result<Vec<Supplier>, sqlx::Error> {
    let sql = format!("SELECT {SUPPLIER_COLUMNS} FROM suppliers WHERE project_id = $1 ORDER BY name, id");
    sqlx::query_as::<_, Supplier>(&sql)
        .bind(project_id)
        .fetch_all(pool)
        .await
}

/// Persist an aggregate's running totals
pub async fn store_balance(
    tx: &mut Transaction<'_, Postgres>,
    supplier_id: Uuid,
    balance: &SupplierBalance,
) -> Result<Supplier, sqlx::Error> {
    let sql = format!(
        r#"
        UPDATE suppliers
        SET total_deposited_minor = $2,
            total_spent_minor = $3,
            current_balance_minor = $4,
            updated_at = NOW()
        WHERE id = $1
        RETURNING {SUPPLIER_COLUMNS}
        "#
    );
    sqlx::query_as::<_, Supplier>(&sql)
        .bind(supplier_id)
        .bind(balance.total_deposited_minor)
        .bind(balance.total_spent_minor)
        .bind(balance.current_balance_minor)
        .fetch_one(&mut **tx)
        .await
}

pub async fn insert_deposit(
    tx: &mut Transaction<'_, Postgres>,
    supplier_id: Uuid,
    amount_minor: i64,
    deposit_date: NaiveDate,
    note: Option<&str>,
) -> Result<SupplierDeposit, sqlx::Error> {
    sqlx::query_as::<_, SupplierDeposit>(
        r#"
        INSERT INTO supplier_deposits (id, supplier_id, amount_minor, deposit_date, note)
        VALUES ($1, $2, $3, $4, $5)
        RETURNING id, supplier_id, amount_minor, deposit_date, note, created_at
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(supplier_id)
    .bind(amount_minor)
    .bind(deposit_date)
    .bind(note)
    .fetch_one(&mut **tx)
    .await
}

pub async fn list_deposits(
    pool: &PgPool,
    supplier_id: Uuid,
) -> Result<Vec<SupplierDeposit>, sqlx::Error> {
    sqlx::query_as::<_, SupplierDeposit>(
        r#"
        SELECT id, supplier_id, amount_minor, deposit_date, note, created_at
        FROM supplier_deposits
        WHERE supplier_id = $1
        ORDER BY deposit_date, created_at
        "#,
    )
    .bind(supplier_id)
    .fetch_all(pool)
    .await
}
