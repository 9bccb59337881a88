//! Repository for project cash deposits

use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use sqlx::{FromRow, PgPool, Postgres, Transaction};
use uuid::Uuid;

/// Cash injected into a project outside of any ledger
#[derive(Debug, Clone, PartialEq, Serialize, FromRow)]
pub struct CashDeposit {
    pub id: Uuid,
    pub project_id: Uuid,
    pub amount_minor: i64,
    pub deposit_date: NaiveDate,
    pub method: String,
    pub reference: Option<String>,
    pub note: Option<String>,
    pub created_at: DateTime<Utc>,
}

pub async fn insert_deposit(
    tx: &mut Transaction<'_, Postgres>,
    project_id: Uuid,
    amount_minor: i64,
    deposit_date: NaiveDate,
    method: &str,
    reference: Option<&str>,
    note: Option<&str>,
) -> Result<CashDeposit, sqlx::Error> {
    sqlx::query_as::<_, CashDeposit>(
        r#"
        INSERT INTO cash_deposits (id, project_id, amount_minor, deposit_date, method, reference, note)
        VALUES ($1, $2, $3, $4, $5, $6, $7)
        RETURNING id, project_id, amount_minor, deposit_date, method, reference, note, created_at
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(project_id)
    .bind(amount_minor)
    .bind(deposit_date)
    .bind(method)
    .bind(reference)
    .bind(note)
    .fetch_one(&mut **tx)
    .await
}

pub async fn list_by_project(pool: &PgPool, project_id: Uuid) -> Result<Vec<CashDeposit>, sqlx::Error> {
    sqlx::query_as::<_, CashDeposit>(
        r#"
        SELECT id, project_id, amount_minor, deposit_date, method, reference, note, created_at
        FROM cash_deposits
        WHERE project_id = $1
        ORDER BY deposit_date DESC, created_at DESC
        "#,
    )
    .bind(project_id)
    .fetch_all(pool)
    .await
}

/// Sum of deposits dated within `[from, to]`; an open `from` means no lower bound
pub async fn sum_in_window(
    pool: &PgPool,
    project_id: Uuid,
    from: Option<NaiveDate>,
    to: NaiveDate,
) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar::<_, i64>(SUM_IN_WINDOW_SQL)
        .bind(project_id)
        .bind(from)
        .bind(to)
        .fetch_one(pool)
        .await
}

/// Sum of deposits dated within `[from, to]`, within a transaction
pub async fn sum_in_window_tx(
    tx: &mut Transaction<'_, Postgres>,
    project_id: Uuid,
    from: Option<NaiveDate>,
    to: NaiveDate,
) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar::<_, i64>(SUM_IN_WINDOW_SQL)
        .bind(project_id)
        .bind(from)
        .bind(to)
        .fetch_one(&mut **tx)
        .await
}

const SUM_IN_WINDOW_SQL: &str = r#"
    SELECT COALESCE(SUM(amount_minor), 0)::BIGINT
    FROM cash_deposits
    WHERE project_id = $1
      AND ($2::DATE IS NULL OR deposit_date >= $2)
      AND deposit_date <= $3
"#;
