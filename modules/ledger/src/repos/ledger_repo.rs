//! Repository for daily ledgers and their lines
//!
//! A ledger owns its lines. Lines are only ever inserted as a full set and
//! deleted as a full set; nothing here addresses a single line.

use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use sqlx::{FromRow, PgPool, Postgres, Transaction};
use std::collections::HashMap;
use uuid::Uuid;

use crate::domain::{LedgerLine, LineInput, LineTotals};

/// Ledger header row
#[derive(Debug, Clone, PartialEq, Serialize, FromRow)]
pub struct Ledger {
    pub id: Uuid,
    pub project_id: Uuid,
    pub ledger_date: NaiveDate,
    pub opening_cash_minor: i64,
    pub closing_cash_minor: i64,
    pub total_cash_spent_minor: i64,
    pub total_supplier_spent_minor: i64,
    pub notes: Option<String>,
    pub submitted_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Ledger with its lines attached
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LedgerWithLines {
    #[serde(flatten)]
    pub ledger: Ledger,
    pub lines: Vec<LedgerLine>,
}

/// Values for a new ledger header
#[derive(Debug, Clone)]
pub struct LedgerInsert {
    pub id: Uuid,
    pub project_id: Uuid,
    pub ledger_date: NaiveDate,
    pub opening_cash_minor: i64,
    pub closing_cash_minor: i64,
    pub totals: LineTotals,
    pub notes: Option<String>,
}

pub const PROJECT_DATE_CONSTRAINT: &str = "daily_ledgers_project_date_key";

const LEDGER_COLUMNS: &str = r#"
    id, project_id, ledger_date, opening_cash_minor, closing_cash_minor,
    total_cash_spent_minor, total_supplier_spent_minor, notes, submitted_at, updated_at
"#;

const LINE_COLUMNS: &str = r#"
    id, ledger_id, line_no, item, category, amount_minor, payment_method,
    quantity, unit, supplier_id, note
"#;

pub async fn insert_ledger(
    tx: &mut Transaction<'_, Postgres>,
    row: &LedgerInsert,
) -> Result<Ledger, sqlx::Error> {
    let sql = format!(
        r#"
        INSERT INTO daily_ledgers
            (id, project_id, ledger_date, opening_cash_minor, closing_cash_minor,
             total_cash_spent_minor, total_supplier_spent_minor, notes)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
        RETURNING {LEDGER_COLUMNS}
        "#
    );

    sqlx::query_as::<_, Ledger>(&sql)
        .bind(row.id)
        .bind(row.project_id)
        .bind(row.ledger_date)
        .bind(row.opening_cash_minor)
        .bind(row.closing_cash_minor)
        .bind(row.totals.cash_minor)
        .bind(row.totals.supplier_minor)
        .bind(&row.notes)
        .fetch_one(&mut **tx)
        .await
}

/// Find a ledger by id
pub async fn find_by_id(pool: &PgPool, ledger_id: Uuid) -> Result<Option<Ledger>, sqlx::Error> {
    let sql = format!("SELECT {LEDGER_COLUMNS} FROM daily_ledgers WHERE id = $1");
    sqlx::query_as::<_, Ledger>(&sql)
        .bind(ledger_id)
        .fetch_optional(pool)
        .await
}

/// Find and row-lock a ledger within a transaction
///
/// Serializes concurrent edits of the same ledger.
pub async fn find_by_id_for_update_tx(
    tx: &mut Transaction<'_, Postgres>,
    ledger_id: Uuid,
) -> Result<Option<Ledger>, sqlx::Error> {
    let sql = format!("SELECT {LEDGER_COLUMNS} FROM daily_ledgers WHERE id = $1 FOR UPDATE");
    sqlx::query_as::<_, Ledger>(&sql)
        .bind(ledger_id)
        .fetch_optional(&mut **tx)
        .await
}

/// Find the ledger for a project on a calendar day
pub async fn find_by_project_date(
    pool: &PgPool,
    project_id: Uuid,
    ledger_date: NaiveDate,
) -> Result<Option<Ledger>, sqlx::Error> {
    let sql = format!(
        "SELECT {LEDGER_COLUMNS} FROM daily_ledgers WHERE project_id = $1 AND ledger_date = $2"
    );
    sqlx::query_as::<_, Ledger>(&sql)
        .bind(project_id)
        .bind(ledger_date)
        .fetch_optional(pool)
        .await
}

/// Find the ledger for a project on a calendar day within a transaction
pub async fn find_by_project_date_tx(
    tx: &mut Transaction<'_, Postgres>,
    project_id: Uuid,
    ledger_date: NaiveDate,
) -> Result<Option<Ledger>, sqlx::Error> {
    let sql = format!(
        "SELECT {LEDGER_COLUMNS} FROM daily_ledgers WHERE project_id = $1 AND ledger_date = $2"
    );
    sqlx::query_as::<_, Ledger>(&sql)
        .bind(project_id)
        .bind(ledger_date)
        .fetch_optional(&mut **tx)
        .await
}

/// Most recent ledger strictly before `before`
pub async fn find_latest_before(
    pool: &PgPool,
    project_id: Uuid,
    before: NaiveDate,
) -> Result<Option<Ledger>, sqlx::Error> {
    let sql = format!(
        r#"
        SELECT {LEDGER_COLUMNS} FROM daily_ledgers
        WHERE project_id = $1 AND ledger_date < $2
        ORDER BY ledger_date DESC
        LIMIT 1
        "#
    );
    sqlx::query_as::<_, Ledger>(&sql)
        .bind(project_id)
        .bind(before)
        .fetch_optional(pool)
        .await
}

/// Most recent ledger strictly before `before`, within a transaction
pub async fn find_latest_before_tx(
    tx: &mut Transaction<'_, Postgres>,
    project_id: Uuid,
    before: NaiveDate,
) -> Result<Option<Ledger>, sqlx::Error> {
    let sql = format!(
        r#"
        SELECT {LEDGER_COLUMNS} FROM daily_ledgers
        WHERE project_id = $1 AND ledger_date < $2
        ORDER BY ledger_date DESC
        LIMIT 1
        "#
    );
    sqlx::query_as::<_, Ledger>(&sql)
        .bind(project_id)
        .bind(before)
        .fetch_optional(&mut **tx)
        .await
}

/// All ledgers of a project, newest first
pub async fn list_by_project(pool: &PgPool, project_id: Uuid) -> Result<Vec<Ledger>, sqlx::Error> {
    let sql = format!(
        "SELECT {LEDGER_COLUMNS} FROM daily_ledgers WHERE project_id = $1 ORDER BY ledger_date DESC"
    );
    sqlx::query_as::<_, Ledger>(&sql)
        .bind(project_id)
        .fetch_all(pool)
        .await
}

/// Overwrite derived totals and notes after a line-set replacement
pub async fn update_totals(
    tx: &mut Transaction<'_, Postgres>,
    ledger_id: Uuid,
    notes: Option<&str>,
    totals: LineTotals,
    closing_cash_minor: i64,
) -> Result<Ledger, sqlx::Error> {
    let sql = format!(
        r#"
        UPDATE daily_ledgers
        SET notes = $2,
            total_cash_spent_minor = $3,
            total_supplier_spent_minor = $4,
            closing_cash_minor = $5,
            updated_at = NOW()
        WHERE id = $1
        RETURNING {LEDGER_COLUMNS}
        "#
    );
    sqlx::query_as::<_, Ledger>(&sql)
        .bind(ledger_id)
        .bind(notes)
        .bind(totals.cash_minor)
        .bind(totals.supplier_minor)
        .bind(closing_cash_minor)
        .fetch_one(&mut **tx)
        .await
}

pub async fn delete_ledger(
    tx: &mut Transaction<'_, Postgres>,
    ledger_id: Uuid,
) -> Result<u64, sqlx::Error> {
    let result = sqlx::query("DELETE FROM daily_ledgers WHERE id = $1")
        .bind(ledger_id)
        .execute(&mut **tx)
        .await?;
    Ok(result.rows_affected())
}

/// Insert a complete line set, numbering lines from 1 in input order
pub async fn insert_lines(
    tx: &mut Transaction<'_, Postgres>,
    ledger_id: Uuid,
    lines: &[LineInput],
) -> Result<Vec<LedgerLine>, sqlx::Error> {
    let sql = format!(
        r#"
        INSERT INTO ledger_lines
            (id, ledger_id, line_no, item, category, amount_minor, payment_method,
             quantity, unit, supplier_id, note)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
        RETURNING {LINE_COLUMNS}
        "#
    );

    let mut stored = Vec::with_capacity(lines.len());
    for (idx, line) in lines.iter().enumerate() {
        let row = sqlx::query_as::<_, LedgerLine>(&sql)
            .bind(Uuid::new_v4())
            .bind(ledger_id)
            .bind((idx + 1) as i32)
            .bind(line.item.trim())
            .bind(line.category)
            .bind(line.amount_minor)
            .bind(line.payment_method)
            .bind(line.quantity)
            .bind(line.unit.as_deref().map(str::trim))
            .bind(line.supplier_id)
            .bind(&line.note)
            .fetch_one(&mut **tx)
            .await?;
        stored.push(row);
    }

    Ok(stored)
}

/// Fetch a ledger's lines within a transaction
pub async fn fetch_lines_tx(
    tx: &mut Transaction<'_, Postgres>,
    ledger_id: Uuid,
) -> Result<Vec<LedgerLine>, sqlx::Error> {
    let sql = format!("SELECT {LINE_COLUMNS} FROM ledger_lines WHERE ledger_id = $1 ORDER BY line_no");
    sqlx::query_as::<_, LedgerLine>(&sql)
        .bind(ledger_id)
        .fetch_all(&mut **tx)
        .await
}

/// Fetch a ledger's lines
pub async fn fetch_lines(pool: &PgPool, ledger_id: Uuid) -> Result<Vec<LedgerLine>, sqlx::Error> {
    let sql = format!("SELECT {LINE_COLUMNS} FROM ledger_lines WHERE ledger_id = $1 ORDER BY line_no");
    sqlx::query_as::<_, LedgerLine>(&sql)
        .bind(ledger_id)
        .fetch_all(pool)
        .await
}

/// Fetch lines for many ledgers in one query, grouped by ledger id
pub async fn fetch_lines_for(
    pool: &PgPool,
    ledger_ids: &[Uuid],
) -> Result<HashMap<Uuid, Vec<LedgerLine>>, sqlx::Error> {
    if ledger_ids.is_empty() {
        return Ok(HashMap::new());
    }

    let sql = format!(
        "SELECT {LINE_COLUMNS} FROM ledger_lines WHERE ledger_id = ANY($1) ORDER BY ledger_id, line_no"
    );
    let rows = sqlx::query_as::<_, LedgerLine>(&sql)
        .bind(ledger_ids)
        .fetch_all(pool)
        .await?;

    let mut grouped: HashMap<Uuid, Vec<LedgerLine>> = HashMap::new();
    for row in rows {
        grouped.entry(row.ledger_id).or_default().push(row);
    }
    Ok(grouped)
}

/// Delete a ledger's entire line set
pub async fn delete_lines(
    tx: &mut Transaction<'_, Postgres>,
    ledger_id: Uuid,
) -> Result<u64, sqlx::Error> {
    let result = sqlx::query("DELETE FROM ledger_lines WHERE ledger_id = $1")
        .bind(ledger_id)
        .execute(&mut **tx)
        .await?;
    Ok(result.rows_affected())
}
