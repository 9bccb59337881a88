//! Ledger transaction coordinator
//!
//! Create, update and delete each run as one bounded database transaction
//! spanning the ledger row, its lines, supplier balances, supplier purchases,
//! inventory receipts and the outbox. Any failure rolls the whole operation
//! back and surfaces the typed error that caused it.
//!
//! Update ordering inside the transaction:
//! 1. Lock the ledger row
//! 2. Lock every supplier referenced by old or new lines (ascending id)
//! 3. Reverse fan-out of all old lines
//! 4. Replace the line set wholesale
//! 5. Recompute totals and closing cash (opening cash never changes)
//! 6. Apply fan-out of all new lines

use chrono::NaiveDate;
use sqlx::{PgPool, Postgres, Transaction};
use std::time::Duration;
use uuid::Uuid;

use crate::contracts::ledger_events_v1::{
    LedgerChangedV1, EVENT_LEDGER_CREATED, EVENT_LEDGER_DELETED, EVENT_LEDGER_UPDATED,
};
use crate::contracts::ledger_v1::{CreateLedgerRequest, UpdateLedgerRequest};
use crate::domain::{LedgerLine, LineInput, LineTotals};
use crate::error::{is_unique_violation, LedgerError, LedgerResult, NotFoundKind};
use crate::repos::ledger_repo::{self, Ledger, LedgerInsert, LedgerWithLines};
use crate::repos::outbox_repo;
use crate::services::{balance_calculator, fanout, supplier_balance, tx};
use crate::validation::{validate_create_ledger, validate_update_ledger};

// ============================================================
// WRITE PATH
// ============================================================

/// Create the ledger for `project_id` on `req.ledger_date`
///
/// Opening cash is fixed here from the balance calculator and never
/// recalculated afterwards.
pub async fn create_ledger(
    pool: &PgPool,
    tx_timeout: Duration,
    project_id: Uuid,
    req: &CreateLedgerRequest,
) -> LedgerResult<LedgerWithLines> {
    validate_create_ledger(req)?;

    let mut tx = tx::begin(pool, tx_timeout).await?;
    let outcome = tx::bounded(tx_timeout, create_in_tx(&mut tx, project_id, req)).await;
    let result = tx::settle(tx, outcome, tx_timeout).await;

    match &result {
        Ok(created) => tracing::info!(
            ledger_id = %created.ledger.id,
            project_id = %project_id,
            ledger_date = %req.ledger_date,
            opening_cash_minor = created.ledger.opening_cash_minor,
            closing_cash_minor = created.ledger.closing_cash_minor,
            line_count = created.lines.len(),
            "Ledger created"
        ),
        Err(err) => tracing::warn!(
            project_id = %project_id,
            ledger_date = %req.ledger_date,
            error = %err,
            "Ledger create rejected"
        ),
    }

    result
}

async fn create_in_tx(
    tx: &mut Transaction<'_, Postgres>,
    project_id: Uuid,
    req: &CreateLedgerRequest,
) -> LedgerResult<LedgerWithLines> {
    let duplicate = || LedgerError::DuplicateLedgerDate {
        project_id,
        date: req.ledger_date,
    };

    if ledger_repo::find_by_project_date_tx(tx, project_id, req.ledger_date)
        .await?
        .is_some()
    {
        return Err(duplicate());
    }

    // Before the lines go in, so an unknown supplier is NotFound rather than an FK violation
    supplier_balance::lock_suppliers(tx, suppliers_in(&req.lines)).await?;

    let opening = balance_calculator::opening_balance_tx(tx, project_id, req.ledger_date).await?;
    let totals = LineTotals::of_inputs(&req.lines)?;
    let closing_cash_minor = totals.closing_cash(opening.opening_balance_minor)?;

    // The unique constraint settles races the pre-check above cannot see
    let ledger = ledger_repo::insert_ledger(
        tx,
        &LedgerInsert {
            id: Uuid::new_v4(),
            project_id,
            ledger_date: req.ledger_date,
            opening_cash_minor: opening.opening_balance_minor,
            closing_cash_minor,
            totals,
            notes: req.notes.clone(),
        },
    )
    .await
    .map_err(|e| {
        if is_unique_violation(&e, ledger_repo::PROJECT_DATE_CONSTRAINT) {
            duplicate()
        } else {
            LedgerError::Database(e)
        }
    })?;

    let lines = ledger_repo::insert_lines(tx, ledger.id, &req.lines).await?;
    let applied = fanout::apply(tx, &ledger, &lines).await?;

    tracing::debug!(
        ledger_id = %ledger.id,
        purchases = applied.purchases,
        receipts = applied.receipts,
        "Fan-out applied for new ledger"
    );

    write_event(tx, EVENT_LEDGER_CREATED, &ledger, lines.len()).await?;

    Ok(LedgerWithLines { ledger, lines })
}

/// Replace a ledger's line set and apply field updates
pub async fn update_ledger(
    pool: &PgPool,
    tx_timeout: Duration,
    ledger_id: Uuid,
    req: &UpdateLedgerRequest,
) -> LedgerResult<LedgerWithLines> {
    validate_update_ledger(req)?;

    let mut tx = tx::begin(pool, tx_timeout).await?;
    let outcome = tx::bounded(tx_timeout, update_in_tx(&mut tx, ledger_id, req)).await;
    let result = tx::settle(tx, outcome, tx_timeout).await;

    match &result {
        Ok(updated) => tracing::info!(
            ledger_id = %ledger_id,
            project_id = %updated.ledger.project_id,
            closing_cash_minor = updated.ledger.closing_cash_minor,
            line_count = updated.lines.len(),
            "Ledger updated"
        ),
        Err(err) => tracing::warn!(
            ledger_id = %ledger_id,
            error = %err,
            "Ledger update rejected"
        ),
    }

    result
}

async fn update_in_tx(
    tx: &mut Transaction<'_, Postgres>,
    ledger_id: Uuid,
    req: &UpdateLedgerRequest,
) -> LedgerResult<LedgerWithLines> {
    let current = ledger_repo::find_by_id_for_update_tx(tx, ledger_id)
        .await?
        .ok_or(LedgerError::NotFound(NotFoundKind::Ledger(ledger_id)))?;
    let old_lines = ledger_repo::fetch_lines_tx(tx, ledger_id).await?;

    let involved: Vec<Uuid> = fanout::involved_suppliers(&old_lines)
        .chain(suppliers_in(&req.lines))
        .collect();
    supplier_balance::lock_suppliers(tx, involved).await?;

    let reversed = fanout::reverse(tx, &current, &old_lines).await?;
    tracing::debug!(
        ledger_id = %ledger_id,
        purchases = reversed.purchases,
        receipts = reversed.receipts,
        supplier_minor = reversed.supplier_minor,
        "Fan-out reversed for old lines"
    );

    ledger_repo::delete_lines(tx, ledger_id).await?;
    let lines = ledger_repo::insert_lines(tx, ledger_id, &req.lines).await?;

    let totals = LineTotals::of_inputs(&req.lines)?;
    let closing_cash_minor = totals.closing_cash(current.opening_cash_minor)?;
    let notes = req.resolve_notes(current.notes.as_deref());
    let ledger =
        ledger_repo::update_totals(tx, ledger_id, notes, totals, closing_cash_minor).await?;

    fanout::apply(tx, &ledger, &lines).await?;

    write_event(tx, EVENT_LEDGER_UPDATED, &ledger, lines.len()).await?;

    Ok(LedgerWithLines { ledger, lines })
}

/// Delete a ledger, reversing everything its lines produced
pub async fn delete_ledger(pool: &PgPool, tx_timeout: Duration, ledger_id: Uuid) -> LedgerResult<()> {
    let mut tx = tx::begin(pool, tx_timeout).await?;
    let outcome = tx::bounded(tx_timeout, delete_in_tx(&mut tx, ledger_id)).await;
    let result = tx::settle(tx, outcome, tx_timeout).await;

    match &result {
        Ok(()) => tracing::info!(ledger_id = %ledger_id, "Ledger deleted"),
        Err(err) => tracing::warn!(ledger_id = %ledger_id, error = %err, "Ledger delete rejected"),
    }

    result
}

async fn delete_in_tx(tx: &mut Transaction<'_, Postgres>, ledger_id: Uuid) -> LedgerResult<()> {
    let ledger = ledger_repo::find_by_id_for_update_tx(tx, ledger_id)
        .await?
        .ok_or(LedgerError::NotFound(NotFoundKind::Ledger(ledger_id)))?;
    let old_lines = ledger_repo::fetch_lines_tx(tx, ledger_id).await?;

    supplier_balance::lock_suppliers(tx, fanout::involved_suppliers(&old_lines)).await?;
    fanout::reverse(tx, &ledger, &old_lines).await?;

    ledger_repo::delete_lines(tx, ledger_id).await?;
    ledger_repo::delete_ledger(tx, ledger_id).await?;

    write_event(tx, EVENT_LEDGER_DELETED, &ledger, 0).await?;

    Ok(())
}

/// Every supplier a submitted line set references
fn suppliers_in(lines: &[LineInput]) -> impl Iterator<Item = Uuid> + '_ {
    lines.iter().filter_map(|line| line.supplier_id)
}

async fn write_event(
    tx: &mut Transaction<'_, Postgres>,
    event_type: &str,
    ledger: &Ledger,
    line_count: usize,
) -> LedgerResult<()> {
    let payload = LedgerChangedV1 {
        ledger_id: ledger.id,
        project_id: ledger.project_id,
        ledger_date: ledger.ledger_date,
        opening_cash_minor: ledger.opening_cash_minor,
        closing_cash_minor: ledger.closing_cash_minor,
        total_cash_spent_minor: ledger.total_cash_spent_minor,
        total_supplier_spent_minor: ledger.total_supplier_spent_minor,
        line_count,
    };

    outbox_repo::insert_outbox_event(
        tx,
        Uuid::new_v4(),
        event_type,
        "daily_ledger",
        &ledger.id.to_string(),
        serde_json::to_value(&payload)
            .map_err(|e| sqlx::Error::Protocol(format!("JSON serialization failed: {}", e)))?,
    )
    .await?;

    Ok(())
}

// ============================================================
// READ PATH
// ============================================================

/// Ledger by id, with lines
pub async fn get_ledger(pool: &PgPool, ledger_id: Uuid) -> LedgerResult<LedgerWithLines> {
    let ledger = ledger_repo::find_by_id(pool, ledger_id)
        .await?
        .ok_or(LedgerError::NotFound(NotFoundKind::Ledger(ledger_id)))?;
    let lines = ledger_repo::fetch_lines(pool, ledger_id).await?;
    Ok(LedgerWithLines { ledger, lines })
}

/// Ledger for a project on a calendar day, with lines
pub async fn get_ledger_by_date(
    pool: &PgPool,
    project_id: Uuid,
    date: NaiveDate,
) -> LedgerResult<LedgerWithLines> {
    let ledger = ledger_repo::find_by_project_date(pool, project_id, date)
        .await?
        .ok_or(LedgerError::NotFound(NotFoundKind::LedgerOnDate(project_id, date)))?;
    let lines = ledger_repo::fetch_lines(pool, ledger.id).await?;
    Ok(LedgerWithLines { ledger, lines })
}

/// All ledgers of a project, newest first, each with its lines
pub async fn list_ledgers(pool: &PgPool, project_id: Uuid) -> LedgerResult<Vec<LedgerWithLines>> {
    let ledgers = ledger_repo::list_by_project(pool, project_id).await?;
    let ids: Vec<Uuid> = ledgers.iter().map(|l| l.id).collect();
    let mut lines_by_ledger = ledger_repo::fetch_lines_for(pool, &ids).await?;

    Ok(ledgers
        .into_iter()
        .map(|ledger| {
            let lines: Vec<LedgerLine> = lines_by_ledger.remove(&ledger.id).unwrap_or_default();
            LedgerWithLines { ledger, lines }
        })
        .collect())
}
