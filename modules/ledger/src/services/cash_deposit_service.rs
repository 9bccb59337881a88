//! Project cash deposits

use sqlx::PgPool;
use std::time::Duration;
use uuid::Uuid;

use crate::contracts::ledger_v1::RecordCashDepositRequest;
use crate::error::{LedgerError, LedgerResult};
use crate::repos::cash_deposit_repo::{self, CashDeposit};
use crate::services::tx;
use crate::validation::validate_cash_deposit;

/// Record a cash injection into a project
///
/// Existing ledgers are not touched: a deposit only affects the opening cash
/// of ledgers created afterwards.
pub async fn record_cash_deposit(
    pool: &PgPool,
    tx_timeout: Duration,
    project_id: Uuid,
    req: &RecordCashDepositRequest,
) -> LedgerResult<CashDeposit> {
    validate_cash_deposit(req)?;

    let mut tx = tx::begin(pool, tx_timeout).await?;
    let outcome = tx::bounded(tx_timeout, async {
        let deposit = cash_deposit_repo::insert_deposit(
            &mut tx,
            project_id,
            req.amount_minor,
            req.deposit_date,
            req.method.trim(),
            req.reference.as_deref(),
            req.note.as_deref(),
        )
        .await?;
        Ok::<_, LedgerError>(deposit)
    })
    .await;
    let deposit = tx::settle(tx, outcome, tx_timeout).await?;

    tracing::info!(
        deposit_id = %deposit.id,
        project_id = %project_id,
        amount_minor = deposit.amount_minor,
        deposit_date = %deposit.deposit_date,
        "Cash deposit recorded"
    );

    Ok(deposit)
}

pub async fn list_cash_deposits(pool: &PgPool, project_id: Uuid) -> LedgerResult<Vec<CashDeposit>> {
    Ok(cash_deposit_repo::list_by_project(pool, project_id).await?)
}
