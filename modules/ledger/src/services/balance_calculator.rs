//! Opening balance calculation
//!
//! A day's opening cash is the closing cash of the most recent earlier ledger
//! plus cash deposits dated from that ledger's day through the target day,
//! both ends inclusive. With no earlier ledger the window is unbounded below
//! and the carried balance is zero.
//!
//! This is a pure read: no locks, no writes.

use chrono::NaiveDate;
use serde::Serialize;
use sqlx::{PgPool, Postgres, Transaction};
use uuid::Uuid;

use crate::error::LedgerResult;
use crate::repos::ledger_repo::Ledger;
use crate::repos::{cash_deposit_repo, ledger_repo};
use crate::validation::ValidationError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct OpeningBalance {
    pub opening_balance_minor: i64,
    pub last_closing_balance_minor: Option<i64>,
    pub cash_deposits_total_minor: i64,
}

impl OpeningBalance {
    fn compose(prior: Option<&Ledger>, deposits_minor: i64) -> Result<Self, ValidationError> {
        let last_closing_balance_minor = prior.map(|l| l.closing_cash_minor);
        let opening_balance_minor = last_closing_balance_minor
            .unwrap_or(0)
            .checked_add(deposits_minor)
            .ok_or(ValidationError::TotalOverflow)?;
        Ok(OpeningBalance {
            opening_balance_minor,
            last_closing_balance_minor,
            cash_deposits_total_minor: deposits_minor,
        })
    }
}

/// Opening balance for `project_id` on `date`
pub async fn opening_balance(
    pool: &PgPool,
    project_id: Uuid,
    date: NaiveDate,
) -> LedgerResult<OpeningBalance> {
    let prior = ledger_repo::find_latest_before(pool, project_id, date).await?;
    let window_start = prior.as_ref().map(|l| l.ledger_date);
    let deposits = cash_deposit_repo::sum_in_window(pool, project_id, window_start, date).await?;

    Ok(OpeningBalance::compose(prior.as_ref(), deposits)?)
}

/// Opening balance read inside an enclosing transaction
pub async fn opening_balance_tx(
    tx: &mut Transaction<'_, Postgres>,
    project_id: Uuid,
    date: NaiveDate,
) -> LedgerResult<OpeningBalance> {
    let prior = ledger_repo::find_latest_before_tx(tx, project_id, date).await?;
    let window_start = prior.as_ref().map(|l| l.ledger_date);
    let deposits =
        cash_deposit_repo::sum_in_window_tx(tx, project_id, window_start, date).await?;

    tracing::debug!(
        project_id = %project_id,
        date = %date,
        prior_ledger_date = ?window_start,
        deposits_minor = deposits,
        "Computed opening balance"
    );

    Ok(OpeningBalance::compose(prior.as_ref(), deposits)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn ledger_closing_at(closing: i64) -> Ledger {
        Ledger {
            id: Uuid::new_v4(),
            project_id: Uuid::new_v4(),
            ledger_date: NaiveDate::from_ymd_opt(2026, 3, 1).unwrap(),
            opening_cash_minor: closing + 500,
            closing_cash_minor: closing,
            total_cash_spent_minor: 500,
            total_supplier_spent_minor: 0,
            notes: None,
            submitted_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_no_prior_ledger_uses_deposits_only() {
        let balance = OpeningBalance::compose(None, 100_000).unwrap();
        assert_eq!(balance.opening_balance_minor, 100_000);
        assert_eq!(balance.last_closing_balance_minor, None);
        assert_eq!(balance.cash_deposits_total_minor, 100_000);
    }

    #[test]
    fn test_prior_closing_is_carried_forward() {
        let prior = ledger_closing_at(70_000);
        let balance = OpeningBalance::compose(Some(&prior), 0).unwrap();
        assert_eq!(balance.opening_balance_minor, 70_000);
        assert_eq!(balance.last_closing_balance_minor, Some(70_000));
    }

    #[test]
    fn test_negative_prior_closing_is_carried() {
        let prior = ledger_closing_at(-2_000);
        let balance = OpeningBalance::compose(Some(&prior), 5_000).unwrap();
        assert_eq!(balance.opening_balance_minor, 3_000);
    }

    #[test]
    fn test_opening_overflow_is_rejected() {
        let prior = ledger_closing_at(i64::MAX - 100);
        assert_eq!(
            OpeningBalance::compose(Some(&prior), 101),
            Err(ValidationError::TotalOverflow)
        );
    }
}
