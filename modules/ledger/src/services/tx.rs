//! Bounded transactions
//!
//! Ledger writes run as: `begin` → body under `tokio::time::timeout` →
//! `settle`. A body that errors or overruns is rolled back; only a body that
//! finishes in time with `Ok` is committed.

use sqlx::{PgPool, Postgres, Transaction};
use std::future::Future;
use std::time::Duration;

use crate::error::{is_statement_timeout, LedgerError, LedgerResult};

/// Open a transaction whose statements are also capped server-side
pub async fn begin(
    pool: &PgPool,
    timeout: Duration,
) -> LedgerResult<Transaction<'static, Postgres>> {
    let mut tx = pool.begin().await?;

    // SET LOCAL does not accept bind parameters
    let stmt = format!("SET LOCAL statement_timeout = {}", timeout.as_millis());
    sqlx::query(&stmt).execute(&mut *tx).await?;

    Ok(tx)
}

/// Drive `body` to completion or until `timeout` elapses
pub async fn bounded<T, F>(timeout: Duration, body: F) -> LedgerResult<T>
where
    F: Future<Output = LedgerResult<T>>,
{
    match tokio::time::timeout(timeout, body).await {
        Ok(result) => result,
        Err(_) => Err(LedgerError::Timeout {
            after_ms: timeout.as_millis() as u64,
        }),
    }
}

/// Commit on success, roll back on any failure
pub async fn settle<T>(
    tx: Transaction<'_, Postgres>,
    outcome: LedgerResult<T>,
    timeout: Duration,
) -> LedgerResult<T> {
    match outcome {
        Ok(value) => {
            tx.commit().await?;
            Ok(value)
        }
        Err(err) => {
            if let Err(rollback_err) = tx.rollback().await {
                tracing::warn!(error = %rollback_err, "Rollback failed; connection will be discarded");
            }
            Err(normalize(err, timeout))
        }
    }
}

/// A statement cancelled by `statement_timeout` is reported as a timeout
fn normalize(err: LedgerError, timeout: Duration) -> LedgerError {
    match err {
        LedgerError::Database(ref db) if is_statement_timeout(db) => LedgerError::Timeout {
            after_ms: timeout.as_millis() as u64,
        },
        other => other,
    }
}
