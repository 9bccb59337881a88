//! Outbox repository for ledger change events
//!
//! Events are written in the same transaction as the ledger change they
//! describe, so a rolled-back write never leaves an event behind.

use sqlx::{Postgres, Transaction};
use uuid::Uuid;

/// Insert an event into the outbox for later publishing
pub async fn insert_outbox_event(
    tx: &mut Transaction<'_, Postgres>,
    event_id: Uuid,
    event_type: &str,
    aggregate_type: &str,
    aggregate_id: &str,
    payload: serde_json::Value,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        INSERT INTO events_outbox
            (event_id, event_type, aggregate_type, aggregate_id, payload)
        VALUES ($1, $2, $3, $4, $5)
        "#,
    )
    .bind(event_id)
    .bind(event_type)
    .bind(aggregate_type)
    .bind(aggregate_id)
    .bind(payload)
    .execute(&mut **tx)
    .await?;

    Ok(())
}

/// Count outbox events recorded for an aggregate
pub async fn count_for_aggregate(
    pool: &sqlx::PgPool,
    aggregate_id: &str,
) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM events_outbox WHERE aggregate_id = $1")
        .bind(aggregate_id)
        .fetch_one(pool)
        .await
}
