//! Ledger change events written to the outbox

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub const EVENT_LEDGER_CREATED: &str = "ledger.events.ledger.created";
pub const EVENT_LEDGER_UPDATED: &str = "ledger.events.ledger.updated";
pub const EVENT_LEDGER_DELETED: &str = "ledger.events.ledger.deleted";

/// Snapshot of a ledger after a committed change
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LedgerChangedV1 {
    pub ledger_id: Uuid,
    pub project_id: Uuid,
    pub ledger_date: NaiveDate,
    pub opening_cash_minor: i64,
    pub closing_cash_minor: i64,
    pub total_cash_spent_minor: i64,
    pub total_supplier_spent_minor: i64,
    pub line_count: usize,
}
