//! Ledger V1 request contracts
//!
//! Callers pass already-typed line items; free-text parsing and enum coercion
//! happen upstream of these types.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::domain::LineInput;

/// Submit a day's ledger for a project
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateLedgerRequest {
    /// Calendar day the ledger covers (YYYY-MM-DD)
    pub ledger_date: NaiveDate,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,

    #[serde(default)]
    pub lines: Vec<LineInput>,
}

/// Replace a ledger's line set and apply field updates
///
/// `lines` is the complete replacement set, not a diff. Opening cash and the
/// ledger date are not editable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UpdateLedgerRequest {
    /// New notes; `None` keeps the current notes, a blank string clears them
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,

    #[serde(default)]
    pub lines: Vec<LineInput>,
}

impl UpdateLedgerRequest {
    /// Notes to store after this update, given the ledger's current notes
    pub fn resolve_notes<'a>(&'a self, current: Option<&'a str>) -> Option<&'a str> {
        match self.notes.as_deref() {
            None => current,
            Some(notes) if notes.trim().is_empty() => None,
            Some(notes) => Some(notes),
        }
    }
}

/// Record a cash injection into a project
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordCashDepositRequest {
    pub amount_minor: i64,
    pub deposit_date: NaiveDate,
    /// How the cash arrived, e.g. "bank_transfer" or "cash"
    pub method: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

/// Open a supplier credit account for a project
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateSupplierRequest {
    pub name: String,
    /// Credit extended at creation, recorded as the first deposit
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub opening_deposit_minor: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub opening_deposit_date: Option<NaiveDate>,
}

/// Extend credit on an existing supplier account
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SupplierDepositRequest {
    pub amount_minor: i64,
    pub deposit_date: NaiveDate,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

/// Query for the opening-balance endpoint
#[derive(Debug, Clone, Deserialize)]
pub struct OpeningBalanceQuery {
    pub date: NaiveDate,
}
