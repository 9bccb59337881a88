//! Supplier credit account aggregate
//!
//! Every change to a supplier's running totals goes through [`SupplierBalance`]
//! so that `current_balance = total_deposited - total_spent` holds after each
//! mutation and the balance never goes negative.

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;
use thiserror::Error;
use uuid::Uuid;

/// Supplier row
#[derive(Debug, Clone, PartialEq, Serialize, FromRow)]
pub struct Supplier {
    pub id: Uuid,
    pub project_id: Uuid,
    pub name: String,
    pub total_deposited_minor: i64,
    pub total_spent_minor: i64,
    pub current_balance_minor: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Supplier {
    pub fn balance(&self) -> SupplierBalance {
        SupplierBalance {
            total_deposited_minor: self.total_deposited_minor,
            total_spent_minor: self.total_spent_minor,
            current_balance_minor: self.current_balance_minor,
        }
    }
}

/// Errors raised by the supplier aggregate
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SupplierError {
    #[error("Insufficient supplier balance: requested {requested_minor}, available {available_minor}")]
    Insufficient {
        requested_minor: i64,
        available_minor: i64,
    },

    #[error("Amount must be positive, got {0}")]
    NonPositiveAmount(i64),

    #[error("Supplier balance invariant violated: deposited={deposited}, spent={spent}, balance={balance}")]
    InvariantViolated {
        deposited: i64,
        spent: i64,
        balance: i64,
    },

    #[error("Reversal of {amount_minor} exceeds total spent {total_spent_minor}")]
    ReversalExceedsSpent {
        amount_minor: i64,
        total_spent_minor: i64,
    },

    #[error("Supplier amount overflow")]
    Overflow,
}

impl SupplierError {
    /// Shortfall carried by an insufficient-balance rejection
    pub fn shortfall_minor(&self) -> Option<i64> {
        match self {
            SupplierError::Insufficient {
                requested_minor,
                available_minor,
            } => Some(requested_minor - available_minor),
            _ => None,
        }
    }
}

/// Running totals of a supplier credit account
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SupplierBalance {
    pub total_deposited_minor: i64,
    pub total_spent_minor: i64,
    pub current_balance_minor: i64,
}

impl SupplierBalance {
    pub fn check_invariant(&self) -> Result<(), SupplierError> {
        let expected = self
            .total_deposited_minor
            .checked_sub(self.total_spent_minor)
            .ok_or(SupplierError::Overflow)?;

        if expected != self.current_balance_minor || self.current_balance_minor < 0 {
            return Err(SupplierError::InvariantViolated {
                deposited: self.total_deposited_minor,
                spent: self.total_spent_minor,
                balance: self.current_balance_minor,
            });
        }
        Ok(())
    }

    /// Fail if `amount_minor` cannot be drawn from the current balance
    pub fn ensure_can_spend(&self, amount_minor: i64) -> Result<(), SupplierError> {
        if amount_minor <= 0 {
            return Err(SupplierError::NonPositiveAmount(amount_minor));
        }
        if amount_minor > self.current_balance_minor {
            return Err(SupplierError::Insufficient {
                requested_minor: amount_minor,
                available_minor: self.current_balance_minor,
            });
        }
        Ok(())
    }

    pub fn apply_purchase(&mut self, amount_minor: i64) -> Result<(), SupplierError> {
        self.check_invariant()?;
        self.ensure_can_spend(amount_minor)?;

        self.total_spent_minor = self
            .total_spent_minor
            .checked_add(amount_minor)
            .ok_or(SupplierError::Overflow)?;
        self.current_balance_minor -= amount_minor;

        self.check_invariant()
    }

    pub fn reverse_purchase(&mut self, amount_minor: i64) -> Result<(), SupplierError> {
        self.check_invariant()?;
        if amount_minor <= 0 {
            return Err(SupplierError::NonPositiveAmount(amount_minor));
        }
        if amount_minor > self.total_spent_minor {
            return Err(SupplierError::ReversalExceedsSpent {
                amount_minor,
                total_spent_minor: self.total_spent_minor,
            });
        }

        self.total_spent_minor -= amount_minor;
        self.current_balance_minor = self
            .current_balance_minor
            .checked_add(amount_minor)
            .ok_or(SupplierError::Overflow)?;

        self.check_invariant()
    }

    pub fn apply_deposit(&mut self, amount_minor: i64) -> Result<(), SupplierError> {
        self.check_invariant()?;
        if amount_minor <= 0 {
            return Err(SupplierError::NonPositiveAmount(amount_minor));
        }

        self.total_deposited_minor = self
            .total_deposited_minor
            .checked_add(amount_minor)
            .ok_or(SupplierError::Overflow)?;
        self.current_balance_minor = self
            .current_balance_minor
            .checked_add(amount_minor)
            .ok_or(SupplierError::Overflow)?;

        self.check_invariant()
    }
}
