//! Error taxonomy for ledger writes and reads
//!
//! Every error raised inside a ledger transaction aborts and rolls back the
//! whole operation before it reaches the caller.

use chrono::NaiveDate;
use uuid::Uuid;

use crate::domain::SupplierError;
use crate::validation::ValidationError;

/// Which entity a `NotFound` refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotFoundKind {
    Ledger(Uuid),
    Supplier(Uuid),
    LedgerOnDate(Uuid, NaiveDate),
}

impl std::fmt::Display for NotFoundKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Ledger(id) => write!(f, "ledger {}", id),
            Self::Supplier(id) => write!(f, "supplier {}", id),
            Self::LedgerOnDate(project_id, date) => {
                write!(f, "ledger for project {} on {}", project_id, date)
            }
        }
    }
}

/// Errors that can occur during ledger operations
#[derive(Debug, thiserror::Error)]
pub enum LedgerError {
    #[error("A ledger already exists for project {project_id} on {date}")]
    DuplicateLedgerDate { project_id: Uuid, date: NaiveDate },

    #[error(
        "Insufficient supplier balance for {supplier_id}: requested {requested_minor}, \
         available {available_minor}, short by {shortfall_minor}"
    )]
    InsufficientSupplierBalance {
        supplier_id: Uuid,
        requested_minor: i64,
        available_minor: i64,
        shortfall_minor: i64,
    },

    #[error("Not found: {0}")]
    NotFound(NotFoundKind),

    #[error("Validation failed: {0}")]
    Validation(#[from] ValidationError),

    #[error("Supplier {supplier_id} balance error: {source}")]
    SupplierState {
        supplier_id: Uuid,
        #[source]
        source: SupplierError,
    },

    #[error("Transaction timed out after {after_ms}ms and was rolled back")]
    Timeout { after_ms: u64 },

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Result type for ledger operations
pub type LedgerResult<T> = Result<T, LedgerError>;

const PG_SERIALIZATION_FAILURE: &str = "40001";
const PG_DEADLOCK_DETECTED: &str = "40P01";
const PG_QUERY_CANCELED: &str = "57014";
const PG_UNIQUE_VIOLATION: &str = "23505";

impl LedgerError {
    /// Map a supplier aggregate rejection onto the public taxonomy
    pub fn from_supplier(supplier_id: Uuid, err: SupplierError) -> Self {
        match err {
            SupplierError::Insufficient {
                requested_minor,
                available_minor,
            } => LedgerError::InsufficientSupplierBalance {
                supplier_id,
                requested_minor,
                available_minor,
                shortfall_minor: requested_minor - available_minor,
            },
            source => LedgerError::SupplierState {
                supplier_id,
                source,
            },
        }
    }

    /// Whether the same request may succeed if retried unchanged
    pub fn is_retryable(&self) -> bool {
        match self {
            LedgerError::Timeout { .. } => true,
            LedgerError::Database(sqlx::Error::Database(db)) => matches!(
                db.code().as_deref(),
                Some(PG_SERIALIZATION_FAILURE) | Some(PG_DEADLOCK_DETECTED) | Some(PG_QUERY_CANCELED)
            ),
            LedgerError::Database(sqlx::Error::PoolTimedOut) => true,
            _ => false,
        }
    }

    /// Stable machine-readable kind for API responses
    pub fn kind(&self) -> &'static str {
        match self {
            LedgerError::DuplicateLedgerDate { .. } => "duplicate_ledger_date",
            LedgerError::InsufficientSupplierBalance { .. } => "insufficient_supplier_balance",
            LedgerError::NotFound(_) => "not_found",
            LedgerError::Validation(_) => "validation_error",
            LedgerError::SupplierState { .. } => "supplier_state",
            LedgerError::Timeout { .. } => "timeout",
            LedgerError::Database(_) => "database_error",
        }
    }
}

/// True when `err` is a unique violation on the named constraint
pub fn is_unique_violation(err: &sqlx::Error, constraint: &str) -> bool {
    match err {
        sqlx::Error::Database(db) => {
            db.code().as_deref() == Some(PG_UNIQUE_VIOLATION) && db.constraint() == Some(constraint)
        }
        _ => false,
    }
}

/// True when `err` is Postgres cancelling a statement (statement_timeout)
pub fn is_statement_timeout(err: &sqlx::Error) -> bool {
    match err {
        sqlx::Error::Database(db) => db.code().as_deref() == Some(PG_QUERY_CANCELED),
        _ => false,
    }
}
