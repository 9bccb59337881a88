//! Validation of ledger submissions and deposits
//!
//! Runs before any transaction is opened. Line numbers in errors are 1-based
//! and match the `line_no` the line would be stored under.

use thiserror::Error;

use crate::contracts::ledger_v1::{
    CreateLedgerRequest, CreateSupplierRequest, RecordCashDepositRequest, SupplierDepositRequest,
    UpdateLedgerRequest,
};
use crate::domain::{LineInput, LineTotals, PaymentMethod};

pub const MAX_ITEM_LEN: usize = 200;
pub const MAX_NOTE_LEN: usize = 2000;

/// Validation errors for ledger and deposit payloads
#[derive(Debug, Error, PartialEq)]
pub enum ValidationError {
    #[error("Line {0}: item cannot be empty")]
    EmptyItem(usize),

    #[error("Line {0}: item exceeds 200 characters, got {1}")]
    ItemTooLong(usize, usize),

    #[error("Line {0}: amount must be positive, got {1}")]
    NonPositiveAmount(usize, i64),

    #[error("Line {0}: supplier payment requires a supplier_id")]
    MissingSupplier(usize),

    #[error("Line {0}: cash payment cannot reference a supplier")]
    UnexpectedSupplier(usize),

    #[error("Line {0}: quantity must be a positive number, got {1}")]
    InvalidQuantity(usize, f64),

    #[error("Line {0}: quantity and unit must be given together")]
    QuantityUnitMismatch(usize),

    #[error("Line {0}: unit cannot be empty")]
    EmptyUnit(usize),

    #[error("Line {0}: note exceeds 2000 characters, got {1}")]
    LineNoteTooLong(usize, usize),

    #[error("Notes exceed 2000 characters, got {0}")]
    NotesTooLong(usize),

    #[error("Line totals overflow")]
    TotalOverflow,

    #[error("Deposit amount must be positive, got {0}")]
    NonPositiveDeposit(i64),

    #[error("Deposit method cannot be empty")]
    EmptyDepositMethod,

    #[error("Supplier name cannot be empty")]
    EmptySupplierName,
}

pub fn validate_create_ledger(req: &CreateLedgerRequest) -> Result<(), ValidationError> {
    validate_notes(req.notes.as_deref())?;
    validate_lines(&req.lines)
}

pub fn validate_update_ledger(req: &UpdateLedgerRequest) -> Result<(), ValidationError> {
    validate_notes(req.notes.as_deref())?;
    validate_lines(&req.lines)
}

/// Validate a complete line set, including that its totals fit
pub fn validate_lines(lines: &[LineInput]) -> Result<(), ValidationError> {
    for (idx, line) in lines.iter().enumerate() {
        validate_line(line, idx + 1)?;
    }
    LineTotals::of_inputs(lines)?;
    Ok(())
}

fn validate_line(line: &LineInput, line_no: usize) -> Result<(), ValidationError> {
    let item = line.item.trim();
    if item.is_empty() {
        return Err(ValidationError::EmptyItem(line_no));
    }
    if item.chars().count() > MAX_ITEM_LEN {
        return Err(ValidationError::ItemTooLong(line_no, item.chars().count()));
    }

    if line.amount_minor <= 0 {
        return Err(ValidationError::NonPositiveAmount(line_no, line.amount_minor));
    }

    match (line.payment_method, line.supplier_id) {
        (PaymentMethod::Supplier, None) => return Err(ValidationError::MissingSupplier(line_no)),
        (PaymentMethod::Cash, Some(_)) => return Err(ValidationError::UnexpectedSupplier(line_no)),
        _ => {}
    }

    match (line.quantity, line.unit.as_deref()) {
        (Some(quantity), Some(unit)) => {
            if !quantity.is_finite() || quantity <= 0.0 {
                return Err(ValidationError::InvalidQuantity(line_no, quantity));
            }
            if unit.trim().is_empty() {
                return Err(ValidationError::EmptyUnit(line_no));
            }
        }
        (None, None) => {}
        _ => return Err(ValidationError::QuantityUnitMismatch(line_no)),
    }

    if let Some(ref note) = line.note {
        let len = note.chars().count();
        if len > MAX_NOTE_LEN {
            return Err(ValidationError::LineNoteTooLong(line_no, len));
        }
    }

    Ok(())
}

fn validate_notes(notes: Option<&str>) -> Result<(), ValidationError> {
    match notes.map(|n| n.chars().count()) {
        Some(len) if len > MAX_NOTE_LEN => Err(ValidationError::NotesTooLong(len)),
        _ => Ok(()),
    }
}

pub fn validate_cash_deposit(req: &RecordCashDepositRequest) -> Result<(), ValidationError> {
    if req.amount_minor <= 0 {
        return Err(ValidationError::NonPositiveDeposit(req.amount_minor));
    }
    if req.method.trim().is_empty() {
        return Err(ValidationError::EmptyDepositMethod);
    }
    validate_notes(req.note.as_deref())
}

pub fn validate_supplier_deposit(req: &SupplierDepositRequest) -> Result<(), ValidationError> {
    if req.amount_minor <= 0 {
        return Err(ValidationError::NonPositiveDeposit(req.amount_minor));
    }
    validate_notes(req.note.as_deref())
}

pub fn validate_create_supplier(req: &CreateSupplierRequest) -> Result<(), ValidationError> {
    if req.name.trim().is_empty() {
        return Err(ValidationError::EmptySupplierName);
    }
    match req.opening_deposit_minor {
        Some(amount) if amount <= 0 => Err(ValidationError::NonPositiveDeposit(amount)),
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::LineCategory;
    use chrono::NaiveDate;
    use uuid::Uuid;

    fn cash_line() -> LineInput {
        LineInput {
            item: "Masons".to_string(),
            category: LineCategory::Labor,
            amount_minor: 30_000,
            payment_method: PaymentMethod::Cash,
            quantity: None,
            unit: None,
            supplier_id: None,
            note: None,
        }
    }

    fn request(lines: Vec<LineInput>) -> CreateLedgerRequest {
        CreateLedgerRequest {
            ledger_date: NaiveDate::from_ymd_opt(2026, 3, 2).unwrap(),
            notes: None,
            lines,
        }
    }

    #[test]
    fn test_valid_request_passes() {
        assert!(validate_create_ledger(&request(vec![cash_line()])).is_ok());
    }

    #[test]
    fn test_empty_line_set_is_allowed() {
        assert!(validate_create_ledger(&request(vec![])).is_ok());
    }

    #[test]
    fn test_blank_item_rejected() {
        let mut line = cash_line();
        line.item = "   ".to_string();
        assert_eq!(
            validate_create_ledger(&request(vec![cash_line(), line])),
            Err(ValidationError::EmptyItem(2))
        );
    }

    #[test]
    fn test_non_positive_amount_rejected() {
        let mut line = cash_line();
        line.amount_minor = 0;
        assert_eq!(
            validate_lines(&[line]),
            Err(ValidationError::NonPositiveAmount(1, 0))
        );
    }

    #[test]
    fn test_supplier_payment_requires_supplier() {
        let mut line = cash_line();
        line.payment_method = PaymentMethod::Supplier;
        assert_eq!(
            validate_lines(&[line]),
            Err(ValidationError::MissingSupplier(1))
        );
    }

    #[test]
    fn test_cash_payment_rejects_supplier() {
        let mut line = cash_line();
        line.supplier_id = Some(Uuid::new_v4());
        assert_eq!(
            validate_lines(&[line]),
            Err(ValidationError::UnexpectedSupplier(1))
        );
    }

    #[test]
    fn test_quantity_without_unit_rejected() {
        let mut line = cash_line();
        line.category = LineCategory::Materials;
        line.quantity = Some(10.0);
        assert_eq!(
            validate_lines(&[line]),
            Err(ValidationError::QuantityUnitMismatch(1))
        );
    }

    #[test]
    fn test_nan_quantity_rejected() {
        let mut line = cash_line();
        line.quantity = Some(f64::NAN);
        line.unit = Some("bags".to_string());
        assert!(matches!(
            validate_lines(&[line]),
            Err(ValidationError::InvalidQuantity(1, _))
        ));
    }

    #[test]
    fn test_long_notes_rejected() {
        let mut req = request(vec![]);
        req.notes = Some("x".repeat(MAX_NOTE_LEN + 1));
        assert_eq!(
            validate_create_ledger(&req),
            Err(ValidationError::NotesTooLong(MAX_NOTE_LEN + 1))
        );
    }

    #[test]
    fn test_cash_deposit_rules() {
        let mut req = RecordCashDepositRequest {
            amount_minor: 100_000,
            deposit_date: NaiveDate::from_ymd_opt(2026, 3, 1).unwrap(),
            method: "bank_transfer".to_string(),
            reference: None,
            note: None,
        };
        assert!(validate_cash_deposit(&req).is_ok());

        req.method = " ".to_string();
        assert_eq!(
            validate_cash_deposit(&req),
            Err(ValidationError::EmptyDepositMethod)
        );

        req.method = "cash".to_string();
        req.amount_minor = -1;
        assert_eq!(
            validate_cash_deposit(&req),
            Err(ValidationError::NonPositiveDeposit(-1))
        );
    }
}
