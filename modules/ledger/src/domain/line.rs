//! Ledger line types and fan-out classification
//!
//! A line's category and payment method decide which dependent records it
//! implies. Classification happens once, up front, into a [`LineEffect`] so the
//! write path dispatches on a closed set of variants instead of re-inspecting
//! raw fields.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::validation::ValidationError;

/// Expense category, matching database `line_category`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "line_category", rename_all = "lowercase")]
pub enum LineCategory {
    Materials,
    Labor,
    Equipment,
    Transport,
    Food,
    Other,
}

impl LineCategory {
    /// Categories whose lines can produce an inventory receipt
    pub fn is_stockable(self) -> bool {
        matches!(self, LineCategory::Materials | LineCategory::Equipment)
    }
}

/// How a line was paid, matching database `payment_method`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "payment_method", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum PaymentMethod {
    Cash,
    Supplier,
}

/// A line as submitted by a caller (already typed, not yet persisted)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineInput {
    pub item: String,
    pub category: LineCategory,
    pub amount_minor: i64,
    pub payment_method: PaymentMethod,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quantity: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub supplier_id: Option<Uuid>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

impl LineInput {
    pub fn effect(&self) -> LineEffect {
        LineEffect::classify(
            self.category,
            self.payment_method,
            self.amount_minor,
            self.supplier_id,
            self.quantity,
            self.unit.as_deref(),
        )
    }
}

/// A persisted line. Lines have no identity outside their ledger and are
/// always replaced as a whole set.
#[derive(Debug, Clone, PartialEq, Serialize, sqlx::FromRow)]
pub struct LedgerLine {
    #[serde(skip)]
    pub id: Uuid,
    #[serde(skip)]
    pub ledger_id: Uuid,
    pub line_no: i32,
    pub item: String,
    pub category: LineCategory,
    pub amount_minor: i64,
    pub payment_method: PaymentMethod,
    pub quantity: Option<f64>,
    pub unit: Option<String>,
    pub supplier_id: Option<Uuid>,
    pub note: Option<String>,
}

impl LedgerLine {
    pub fn effect(&self) -> LineEffect {
        LineEffect::classify(
            self.category,
            self.payment_method,
            self.amount_minor,
            self.supplier_id,
            self.quantity,
            self.unit.as_deref(),
        )
    }
}

/// Supplier-credit spend implied by a line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SupplierSpend {
    pub supplier_id: Uuid,
    pub amount_minor: i64,
}

/// Stock receipt implied by a stockable line carrying quantity + unit
#[derive(Debug, Clone, PartialEq)]
pub struct StockReceipt {
    pub quantity: f64,
    pub unit: String,
}

/// Dependent-record effect of one line
#[derive(Debug, Clone, PartialEq)]
pub enum LineEffect {
    /// Cash outlay only; no dependent records
    CashSpend,
    /// Drawn on supplier credit; produces a supplier purchase
    SupplierSpend(SupplierSpend),
    /// Cash-paid stock; produces an inventory receipt
    MaterialReceipt(StockReceipt),
    /// Supplier-paid stock; produces a purchase and a receipt
    Both(SupplierSpend, StockReceipt),
}

impl LineEffect {
    fn classify(
        category: LineCategory,
        payment_method: PaymentMethod,
        amount_minor: i64,
        supplier_id: Option<Uuid>,
        quantity: Option<f64>,
        unit: Option<&str>,
    ) -> Self {
        let spend = match (payment_method, supplier_id) {
            (PaymentMethod::Supplier, Some(supplier_id)) => Some(SupplierSpend {
                supplier_id,
                amount_minor,
            }),
            _ => None,
        };

        let receipt = match (category.is_stockable(), quantity, unit) {
            (true, Some(quantity), Some(unit)) => Some(StockReceipt {
                quantity,
                unit: unit.to_string(),
            }),
            _ => None,
        };

        match (spend, receipt) {
            (None, None) => LineEffect::CashSpend,
            (Some(spend), None) => LineEffect::SupplierSpend(spend),
            (None, Some(receipt)) => LineEffect::MaterialReceipt(receipt),
            (Some(spend), Some(receipt)) => LineEffect::Both(spend, receipt),
        }
    }

    pub fn supplier_spend(&self) -> Option<SupplierSpend> {
        match self {
            LineEffect::SupplierSpend(spend) | LineEffect::Both(spend, _) => Some(*spend),
            _ => None,
        }
    }

    pub fn stock_receipt(&self) -> Option<&StockReceipt> {
        match self {
            LineEffect::MaterialReceipt(receipt) | LineEffect::Both(_, receipt) => Some(receipt),
            _ => None,
        }
    }
}

/// Spend totals derived from a line set
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct LineTotals {
    pub cash_minor: i64,
    pub supplier_minor: i64,
}

impl LineTotals {
    pub fn from_lines<I>(lines: I) -> Result<Self, ValidationError>
    where
        I: IntoIterator<Item = (PaymentMethod, i64)>,
    {
        let mut totals = LineTotals::default();
        for (method, amount) in lines {
            let bucket = match method {
                PaymentMethod::Cash => &mut totals.cash_minor,
                PaymentMethod::Supplier => &mut totals.supplier_minor,
            };
            *bucket = bucket
                .checked_add(amount)
                .ok_or(ValidationError::TotalOverflow)?;
        }
        Ok(totals)
    }

    pub fn of_inputs(lines: &[LineInput]) -> Result<Self, ValidationError> {
        Self::from_lines(lines.iter().map(|l| (l.payment_method, l.amount_minor)))
    }

    /// Closing cash for a day that opened with `opening_cash_minor`.
    /// Supplier-credit spend does not reduce cash on hand.
    pub fn closing_cash(&self, opening_cash_minor: i64) -> Result<i64, ValidationError> {
        opening_cash_minor
            .checked_sub(self.cash_minor)
            .ok_or(ValidationError::TotalOverflow)
    }
}
