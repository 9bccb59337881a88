//! Pure domain types: line classification and the supplier aggregate

pub mod line;
pub mod supplier;

pub use line::{
    LedgerLine, LineCategory, LineEffect, LineInput, LineTotals, PaymentMethod, StockReceipt,
    SupplierSpend,
};
pub use supplier::{Supplier, SupplierBalance, SupplierError};
