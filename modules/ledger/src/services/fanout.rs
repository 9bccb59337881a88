//! Ledger fan-out engine
//!
//! Turns persisted ledger lines into their dependent records (supplier
//! purchases and inventory receipts) and undoes them again.
//!
//! Dependent record ids are derived from `(ledger_id, line_no, kind)`, so
//! applying the same line set twice, with a reversal in between, reproduces
//! identical rows.
//!
//! Callers must lock every supplier the lines touch (see
//! [`supplier_balance::lock_suppliers`]) before calling `apply` or `reverse`.

use serde::Serialize;
use sqlx::{Postgres, Transaction};
use uuid::Uuid;

use crate::domain::{LedgerLine, LineEffect, StockReceipt, SupplierSpend};
use crate::error::LedgerResult;
use crate::repos::inventory_repo::{self, InventoryReceipt};
use crate::repos::ledger_repo::Ledger;
use crate::repos::purchase_repo::{self, SupplierPurchase};
use crate::services::supplier_balance;

const DERIVED_RECORD_NAMESPACE: Uuid = Uuid::from_u128(0x6c0b_93d2_4f1e_4a57_b1c8_2e7d_5a90_f341);

/// Kind of record a line can fan out into
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DerivedKind {
    Purchase,
    Receipt,
}

impl DerivedKind {
    fn as_str(self) -> &'static str {
        match self {
            DerivedKind::Purchase => "supplier_purchase",
            DerivedKind::Receipt => "inventory_receipt",
        }
    }
}

/// Deterministic id of the record `kind` produced by line `line_no`
pub fn derived_record_id(ledger_id: Uuid, line_no: i32, kind: DerivedKind) -> Uuid {
    let name = format!("{}:{}:{}", ledger_id, line_no, kind.as_str());
    Uuid::new_v5(&DERIVED_RECORD_NAMESPACE, name.as_bytes())
}

/// Counts of dependent records touched by one fan-out pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct FanoutSummary {
    pub purchases: usize,
    pub receipts: usize,
    pub supplier_minor: i64,
}

/// Suppliers referenced by supplier-paid lines
pub fn involved_suppliers(lines: &[LedgerLine]) -> impl Iterator<Item = Uuid> + '_ {
    lines
        .iter()
        .filter_map(|line| line.effect().supplier_spend().map(|s| s.supplier_id))
}

fn purchase_for(ledger: &Ledger, line: &LedgerLine, spend: &SupplierSpend) -> SupplierPurchase {
    SupplierPurchase {
        id: derived_record_id(ledger.id, line.line_no, DerivedKind::Purchase),
        supplier_id: spend.supplier_id,
        project_id: ledger.project_id,
        ledger_id: ledger.id,
        line_no: line.line_no,
        amount_minor: spend.amount_minor,
        item: line.item.clone(),
        purchase_date: ledger.ledger_date,
    }
}

fn receipt_for(
    ledger: &Ledger,
    line: &LedgerLine,
    stock: &StockReceipt,
    supplier_id: Option<Uuid>,
) -> InventoryReceipt {
    InventoryReceipt {
        id: derived_record_id(ledger.id, line.line_no, DerivedKind::Receipt),
        project_id: ledger.project_id,
        ledger_id: ledger.id,
        line_no: line.line_no,
        item: line.item.clone(),
        category: line.category,
        quantity: stock.quantity,
        quantity_used: 0.0,
        quantity_remaining: stock.quantity,
        unit: stock.unit.clone(),
        supplier_id,
        delivery_date: ledger.ledger_date,
    }
}

async fn record_purchase(
    tx: &mut Transaction<'_, Postgres>,
    ledger: &Ledger,
    line: &LedgerLine,
    spend: &SupplierSpend,
) -> LedgerResult<()> {
    supplier_balance::apply_purchase(tx, ledger.project_id, spend.supplier_id, spend.amount_minor)
        .await?;
    purchase_repo::insert_purchase(tx, &purchase_for(ledger, line, spend)).await?;
    Ok(())
}

async fn record_receipt(
    tx: &mut Transaction<'_, Postgres>,
    ledger: &Ledger,
    line: &LedgerLine,
    stock: &StockReceipt,
    supplier_id: Option<Uuid>,
) -> LedgerResult<()> {
    inventory_repo::insert_receipt(tx, &receipt_for(ledger, line, stock, supplier_id)).await?;
    Ok(())
}

/// Create the dependent records implied by `lines`
///
/// Stops at the first failing line; the caller's transaction discards
/// whatever earlier lines produced.
pub async fn apply(
    tx: &mut Transaction<'_, Postgres>,
    ledger: &Ledger,
    lines: &[LedgerLine],
) -> LedgerResult<FanoutSummary> {
    let mut summary = FanoutSummary::default();

    for line in lines {
        match line.effect() {
            LineEffect::CashSpend => {}
            LineEffect::SupplierSpend(spend) => {
                record_purchase(tx, ledger, line, &spend).await?;
                summary.purchases += 1;
                summary.supplier_minor += spend.amount_minor;
            }
            LineEffect::MaterialReceipt(stock) => {
                record_receipt(tx, ledger, line, &stock, None).await?;
                summary.receipts += 1;
            }
            LineEffect::Both(spend, stock) => {
                record_purchase(tx, ledger, line, &spend).await?;
                record_receipt(tx, ledger, line, &stock, Some(spend.supplier_id)).await?;
                summary.purchases += 1;
                summary.receipts += 1;
                summary.supplier_minor += spend.amount_minor;
            }
        }

        tracing::debug!(
            ledger_id = %ledger.id,
            line_no = line.line_no,
            "Applied line fan-out"
        );
    }

    Ok(summary)
}

async fn undo_purchase(
    tx: &mut Transaction<'_, Postgres>,
    ledger: &Ledger,
    line: &LedgerLine,
) -> LedgerResult<Option<i64>> {
    match purchase_repo::delete_for_line(tx, ledger.id, line.line_no).await? {
        Some(purchase) => {
            supplier_balance::reverse_purchase(tx, purchase.supplier_id, purchase.amount_minor)
                .await?;
            Ok(Some(purchase.amount_minor))
        }
        None => {
            tracing::warn!(
                ledger_id = %ledger.id,
                line_no = line.line_no,
                "No supplier purchase found for supplier-paid line; nothing to reverse"
            );
            Ok(None)
        }
    }
}

async fn undo_receipt(
    tx: &mut Transaction<'_, Postgres>,
    ledger: &Ledger,
    line: &LedgerLine,
) -> LedgerResult<bool> {
    match inventory_repo::delete_for_line(tx, ledger.id, line.line_no).await? {
        Some(receipt) => {
            if receipt.quantity_used > 0.0 {
                tracing::warn!(
                    ledger_id = %ledger.id,
                    line_no = line.line_no,
                    quantity_used = receipt.quantity_used,
                    "Removing inventory receipt that has recorded usage"
                );
            }
            Ok(true)
        }
        None => {
            tracing::warn!(
                ledger_id = %ledger.id,
                line_no = line.line_no,
                "No inventory receipt found for stock line; nothing to reverse"
            );
            Ok(false)
        }
    }
}

/// Undo exactly what `apply` produced for `old_lines`
///
/// Supplier amounts are restored from the stored purchase rows, not from the
/// line, so a reversal always gives back what was actually drawn.
pub async fn reverse(
    tx: &mut Transaction<'_, Postgres>,
    ledger: &Ledger,
    old_lines: &[LedgerLine],
) -> LedgerResult<FanoutSummary> {
    let mut summary = FanoutSummary::default();

    for line in old_lines {
        let effect = line.effect();

        if effect.supplier_spend().is_some() {
            if let Some(amount) = undo_purchase(tx, ledger, line).await? {
                summary.purchases += 1;
                summary.supplier_minor += amount;
            }
        }

        if effect.stock_receipt().is_some() && undo_receipt(tx, ledger, line).await? {
            summary.receipts += 1;
        }
    }

    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_derived_ids_are_deterministic() {
        let ledger_id = Uuid::new_v4();
        assert_eq!(
            derived_record_id(ledger_id, 3, DerivedKind::Purchase),
            derived_record_id(ledger_id, 3, DerivedKind::Purchase)
        );
    }

    #[test]
    fn test_derived_ids_differ_by_kind_and_line() {
        let ledger_id = Uuid::new_v4();
        let purchase = derived_record_id(ledger_id, 1, DerivedKind::Purchase);
        let receipt = derived_record_id(ledger_id, 1, DerivedKind::Receipt);
        let next_line = derived_record_id(ledger_id, 2, DerivedKind::Purchase);

        assert_ne!(purchase, receipt);
        assert_ne!(purchase, next_line);
    }
}
