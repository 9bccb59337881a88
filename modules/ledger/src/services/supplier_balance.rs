//! Supplier balance validation and the persisted mutation paths
//!
//! All reads here take a row lock inside the caller's transaction, so a
//! check-then-decrement against one supplier is serialized across concurrent
//! ledger writes. Every change to supplier totals goes through the
//! [`SupplierBalance`](crate::domain::SupplierBalance) aggregate before it is
//! stored.

use sqlx::{Postgres, Transaction};
use uuid::Uuid;

use crate::domain::Supplier;
use crate::error::{LedgerError, LedgerResult, NotFoundKind};
use crate::repos::supplier_repo;

/// Lock every supplier in `ids` in ascending id order
///
/// Fails with `NotFound` naming the first id that does not exist.
pub async fn lock_suppliers(
    tx: &mut Transaction<'_, Postgres>,
    ids: impl IntoIterator<Item = Uuid>,
) -> LedgerResult<()> {
    let mut ids: Vec<Uuid> = ids.into_iter().collect();
    ids.sort_unstable();
    ids.dedup();

    let locked = supplier_repo::lock_many_tx(tx, &ids).await?;
    if let Some(missing) = ids.iter().find(|id| !locked.contains(id)) {
        return Err(LedgerError::NotFound(NotFoundKind::Supplier(*missing)));
    }
    Ok(())
}

async fn load_locked(
    tx: &mut Transaction<'_, Postgres>,
    supplier_id: Uuid,
) -> LedgerResult<Supplier> {
    supplier_repo::find_for_update_tx(tx, supplier_id)
        .await?
        .ok_or(LedgerError::NotFound(NotFoundKind::Supplier(supplier_id)))
}

/// Check that `amount_minor` can be drawn on `supplier_id` for `project_id`
///
/// A supplier belonging to another project is reported as not found.
pub async fn validate_spend(
    tx: &mut Transaction<'_, Postgres>,
    project_id: Uuid,
    supplier_id: Uuid,
    amount_minor: i64,
) -> LedgerResult<Supplier> {
    let supplier = load_locked(tx, supplier_id).await?;
    if supplier.project_id != project_id {
        return Err(LedgerError::NotFound(NotFoundKind::Supplier(supplier_id)));
    }

    supplier
        .balance()
        .ensure_can_spend(amount_minor)
        .map_err(|e| LedgerError::from_supplier(supplier_id, e))?;

    Ok(supplier)
}

/// Validate and draw a purchase on a supplier
pub async fn apply_purchase(
    tx: &mut Transaction<'_, Postgres>,
    project_id: Uuid,
    supplier_id: Uuid,
    amount_minor: i64,
) -> LedgerResult<Supplier> {
    let supplier = validate_spend(tx, project_id, supplier_id, amount_minor).await?;

    let mut balance = supplier.balance();
    balance
        .apply_purchase(amount_minor)
        .map_err(|e| LedgerError::from_supplier(supplier_id, e))?;

    let updated = supplier_repo::store_balance(tx, supplier_id, &balance).await?;

    tracing::debug!(
        supplier_id = %supplier_id,
        amount_minor = amount_minor,
        current_balance_minor = updated.current_balance_minor,
        "Applied supplier purchase"
    );

    Ok(updated)
}

/// Give a previously drawn purchase back to the supplier
pub async fn reverse_purchase(
    tx: &mut Transaction<'_, Postgres>,
    supplier_id: Uuid,
    amount_minor: i64,
) -> LedgerResult<Supplier> {
    let supplier = load_locked(tx, supplier_id).await?;

    let mut balance = supplier.balance();
    balance
        .reverse_purchase(amount_minor)
        .map_err(|e| LedgerError::from_supplier(supplier_id, e))?;

    let updated = supplier_repo::store_balance(tx, supplier_id, &balance).await?;

    tracing::debug!(
        supplier_id = %supplier_id,
        amount_minor = amount_minor,
        current_balance_minor = updated.current_balance_minor,
        "Reversed supplier purchase"
    );

    Ok(updated)
}

/// Extend credit on a supplier
pub async fn apply_deposit(
    tx: &mut Transaction<'_, Postgres>,
    supplier_id: Uuid,
    amount_minor: i64,
) -> LedgerResult<Supplier> {
    let supplier = load_locked(tx, supplier_id).await?;

    let mut balance = supplier.balance();
    balance
        .apply_deposit(amount_minor)
        .map_err(|e| LedgerError::from_supplier(supplier_id, e))?;

    Ok(supplier_repo::store_balance(tx, supplier_id, &balance).await?)
}
