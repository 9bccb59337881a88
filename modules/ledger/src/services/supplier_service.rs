//! Supplier credit accounts
//!
//! Deposits extend credit; purchases are only ever created by ledger
//! fan-out and are read-only here.

use chrono::Utc;
use sqlx::{PgPool, Postgres, Transaction};
use std::time::Duration;
use uuid::Uuid;

use crate::contracts::ledger_v1::{CreateSupplierRequest, SupplierDepositRequest};
use crate::domain::Supplier;
use crate::error::{LedgerError, LedgerResult, NotFoundKind};
use crate::repos::purchase_repo::{self, SupplierPurchase};
use crate::repos::supplier_repo::{self, SupplierDeposit};
use crate::services::{supplier_balance, tx};
use crate::validation::{validate_create_supplier, validate_supplier_deposit};

/// Open a supplier account, optionally with an initial credit deposit
pub async fn create_supplier(
    pool: &PgPool,
    tx_timeout: Duration,
    project_id: Uuid,
    req: &CreateSupplierRequest,
) -> LedgerResult<Supplier> {
    validate_create_supplier(req)?;

    let mut tx = tx::begin(pool, tx_timeout).await?;
    let outcome = tx::bounded(tx_timeout, create_in_tx(&mut tx, project_id, req)).await;
    let supplier = tx::settle(tx, outcome, tx_timeout).await?;

    tracing::info!(
        supplier_id = %supplier.id,
        project_id = %project_id,
        current_balance_minor = supplier.current_balance_minor,
        "Supplier created"
    );

    Ok(supplier)
}

async fn create_in_tx(
    tx: &mut Transaction<'_, Postgres>,
    project_id: Uuid,
    req: &CreateSupplierRequest,
) -> LedgerResult<Supplier> {
    let supplier =
        supplier_repo::insert_supplier(tx, Uuid::new_v4(), project_id, req.name.trim()).await?;

    match req.opening_deposit_minor {
        Some(amount_minor) => {
            let deposit_date = req
                .opening_deposit_date
                .unwrap_or_else(|| Utc::now().date_naive());
            supplier_repo::insert_deposit(tx, supplier.id, amount_minor, deposit_date, None)
                .await?;
            supplier_balance::apply_deposit(tx, supplier.id, amount_minor).await
        }
        None => Ok(supplier),
    }
}

/// Extend credit on a supplier; returns the updated account
pub async fn record_supplier_deposit(
    pool: &PgPool,
    tx_timeout: Duration,
    supplier_id: Uuid,
    req: &SupplierDepositRequest,
) -> LedgerResult<Supplier> {
    validate_supplier_deposit(req)?;

    let mut tx = tx::begin(pool, tx_timeout).await?;
    let outcome = tx::bounded(tx_timeout, deposit_in_tx(&mut tx, supplier_id, req)).await;
    let result = tx::settle(tx, outcome, tx_timeout).await;

    match &result {
        Ok(supplier) => tracing::info!(
            supplier_id = %supplier_id,
            amount_minor = req.amount_minor,
            current_balance_minor = supplier.current_balance_minor,
            "Supplier deposit recorded"
        ),
        Err(err) => tracing::warn!(
            supplier_id = %supplier_id,
            error = %err,
            "Supplier deposit rejected"
        ),
    }

    result
}

async fn deposit_in_tx(
    tx: &mut Transaction<'_, Postgres>,
    supplier_id: Uuid,
    req: &SupplierDepositRequest,
) -> LedgerResult<Supplier> {
    // Lock first so a missing supplier is NotFound rather than an FK violation
    let updated = supplier_balance::apply_deposit(tx, supplier_id, req.amount_minor).await?;
    supplier_repo::insert_deposit(
        tx,
        supplier_id,
        req.amount_minor,
        req.deposit_date,
        req.note.as_deref(),
    )
    .await?;
    Ok(updated)
}

pub async fn get_supplier(pool: &PgPool, supplier_id: Uuid) -> LedgerResult<Supplier> {
    supplier_repo::find_by_id(pool, supplier_id)
        .await?
        .ok_or(LedgerError::NotFound(NotFoundKind::Supplier(supplier_id)))
}

pub async fn list_suppliers(pool: &PgPool, project_id: Uuid) -> LedgerResult<Vec<Supplier>> {
    Ok(supplier_repo::list_by_project(pool, project_id).await?)
}

/// Purchases drawn on a supplier, newest first
pub async fn list_purchases(pool: &PgPool, supplier_id: Uuid) -> LedgerResult<Vec<SupplierPurchase>> {
    get_supplier(pool, supplier_id).await?;
    Ok(purchase_repo::list_by_supplier(pool, supplier_id).await?)
}

pub async fn list_deposits(pool: &PgPool, supplier_id: Uuid) -> LedgerResult<Vec<SupplierDeposit>> {
    get_supplier(pool, supplier_id).await?;
    Ok(supplier_repo::list_deposits(pool, supplier_id).await?)
}
