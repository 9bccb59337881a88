//! Integration tests for supplier accounts and the balance identity

mod common;

use common::{cleanup_project, date, get_test_pool, setup_supplier, supplier_line, TEST_TX_TIMEOUT};
use ledger_rs::contracts::ledger_v1::{CreateLedgerRequest, CreateSupplierRequest, SupplierDepositRequest};
use ledger_rs::domain::LineCategory;
use ledger_rs::error::{LedgerError, NotFoundKind};
use ledger_rs::services::ledger_service::create_ledger;
use ledger_rs::services::supplier_service::{
    create_supplier, get_supplier, list_deposits, list_purchases, list_suppliers,
    record_supplier_deposit,
};
use ledger_rs::validation::ValidationError;
use serial_test::serial;
use uuid::Uuid;

#[tokio::test]
#[serial]
async fn test_create_supplier_with_opening_deposit() {
    let pool = get_test_pool().await;
    let project_id = Uuid::new_v4();

    let supplier = create_supplier(
        &pool,
        TEST_TX_TIMEOUT,
        project_id,
        &CreateSupplierRequest {
            name: "  Quarry One  ".to_string(),
            opening_deposit_minor: Some(25_000),
            opening_deposit_date: Some(date(2026, 6, 1)),
        },
    )
    .await
    .unwrap();

    assert_eq!(supplier.name, "Quarry One");
    assert_eq!(supplier.total_deposited_minor, 25_000);
    assert_eq!(supplier.total_spent_minor, 0);
    assert_eq!(supplier.current_balance_minor, 25_000);

    let deposits = list_deposits(&pool, supplier.id).await.unwrap();
    assert_eq!(deposits.len(), 1);
    assert_eq!(deposits[0].amount_minor, 25_000);
    assert_eq!(deposits[0].deposit_date, date(2026, 6, 1));

    cleanup_project(&pool, project_id).await;
}

#[tokio::test]
#[serial]
async fn test_deposit_extends_credit() {
    let pool = get_test_pool().await;
    let project_id = Uuid::new_v4();
    let supplier = setup_supplier(&pool, project_id, "Pipe World", 10_000).await;

    let updated = record_supplier_deposit(
        &pool,
        TEST_TX_TIMEOUT,
        supplier.id,
        &SupplierDepositRequest {
            amount_minor: 5_000,
            deposit_date: date(2026, 6, 2),
            note: Some("top-up".to_string()),
        },
    )
    .await
    .unwrap();

    assert_eq!(updated.total_deposited_minor, 15_000);
    assert_eq!(updated.current_balance_minor, 15_000);
    assert_eq!(get_supplier(&pool, supplier.id).await.unwrap(), updated);
    assert_eq!(list_deposits(&pool, supplier.id).await.unwrap().len(), 2);

    cleanup_project(&pool, project_id).await;
}

#[tokio::test]
#[serial]
async fn test_top_up_allows_previously_rejected_spend() {
    let pool = get_test_pool().await;
    let project_id = Uuid::new_v4();
    let supplier = setup_supplier(&pool, project_id, "Cable House", 40_000).await;

    let req = CreateLedgerRequest {
        ledger_date: date(2026, 6, 3),
        notes: None,
        lines: vec![supplier_line("cable", LineCategory::Materials, 50_000, supplier.id)],
    };

    let err = create_ledger(&pool, TEST_TX_TIMEOUT, project_id, &req).await.unwrap_err();
    assert!(matches!(err, LedgerError::InsufficientSupplierBalance { shortfall_minor: 10_000, .. }));

    record_supplier_deposit(
        &pool,
        TEST_TX_TIMEOUT,
        supplier.id,
        &SupplierDepositRequest {
            amount_minor: 10_000,
            deposit_date: date(2026, 6, 3),
            note: None,
        },
    )
    .await
    .unwrap();

    create_ledger(&pool, TEST_TX_TIMEOUT, project_id, &req).await.unwrap();

    let after = get_supplier(&pool, supplier.id).await.unwrap();
    assert_eq!(after.current_balance_minor, 0);
    assert_eq!(after.total_spent_minor, 50_000);
    assert_eq!(list_purchases(&pool, supplier.id).await.unwrap().len(), 1);

    cleanup_project(&pool, project_id).await;
}

#[tokio::test]
#[serial]
async fn test_deposit_validation_and_unknown_supplier() {
    let pool = get_test_pool().await;

    let err = record_supplier_deposit(
        &pool,
        TEST_TX_TIMEOUT,
        Uuid::new_v4(),
        &SupplierDepositRequest {
            amount_minor: 0,
            deposit_date: date(2026, 6, 4),
            note: None,
        },
    )
    .await
    .unwrap_err();
    assert!(matches!(
        err,
        LedgerError::Validation(ValidationError::NonPositiveDeposit(0))
    ));

    let missing = Uuid::new_v4();
    let err = record_supplier_deposit(
        &pool,
        TEST_TX_TIMEOUT,
        missing,
        &SupplierDepositRequest {
            amount_minor: 1_000,
            deposit_date: date(2026, 6, 4),
            note: None,
        },
    )
    .await
    .unwrap_err();
    assert!(matches!(
        err,
        LedgerError::NotFound(NotFoundKind::Supplier(id)) if id == missing
    ));
}

#[tokio::test]
#[serial]
async fn test_list_suppliers_is_scoped_to_project() {
    let pool = get_test_pool().await;
    let project_id = Uuid::new_v4();
    let other_project = Uuid::new_v4();

    setup_supplier(&pool, project_id, "B Supplies", 0).await;
    setup_supplier(&pool, project_id, "A Supplies", 0).await;
    setup_supplier(&pool, other_project, "C Supplies", 0).await;

    let names: Vec<String> = list_suppliers(&pool, project_id)
        .await
        .unwrap()
        .into_iter()
        .map(|s| s.name)
        .collect();
    assert_eq!(names, vec!["A Supplies".to_string(), "B Supplies".to_string()]);

    cleanup_project(&pool, project_id).await;
    cleanup_project(&pool, other_project).await;
}
