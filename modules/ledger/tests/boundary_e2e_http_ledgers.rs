//! Boundary E2E Test: HTTP → Router → Service → DB
//!
//! Drives the real axum router in-process with `tower::ServiceExt::oneshot`:
//! 1. Status codes for each error kind (400/404/409/422)
//! 2. Response shape of ledgers, suppliers and opening balance
//! 3. Health, readiness and metrics endpoints

mod common;

use axum::body::{to_bytes, Body};
use axum::http::{Method, Request, StatusCode};
use axum::Router;
use common::{cleanup_project, get_test_pool, TEST_TX_TIMEOUT};
use ledger_rs::metrics::Metrics;
use ledger_rs::{router, AppState};
use serde_json::{json, Value};
use serial_test::serial;
use sqlx::PgPool;
use std::sync::Arc;
use tower::ServiceExt;
use uuid::Uuid;

fn app(pool: PgPool) -> Router {
    router(Arc::new(AppState {
        pool,
        tx_timeout: TEST_TX_TIMEOUT,
        metrics: Metrics::new().expect("metrics registry"),
    }))
}

async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let request = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(body) => request
            .header("content-type", "application/json")
            .body(Body::from(body.to_string())),
        None => request.body(Body::empty()),
    }
    .expect("request");

    let response = app.clone().oneshot(request).await.expect("router response");
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.expect("body");
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()))
    };
    (status, value)
}

#[tokio::test]
#[serial]
async fn test_health_and_ready() {
    let app = app(get_test_pool().await);

    let (status, body) = send(&app, Method::GET, "/api/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["service"], "ledger-rs");

    let (status, body) = send(&app, Method::GET, "/api/ready", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["database"], "connected");
}

#[tokio::test]
#[serial]
async fn test_ledger_lifecycle_over_http() {
    let pool = get_test_pool().await;
    let app = app(pool.clone());
    let project_id = Uuid::new_v4();

    let (status, supplier) = send(
        &app,
        Method::POST,
        &format!("/api/projects/{project_id}/suppliers"),
        Some(json!({ "name": "Brick Yard", "opening_deposit_minor": 40000 })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let supplier_id = supplier["id"].as_str().unwrap().to_string();

    let (status, _) = send(
        &app,
        Method::POST,
        &format!("/api/projects/{project_id}/cash-deposits"),
        Some(json!({ "amount_minor": 100000, "deposit_date": "2026-08-01", "method": "cash" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, opening) = send(
        &app,
        Method::GET,
        &format!("/api/projects/{project_id}/opening-balance?date=2026-08-01"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(opening["opening_balance_minor"], 100000);
    assert_eq!(opening["last_closing_balance_minor"], Value::Null);

    let (status, ledger) = send(
        &app,
        Method::POST,
        &format!("/api/projects/{project_id}/ledgers"),
        Some(json!({
            "ledger_date": "2026-08-01",
            "notes": "foundation",
            "lines": [
                { "item": "labour", "category": "Labor", "amount_minor": 30000, "payment_method": "cash" },
                {
                    "item": "bricks", "category": "Materials", "amount_minor": 25000,
                    "payment_method": "supplier", "supplier_id": supplier_id,
                    "quantity": 500.0, "unit": "pcs"
                }
            ]
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "body: {ledger}");
    assert_eq!(ledger["opening_cash_minor"], 100000);
    assert_eq!(ledger["closing_cash_minor"], 70000);
    assert_eq!(ledger["total_supplier_spent_minor"], 25000);
    assert_eq!(ledger["lines"].as_array().unwrap().len(), 2);
    let ledger_id = ledger["id"].as_str().unwrap().to_string();

    let (status, body) = send(
        &app,
        Method::POST,
        &format!("/api/projects/{project_id}/ledgers"),
        Some(json!({ "ledger_date": "2026-08-01", "lines": [] })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["kind"], "duplicate_ledger_date");

    let (status, body) = send(
        &app,
        Method::PUT,
        &format!("/api/ledgers/{ledger_id}"),
        Some(json!({
            "lines": [{
                "item": "bricks", "category": "Materials", "amount_minor": 50000,
                "payment_method": "supplier", "supplier_id": supplier_id
            }]
        })),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["kind"], "insufficient_supplier_balance");
    assert_eq!(body["details"]["shortfall_minor"], 10000);

    let (status, by_date) = send(
        &app,
        Method::GET,
        &format!("/api/projects/{project_id}/ledgers/by-date/2026-08-01"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(by_date["closing_cash_minor"], 70000, "failed update left ledger as it was");

    let (status, receipts) = send(
        &app,
        Method::GET,
        &format!("/api/projects/{project_id}/inventory-receipts"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(receipts.as_array().unwrap().len(), 1);

    let (status, purchases) = send(
        &app,
        Method::GET,
        &format!("/api/suppliers/{supplier_id}/purchases"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(purchases.as_array().unwrap().len(), 1);

    let (status, _) = send(&app, Method::DELETE, &format!("/api/ledgers/{ledger_id}"), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, supplier) = send(&app, Method::GET, &format!("/api/suppliers/{supplier_id}"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(supplier["current_balance_minor"], 40000);

    let (status, body) = send(&app, Method::GET, &format!("/api/ledgers/{ledger_id}"), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["kind"], "not_found");

    let (status, metrics) = send(&app, Method::GET, "/metrics", None).await;
    assert_eq!(status, StatusCode::OK);
    let metrics = metrics.as_str().unwrap();
    assert!(metrics.contains(r#"ledger_writes_total{op="create_ledger",result="ok"} 1"#));
    assert!(metrics.contains(r#"result="insufficient_supplier_balance""#));

    sqlx::query("DELETE FROM events_outbox WHERE aggregate_id = $1")
        .bind(&ledger_id)
        .execute(&pool)
        .await
        .ok();
    cleanup_project(&pool, project_id).await;
}

#[tokio::test]
#[serial]
async fn test_invalid_line_is_bad_request() {
    let pool = get_test_pool().await;
    let app = app(pool.clone());
    let project_id = Uuid::new_v4();

    let (status, body) = send(
        &app,
        Method::POST,
        &format!("/api/projects/{project_id}/ledgers"),
        Some(json!({
            "ledger_date": "2026-08-02",
            "lines": [{ "item": "cement", "category": "Materials", "amount_minor": 1000, "payment_method": "supplier" }]
        })),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["kind"], "validation_error");
    assert!(body["error"].as_str().unwrap().contains("supplier_id"));
}
