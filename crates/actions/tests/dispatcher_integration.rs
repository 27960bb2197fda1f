//! Dispatcher behaviour against in-process stand-ins for the order, customer,
//! asset and invoicing services.

use std::sync::{Arc, Mutex};

use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::routing::post;
use axum::{Json, Router};
use serde_json::{json, Value};

use triage_actions::{ActionDispatcher, HttpActionDispatcher};
use triage_core::config::ActionsConfig;
use triage_core::{ActionKind, ActionStatus, InvoicePayload, LineItem};

// ── Helpers ──────────────────────────────────────────────────────

type Seen = Arc<Mutex<Vec<(String, Value)>>>;

async fn spawn(app: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}")
}

/// Order/customer/asset stub that records every body it receives.
fn services(seen: Seen) -> Router {
    Router::new()
        .route(
            "/retry-order",
            post(|State(seen): State<Seen>, Json(body): Json<Value>| async move {
                let id = body["order_id"].as_str().unwrap_or_default().to_string();
                seen.lock().unwrap().push(("/retry-order".into(), body));
                let message = format!("Order {id} has been successfully retried in OSM.");
                Json(json!({"status": "success", "message": message}))
            }),
        )
        .route(
            "/sync-customer-data",
            post(|State(seen): State<Seen>, Json(body): Json<Value>| async move {
                seen.lock().unwrap().push(("/sync-customer-data".into(), body));
                Json(json!({"status": "success", "message": "synced"}))
            }),
        )
        .route(
            "/fix-asset",
            post(|| async { (StatusCode::INTERNAL_SERVER_ERROR, "asset store offline") }),
        )
        .with_state(seen)
}

fn invoice_api(seen: Seen) -> Router {
    Router::new()
        .route(
            "/invoices",
            post(
                |State(seen): State<Seen>, headers: HeaderMap, Json(body): Json<Value>| async move {
                    let token = headers
                        .get("x-api-token")
                        .and_then(|v| v.to_str().ok())
                        .unwrap_or_default()
                        .to_string();
                    seen.lock().unwrap().push((token.clone(), body.clone()));
                    if token != "secret" {
                        let body = json!({"message": "Invalid token"});
                        return (StatusCode::UNAUTHORIZED, Json(body));
                    }
                    if body["client_id"] == "BAD" {
                        let body = json!({"message": "client not found"});
                        return (StatusCode::UNPROCESSABLE_ENTITY, Json(body));
                    }
                    (StatusCode::OK, Json(json!({"id": "inv_123"})))
                },
            ),
        )
        .with_state(seen)
}

fn invoice_dispatcher(invoice_url: String, key: &str) -> HttpActionDispatcher {
    HttpActionDispatcher::new(&config("http://127.0.0.1:1", Some(invoice_url), Some(key))).unwrap()
}

fn config(services_url: &str, invoice_url: Option<String>, key: Option<&str>) -> ActionsConfig {
    ActionsConfig {
        order_service_url: services_url.to_string(),
        customer_service_url: services_url.to_string(),
        asset_service_url: services_url.to_string(),
        invoice_base_url: invoice_url,
        invoice_api_key: key.map(String::from),
        timeout_secs: 5,
    }
}

fn payload(client_id: &str) -> InvoicePayload {
    InvoicePayload {
        client_id: client_id.into(),
        line_items: vec![LineItem {
            product_key: "license".into(),
            notes: "annual".into(),
            cost: 100.0,
            quantity: 2.0,
        }],
    }
}

// ── Identifier actions ───────────────────────────────────────────

#[tokio::test]
async fn order_actions_post_trimmed_query_as_order_id() {
    let seen: Seen = Arc::default();
    let base = spawn(services(seen.clone())).await;
    let dispatcher = HttpActionDispatcher::new(&config(&base, None, None)).unwrap();

    let result = dispatcher.dispatch(ActionKind::UpdateOrder, "  ORD-778  ", None).await;
    assert_eq!(result.status, ActionStatus::Success);
    assert_eq!(result.message, "Order ORD-778 has been successfully retried in OSM.");

    let seen = seen.lock().unwrap();
    assert_eq!(seen.len(), 1);
    assert_eq!(seen[0].0, "/retry-order");
    assert_eq!(seen[0].1, json!({"order_id": "ORD-778"}));
}

#[tokio::test]
async fn customer_sync_uses_customer_id() {
    let seen: Seen = Arc::default();
    let base = spawn(services(seen.clone())).await;
    let dispatcher = HttpActionDispatcher::new(&config(&base, None, None)).unwrap();

    let result = dispatcher.dispatch(ActionKind::SyncCustomerData, "CUST-9", None).await;
    assert!(result.is_success());
    assert_eq!(seen.lock().unwrap()[0].1, json!({"customer_id": "CUST-9"}));
}

#[tokio::test]
async fn remote_http_error_is_a_failure_result() {
    let base = spawn(services(Arc::default())).await;
    let dispatcher = HttpActionDispatcher::new(&config(&base, None, None)).unwrap();

    let result = dispatcher.dispatch(ActionKind::FixAssetMismatch, "AST-1", None).await;
    assert_eq!(result.status, ActionStatus::Failure);
    assert_eq!(result.message, "asset store offline");
}

#[tokio::test]
async fn unreachable_service_is_an_error_result() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let dead = format!("http://{}", listener.local_addr().unwrap());
    drop(listener);

    let dispatcher = HttpActionDispatcher::new(&config(&dead, None, None)).unwrap();
    let result = dispatcher.dispatch(ActionKind::RetryOrder, "ORD-1", None).await;
    assert_eq!(result.status, ActionStatus::Error);
    assert!(!result.message.is_empty());
}

#[tokio::test]
async fn create_order_sends_nothing() {
    let seen: Seen = Arc::default();
    let base = spawn(services(seen.clone())).await;
    let dispatcher = HttpActionDispatcher::new(&config(&base, None, None)).unwrap();

    let result = dispatcher
        .dispatch(ActionKind::CreateOrder, "please create a new order for ACME", None)
        .await;
    assert_eq!(result.status, ActionStatus::Error);
    assert_eq!(result.message, "No remote action mapped for action: create_order");
    assert!(seen.lock().unwrap().is_empty());
}

#[tokio::test]
async fn restart_server_has_no_remote_mapping() {
    let dispatcher = HttpActionDispatcher::new(&config("http://127.0.0.1:1", None, None)).unwrap();
    let result = dispatcher.dispatch(ActionKind::RestartServer, "web-01", None).await;
    assert_eq!(result.status, ActionStatus::Error);
    assert_eq!(result.message, "No remote action mapped for action: restart_server");
}

// ── Invoice actions ──────────────────────────────────────────────

#[tokio::test]
async fn invoice_created_with_token_header() {
    let seen: Seen = Arc::default();
    let base = spawn(invoice_api(seen.clone())).await;
    let dispatcher = invoice_dispatcher(base, "secret");

    let result = dispatcher
        .dispatch(ActionKind::CreateInvoice, "bill ACME", Some(&payload("ACME")))
        .await;
    assert_eq!(result.status, ActionStatus::Success);
    assert_eq!(result.message, "Invoice created successfully");
    assert_eq!(result.invoice_id.as_deref(), Some("inv_123"));

    let seen = seen.lock().unwrap();
    assert_eq!(seen[0].0, "secret");
    assert_eq!(seen[0].1["client_id"], "ACME");
    assert_eq!(seen[0].1["line_items"][0]["quantity"], 2.0);
}

#[tokio::test]
async fn invoice_rejection_carries_the_body() {
    let base = spawn(invoice_api(Arc::default())).await;
    let dispatcher = invoice_dispatcher(base, "secret");

    let result = dispatcher
        .dispatch(ActionKind::UpdateInvoice, "bill BAD", Some(&payload("BAD")))
        .await;
    assert_eq!(result.status, ActionStatus::Failure);
    assert!(result.message.contains("client not found"));
    assert_eq!(result.invoice_id, None);
}

#[tokio::test]
async fn invoice_without_payload_is_refused() {
    let dispatcher = invoice_dispatcher("http://127.0.0.1:1".into(), "k");
    let result = dispatcher.dispatch(ActionKind::CreateInvoice, "bill", None).await;
    assert_eq!(result.status, ActionStatus::Error);
    assert_eq!(result.message, "Invoice action requires payload");
}

#[tokio::test]
async fn invoice_without_configuration_is_an_error() {
    let dispatcher = HttpActionDispatcher::new(&config("http://127.0.0.1:1", None, None)).unwrap();
    let result = dispatcher
        .dispatch(ActionKind::CreateInvoice, "bill", Some(&payload("ACME")))
        .await;
    assert_eq!(result.status, ActionStatus::Error);
    assert!(result.message.contains("NINJA_URL"));
}
