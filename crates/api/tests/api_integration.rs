//! Integration tests for the API server.

use std::sync::{Arc, OnceLock};

use api::routes::webhooks::AppState;
use api::signature::{SIGNATURE_HEADER, sign};
use axum::body::Body;
use axum::http::{Request, StatusCode};
use metrics_exporter_prometheus::PrometheusHandle;
use serde_json::{Value, json};
use splitter::{
    InMemoryCatalogService, InMemoryIdempotencyLedger, InMemoryOrderGateway, SplitCoordinator,
    SplitPolicy,
};
use tower::ServiceExt;

const SECRET: &str = "test-webhook-secret";

static METRICS_HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();

fn get_metrics_handle() -> PrometheusHandle {
    METRICS_HANDLE
        .get_or_init(|| {
            let builder = metrics_exporter_prometheus::PrometheusBuilder::new();
            builder
                .install_recorder()
                .expect("failed to install Prometheus recorder")
        })
        .clone()
}

struct TestApp {
    router: axum::Router,
    catalog: InMemoryCatalogService,
    orders: InMemoryOrderGateway,
}

fn setup_with(secret: Option<&str>, policy: SplitPolicy) -> TestApp {
    let catalog = InMemoryCatalogService::new();
    let orders = InMemoryOrderGateway::new();
    let coordinator = SplitCoordinator::with_ledger(
        catalog.clone(),
        orders.clone(),
        InMemoryIdempotencyLedger::new(),
        policy,
    );
    let state = Arc::new(AppState::new(coordinator, secret.map(str::to_string)));
    TestApp {
        router: api::create_app(state, get_metrics_handle()),
        catalog,
        orders,
    }
}

fn setup() -> TestApp {
    setup_with(Some(SECRET), SplitPolicy::default())
}

fn order_json(quantity: u32) -> Value {
    json!({
        "id": 5551234,
        "name": "#1001",
        "tags": "VIP",
        "email": "buyer@example.com",
        "customer": {"id": 77},
        "line_items": [
            {"product_id": 10, "variant_id": 20, "quantity": quantity}
        ]
    })
}

fn signed_request(body: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/webhooks/orders/create")
        .header("content-type", "application/json")
        .header(SIGNATURE_HEADER, sign(SECRET, body.as_bytes()))
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn send(router: &axum::Router, request: Request<Body>) -> (StatusCode, String) {
    let response = router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, String::from_utf8(body.to_vec()).unwrap())
}

#[tokio::test]
async fn test_health_check() {
    let app = setup();

    let response = app
        .router
        .oneshot(
            Request::builder()
                .uri("/health")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(json["status"], "ok");
    assert_eq!(json["service"], "order-splitter");
}

#[tokio::test]
async fn test_metrics_endpoint() {
    let app = setup();
    app.catalog.set_capacity("10", "500").await;
    let body = order_json(1000).to_string();
    send(&app.router, signed_request(&body)).await;

    let (status, text) = send(
        &app.router,
        Request::builder()
            .uri("/metrics")
            .body(Body::empty())
            .unwrap(),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert!(text.contains("split_requests_total"));
}

#[tokio::test]
async fn test_signed_webhook_splits_order() {
    let app = setup();
    app.catalog.set_capacity("10", "500").await;
    let body = order_json(2300).to_string();

    let (status, text) = send(&app.router, signed_request(&body)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(text, "Order #1001 processed: 5 child orders created, 0 failed");

    let children = app.orders.created_orders().await;
    let quantities: Vec<u32> = children.iter().map(|c| c.line_item.quantity).collect();
    assert_eq!(quantities, vec![500, 500, 500, 500, 300]);
    assert_eq!(children[0].customer_id.as_ref().map(|c| c.as_str()), Some("77"));

    let updates = app.orders.tag_updates().await;
    assert_eq!(updates.len(), 1);
    assert_eq!(updates[0].1, "VIP, Split-Processed");
}

#[tokio::test]
async fn test_response_is_plain_text() {
    let app = setup();
    let body = order_json(5).to_string();

    let response = app.router.oneshot(signed_request(&body)).await.unwrap();

    let content_type = response
        .headers()
        .get("content-type")
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string();
    assert!(content_type.starts_with("text/plain"));
}

#[tokio::test]
async fn test_invalid_signature_is_rejected_without_calls() {
    let app = setup();
    app.catalog.set_capacity("10", "500").await;
    let body = order_json(2300).to_string();

    let request = Request::builder()
        .method("POST")
        .uri("/webhooks/orders/create")
        .header(SIGNATURE_HEADER, sign("wrong-secret", body.as_bytes()))
        .body(Body::from(body))
        .unwrap();
    let (status, _) = send(&app.router, request).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(app.catalog.lookup_count().await, 0);
    assert_eq!(app.orders.call_count().await, 0);
}

#[tokio::test]
async fn test_missing_signature_is_rejected() {
    let app = setup();
    let request = Request::builder()
        .method("POST")
        .uri("/webhooks/orders/create")
        .body(Body::from(order_json(10).to_string()))
        .unwrap();

    let (status, _) = send(&app.router, request).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_tampered_body_is_rejected() {
    let app = setup();
    let signed = order_json(10).to_string();
    let request = Request::builder()
        .method("POST")
        .uri("/webhooks/orders/create")
        .header(SIGNATURE_HEADER, sign(SECRET, signed.as_bytes()))
        .body(Body::from(order_json(9999).to_string()))
        .unwrap();

    let (status, _) = send(&app.router, request).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_unsigned_webhook_accepted_without_secret() {
    let app = setup_with(None, SplitPolicy::default());
    app.catalog.set_capacity("10", "4").await;
    let request = Request::builder()
        .method("POST")
        .uri("/webhooks/orders/create")
        .body(Body::from(order_json(10).to_string()))
        .unwrap();

    let (status, text) = send(&app.router, request).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(text, "Order #1001 processed: 3 child orders created, 0 failed");
}

#[tokio::test]
async fn test_already_processed_order() {
    let app = setup();
    let mut payload = order_json(2300);
    payload["tags"] = json!("VIP, Split-Processed");
    let body = payload.to_string();

    let (status, text) = send(&app.router, signed_request(&body)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(text, "Order #1001 already processed");
    assert_eq!(app.orders.call_count().await, 0);
}

#[tokio::test]
async fn test_redelivery_does_not_split_twice() {
    let app = setup();
    app.catalog.set_capacity("10", "500").await;
    let body = order_json(1200).to_string();

    let (_, first) = send(&app.router, signed_request(&body)).await;
    let (status, second) = send(&app.router, signed_request(&body)).await;

    assert!(first.contains("3 child orders created"));
    assert_eq!(status, StatusCode::OK);
    assert_eq!(second, "Order #1001 already processed");
    assert_eq!(app.orders.creation_attempts().await, 3);
}

#[tokio::test]
async fn test_empty_line_items_accepted() {
    let app = setup();
    let mut payload = order_json(1);
    payload["line_items"] = json!([]);
    let body = payload.to_string();

    let (status, text) = send(&app.router, signed_request(&body)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(text, "Order #1001 has no line items");
    assert_eq!(app.orders.call_count().await, 0);
}

#[tokio::test]
async fn test_missing_line_items_is_server_error() {
    let app = setup();
    let body = json!({"id": 5551234, "name": "#1001"}).to_string();

    let (status, text) = send(&app.router, signed_request(&body)).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(text.starts_with("Error processing order"));
}

#[tokio::test]
async fn test_invalid_json_is_server_error() {
    let app = setup();

    let (status, _) = send(&app.router, signed_request("{not json")).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
}

#[tokio::test]
async fn test_catalog_failure_is_server_error() {
    let app = setup();
    app.catalog.fail_product("10").await;
    let body = order_json(2300).to_string();

    let (status, text) = send(&app.router, signed_request(&body)).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(text.contains("catalog unavailable"));
    assert_eq!(app.orders.call_count().await, 0);
}

#[tokio::test]
async fn test_tagging_failure_still_succeeds() {
    let app = setup();
    app.catalog.set_capacity("10", "500").await;
    app.orders.set_fail_on_tag_update(true).await;
    let body = order_json(1000).to_string();

    let (status, text) = send(&app.router, signed_request(&body)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        text,
        "Order #1001 processed: 2 child orders created, 0 failed, tagging failed"
    );
}

#[tokio::test]
async fn test_string_identifiers_are_accepted() {
    let app = setup();
    app.catalog.set_capacity("10", "2").await;
    let body = json!({
        "id": "5551234",
        "name": "#1001",
        "tags": ["VIP"],
        "line_items": [{"product_id": "10", "variant_id": "20", "quantity": 3}]
    })
    .to_string();

    let (status, text) = send(&app.router, signed_request(&body)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(text, "Order #1001 processed: 2 child orders created, 0 failed");
}

#[tokio::test]
async fn test_unknown_route() {
    let app = setup();

    let (status, _) = send(
        &app.router,
        Request::builder()
            .uri("/webhooks/orders/update")
            .body(Body::empty())
            .unwrap(),
    )
    .await;

    assert_eq!(status, StatusCode::NOT_FOUND);
}
