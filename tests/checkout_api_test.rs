mod common;

use axum::http::StatusCode;
use common::{category, product, TestApp};
use serde_json::json;

fn metadata() -> serde_json::Value {
    json!({
        "order_number": "ORD-2001",
        "customer_name": "Asha Rao",
        "customer_email": "asha@example.com",
        "user_id": "user-1"
    })
}

#[tokio::test]
async fn session_carries_key_id_and_minor_unit_amount() {
    let app = TestApp::new();
    let shirt = product("p-1", vec![category("c1", "Shirts")]);

    let (status, body) = app
        .post_json(
            "/api/v1/checkout/session",
            json!({
                "items": [{ "product": shirt, "quantity": 2 }],
                "metadata": metadata()
            }),
        )
        .await;

    assert_eq!(status, StatusCode::OK);
    // 2 × ₹499 in paise.
    assert_eq!(body["amount"].as_i64().unwrap(), 99_800);
    assert_eq!(body["currency"], "INR");
    assert_eq!(body["key_id"], "rzp_test_key");
    assert_eq!(body["gateway_order_id"], "gw_order_1");

    let request = app.gateway.last_request().unwrap();
    assert_eq!(request.amount, 99_800);
    assert_eq!(request.receipt, "ORD-2001");
    assert_eq!(request.notes["orderNumber"], "ORD-2001");
    assert_eq!(request.notes["customerEmail"], "asha@example.com");
    assert!(request.notes["items"].contains("p-1"));
}

#[tokio::test]
async fn empty_basket_is_rejected() {
    let app = TestApp::new();

    let (status, body) = app
        .post_json(
            "/api/v1/checkout/session",
            json!({ "items": [], "metadata": metadata() }),
        )
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"].as_str().unwrap(), "Invalid request: Basket is empty");
}

#[tokio::test]
async fn unpriced_items_are_rejected() {
    let app = TestApp::new();
    let mut draft = product("p-draft", vec![]);
    draft.price = None;

    let (status, body) = app
        .post_json(
            "/api/v1/checkout/session",
            json!({
                "items": [{ "product": draft, "quantity": 1 }],
                "metadata": metadata()
            }),
        )
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        body["error"].as_str().unwrap(),
        "Invalid request: Some items do not have a price"
    );
    assert!(app.gateway.last_request().is_none());
}

#[tokio::test]
async fn missing_order_number_is_rejected() {
    let app = TestApp::new();
    let shirt = product("p-1", vec![]);
    let mut meta = metadata();
    meta["order_number"] = json!("  ");

    let (status, _) = app
        .post_json(
            "/api/v1/checkout/session",
            json!({ "items": [{ "product": shirt, "quantity": 1 }], "metadata": meta }),
        )
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn gateway_failures_surface_with_a_generic_message() {
    let app = TestApp::new();
    app.gateway.fail_next(true);
    let shirt = product("p-1", vec![]);

    let (status, body) = app
        .post_json(
            "/api/v1/checkout/session",
            json!({ "items": [{ "product": shirt, "quantity": 1 }], "metadata": metadata() }),
        )
        .await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(
        body["error"].as_str().unwrap(),
        "Failed to create payment order"
    );
}

#[tokio::test]
async fn payment_order_uses_the_given_minor_unit_amount() {
    let app = TestApp::new();

    let (status, body) = app
        .post_json(
            "/api/v1/payments/order",
            json!({ "amount": 49_900, "order_id": "ORD-2002" }),
        )
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["amount"].as_i64().unwrap(), 49_900);
    assert_eq!(body["id"], "gw_order_1");

    let request = app.gateway.last_request().unwrap();
    assert_eq!(request.receipt, "ORD-2002");
    assert!(request.notes.is_empty());
}

#[tokio::test]
async fn payment_order_requires_amount_and_order_id() {
    let app = TestApp::new();

    let (status, body) = app
        .post_json("/api/v1/payments/order", json!({ "amount": 49_900 }))
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        body["error"].as_str().unwrap(),
        "Invalid request: Amount and order ID are required"
    );
}

#[tokio::test]
async fn payment_order_rejects_non_positive_amounts() {
    let app = TestApp::new();

    let (status, _) = app
        .post_json(
            "/api/v1/payments/order",
            json!({ "amount": 0, "order_id": "ORD-2003" }),
        )
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
}
