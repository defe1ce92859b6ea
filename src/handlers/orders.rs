use crate::{
    errors::ServiceError,
    handlers::common::{created_response, success_response},
    models::{BillingAddress, NewOrderLine, Order, PaymentMethod},
    services::orders::CreateOrderInput,
    AppState,
};
use axum::{
    extract::{Query, State},
    response::IntoResponse,
    routing::{get, patch, post},
    Json, Router,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Creates the router for order endpoints
pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", post(create_order).get(list_orders))
        .route("/status", patch(update_order_status))
}

// Request/response DTOs

#[derive(Debug, Deserialize)]
pub struct CreateOrderRequest {
    pub order_id: String,
    pub items: Vec<OrderItemRequest>,
    pub total: Decimal,
    pub payment_id: String,
    #[serde(default = "default_payment_method")]
    pub payment_method: PaymentMethod,
    #[serde(default)]
    pub razorpay_order_id: Option<String>,
    pub user_id: String,
    pub user_email: String,
    pub billing_address: BillingAddress,
}

fn default_payment_method() -> PaymentMethod {
    PaymentMethod::Whatsapp
}

#[derive(Debug, Deserialize)]
pub struct OrderItemRequest {
    pub product_id: String,
    pub quantity: i64,
}

#[derive(Debug, Serialize)]
pub struct CreateOrderResponse {
    pub order_id: String,
}

#[derive(Debug, Deserialize)]
pub struct UpdateStatusRequest {
    pub order_id: String,
    pub status: String,
}

#[derive(Debug, Deserialize)]
pub struct ListOrdersQuery {
    pub user_id: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct OrdersResponse {
    pub orders: Vec<Order>,
}

/// Create an order document in the content store
async fn create_order(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<CreateOrderRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    let input = CreateOrderInput {
        order_number: payload.order_id,
        lines: payload
            .items
            .into_iter()
            .map(|item| NewOrderLine {
                product_id: item.product_id,
                quantity: item.quantity,
            })
            .collect(),
        total: payload.total,
        payment_id: payload.payment_id,
        payment_method: payload.payment_method,
        gateway_order_id: payload.razorpay_order_id,
        user_id: payload.user_id,
        user_email: payload.user_email,
        billing_address: payload.billing_address,
    };

    let order_id = state.orders.create_order(input).await?;
    Ok(created_response(CreateOrderResponse { order_id }))
}

/// Update an order's status
async fn update_order_status(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<UpdateStatusRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    state
        .orders
        .update_status(&payload.order_id, &payload.status)
        .await?;

    Ok(success_response(serde_json::json!({
        "order_id": payload.order_id,
        "status": payload.status,
    })))
}

/// List a user's order history, newest first
async fn list_orders(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ListOrdersQuery>,
) -> Result<impl IntoResponse, ServiceError> {
    let user_id = query
        .user_id
        .as_deref()
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .ok_or_else(|| ServiceError::InvalidRequest("User ID is required".to_string()))?;

    let orders = state.orders.list_for_user(user_id).await?;
    Ok(success_response(OrdersResponse { orders }))
}
