use crate::{errors::ServiceError, handlers::common::success_response, AppState};
use axum::{extract::State, response::IntoResponse, routing::post, Json, Router};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Creates the router for payment endpoints
pub fn routes() -> Router<Arc<AppState>> {
    Router::new().route("/order", post(create_payment_order))
}

#[derive(Debug, Deserialize)]
pub struct CreatePaymentOrderRequest {
    /// Amount in minor units (paise)
    pub amount: Option<i64>,
    pub order_id: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct CreatePaymentOrderResponse {
    pub id: String,
    pub amount: i64,
    pub currency: String,
}

/// Open a gateway payment order for an existing order document
async fn create_payment_order(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<CreatePaymentOrderRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    let (amount, order_id) = match (payload.amount, payload.order_id) {
        (Some(amount), Some(order_id)) if !order_id.trim().is_empty() => (amount, order_id),
        _ => {
            return Err(ServiceError::InvalidRequest(
                "Amount and order ID are required".to_string(),
            ))
        }
    };

    let order = state.checkout.create_payment_order(amount, &order_id).await?;

    Ok(success_response(CreatePaymentOrderResponse {
        id: order.id,
        amount: order.amount,
        currency: order.currency,
    }))
}
