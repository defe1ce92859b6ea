use crate::{
    errors::ServiceError,
    handlers::common::success_response,
    services::checkout::{CheckoutLine, CheckoutMetadata},
    AppState,
};
use axum::{extract::State, response::IntoResponse, routing::post, Json, Router};
use serde::Deserialize;
use std::sync::Arc;

/// Creates the router for checkout endpoints
pub fn routes() -> Router<Arc<AppState>> {
    Router::new().route("/session", post(create_checkout_session))
}

#[derive(Debug, Deserialize)]
pub struct CreateCheckoutSessionRequest {
    pub items: Vec<CheckoutLine>,
    pub metadata: CheckoutMetadata,
}

/// Open a gateway payment order for the basket (card flow)
async fn create_checkout_session(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<CreateCheckoutSessionRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    if payload.metadata.order_number.trim().is_empty() {
        return Err(ServiceError::InvalidRequest(
            "Order number is required".to_string(),
        ));
    }

    let session = state
        .checkout
        .create_session(&payload.items, &payload.metadata)
        .await?;

    Ok(success_response(session))
}
