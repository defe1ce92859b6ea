use crate::{errors::ServiceError, handlers::common::success_response, AppState};
use axum::{extract::State, http::HeaderMap, response::IntoResponse, routing::post, Router};
use bytes::Bytes;
use hmac::{Hmac, Mac};
use serde_json::Value;
use sha2::Sha256;
use std::sync::Arc;
use tracing::{info, warn};

type HmacSha256 = Hmac<Sha256>;

const SIGNATURE_HEADER: &str = "x-razorpay-signature";

/// Creates the router for the payment gateway webhook
pub fn routes() -> Router<Arc<AppState>> {
    Router::new().route("/webhook", post(payment_webhook))
}

/// Handle payment gateway events. The body is consumed raw because the
/// signature covers the exact bytes on the wire.
async fn payment_webhook(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<impl IntoResponse, ServiceError> {
    let signature = headers
        .get(SIGNATURE_HEADER)
        .and_then(|value| value.to_str().ok())
        .ok_or_else(|| ServiceError::InvalidRequest("No gateway signature found".to_string()))?;

    let secret = state.config.payment.webhook_secret.as_deref().ok_or_else(|| {
        ServiceError::Internal("webhook secret is not configured".to_string())
    })?;

    if !verify_signature(&body, signature, secret) {
        warn!("Payment webhook signature verification failed");
        return Err(ServiceError::InvalidRequest(
            "Invalid signature".to_string(),
        ));
    }

    let event: Value = serde_json::from_slice(&body)
        .map_err(|e| ServiceError::InvalidRequest(format!("Invalid payload: {}", e)))?;
    let event_type = event.get("event").and_then(Value::as_str).unwrap_or("");

    match event_type {
        "payment.captured" => {
            let payment = payment_entity(&event)?;
            state
                .orders
                .handle_payment_captured(payment.gateway_order_id, payment.payment_id)
                .await?;
            Ok(success_response(serde_json::json!({
                "message": "Payment successful and order updated"
            })))
        }
        "payment.failed" => {
            let payment = payment_entity(&event)?;
            state
                .orders
                .handle_payment_failed(payment.gateway_order_id)
                .await?;
            Ok(success_response(serde_json::json!({
                "message": "Payment failed and order updated"
            })))
        }
        other => {
            info!("Unhandled payment webhook event: {}", other);
            Ok(success_response(serde_json::json!({
                "message": "Webhook received but no action taken"
            })))
        }
    }
}

struct PaymentEntity<'a> {
    gateway_order_id: &'a str,
    payment_id: &'a str,
}

fn payment_entity(event: &Value) -> Result<PaymentEntity<'_>, ServiceError> {
    let entity = event
        .pointer("/payload/payment/entity")
        .ok_or_else(|| ServiceError::InvalidRequest("Missing payment entity".to_string()))?;
    let gateway_order_id = entity
        .get("order_id")
        .and_then(Value::as_str)
        .ok_or_else(|| ServiceError::InvalidRequest("Missing payment order id".to_string()))?;
    let payment_id = entity.get("id").and_then(Value::as_str).unwrap_or("");
    Ok(PaymentEntity {
        gateway_order_id,
        payment_id,
    })
}

/// Hex HMAC-SHA256 of the raw body, compared in constant time.
fn verify_signature(payload: &[u8], signature: &str, secret: &str) -> bool {
    let mut mac = match HmacSha256::new_from_slice(secret.as_bytes()) {
        Ok(mac) => mac,
        Err(_) => return false,
    };
    mac.update(payload);
    let expected = hex::encode(mac.finalize().into_bytes());
    constant_time_eq(expected.as_bytes(), signature.as_bytes())
}

fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    let mut res = 0u8;
    for (x, y) in a.iter().zip(b) {
        res |= x ^ y;
    }
    res == 0
}
