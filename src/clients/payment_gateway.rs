//! Client for the card payment gateway.

use crate::{config::PaymentConfig, errors::ServiceError};
use async_trait::async_trait;
use base64::Engine;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::time::Duration;
use tracing::instrument;

/// Request to open a payment order with the gateway.
///
/// Amounts are in the currency's minor unit (paise for INR).
#[derive(Debug, Clone, Serialize)]
pub struct GatewayOrderRequest {
    pub amount: i64,
    pub currency: String,
    pub receipt: String,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub notes: BTreeMap<String, String>,
}

/// A payment order as created by the gateway.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayOrder {
    pub id: String,
    pub amount: i64,
    pub currency: String,
}

/// Payment gateway seam. The single operation this storefront needs is
/// opening a payment order; capture and settlement happen gateway-side and
/// come back through the webhook.
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    async fn create_order(&self, request: &GatewayOrderRequest)
        -> Result<GatewayOrder, ServiceError>;
}

/// HTTP implementation of [`PaymentGateway`] against a Razorpay-shaped API.
#[derive(Clone)]
pub struct HttpPaymentGateway {
    client: reqwest::Client,
    base_url: String,
    auth_header: String,
}

impl HttpPaymentGateway {
    pub fn new(config: &PaymentConfig) -> Result<Self, ServiceError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .map_err(|e| ServiceError::Internal(format!("failed to build http client: {}", e)))?;

        let credentials = format!("{}:{}", config.key_id, config.key_secret);
        let auth_header = format!(
            "Basic {}",
            base64::engine::general_purpose::STANDARD.encode(credentials)
        );

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            auth_header,
        })
    }
}

#[async_trait]
impl PaymentGateway for HttpPaymentGateway {
    #[instrument(skip(self, request), fields(receipt = %request.receipt, amount = request.amount))]
    async fn create_order(
        &self,
        request: &GatewayOrderRequest,
    ) -> Result<GatewayOrder, ServiceError> {
        let response = self
            .client
            .post(format!("{}/v1/orders", self.base_url))
            .header(reqwest::header::AUTHORIZATION, &self.auth_header)
            .json(request)
            .send()
            .await
            .map_err(|e| ServiceError::PaymentFailed(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(ServiceError::PaymentFailed(format!(
                "gateway returned {}: {}",
                status, body
            )));
        }

        response
            .json::<GatewayOrder>()
            .await
            .map_err(|e| ServiceError::PaymentFailed(format!("invalid gateway response: {}", e)))
    }
}
