//! Checkout amount computation and gateway payment-order creation.

use crate::{
    clients::{GatewayOrder, GatewayOrderRequest, PaymentGateway},
    config::AppConfig,
    errors::ServiceError,
    models::Product,
};
use rust_decimal::{prelude::ToPrimitive, Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{info, instrument};

/// A grouped basket line: one product and the total quantity of it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckoutLine {
    pub product: Product,
    pub quantity: u32,
}

/// Order metadata attached to the gateway payment order as notes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckoutMetadata {
    pub order_number: String,
    pub customer_name: String,
    pub customer_email: String,
    pub user_id: String,
}

/// Everything the card widget needs to collect the payment client-side.
#[derive(Debug, Clone, Serialize)]
pub struct CheckoutSession {
    pub key_id: String,
    pub gateway_order_id: String,
    pub amount: i64,
    pub currency: String,
    pub notes: BTreeMap<String, String>,
}

#[derive(Clone)]
pub struct CheckoutService {
    gateway: Arc<dyn PaymentGateway>,
    config: Arc<AppConfig>,
}

impl CheckoutService {
    pub fn new(gateway: Arc<dyn PaymentGateway>, config: Arc<AppConfig>) -> Self {
        Self { gateway, config }
    }

    /// Opens a gateway payment order for a basket (card flow).
    ///
    /// Every line must carry a priced product; the basket total is converted
    /// to minor units before it reaches the gateway.
    #[instrument(skip(self, lines, metadata), fields(order_number = %metadata.order_number))]
    pub async fn create_session(
        &self,
        lines: &[CheckoutLine],
        metadata: &CheckoutMetadata,
    ) -> Result<CheckoutSession, ServiceError> {
        if lines.is_empty() {
            return Err(ServiceError::InvalidRequest(
                "Basket is empty".to_string(),
            ));
        }
        if lines.iter().any(|line| line.product.price.is_none()) {
            return Err(ServiceError::InvalidRequest(
                "Some items do not have a price".to_string(),
            ));
        }

        let total: Decimal = lines
            .iter()
            .map(|line| {
                line.product.price.unwrap_or(Decimal::ZERO) * Decimal::from(line.quantity)
            })
            .sum();
        let amount = to_minor_units(total)?;

        let mut notes = BTreeMap::new();
        notes.insert("orderNumber".to_string(), metadata.order_number.clone());
        notes.insert("customerName".to_string(), metadata.customer_name.clone());
        notes.insert("customerEmail".to_string(), metadata.customer_email.clone());
        notes.insert("userId".to_string(), metadata.user_id.clone());
        notes.insert("items".to_string(), serde_json::to_string(&line_summaries(lines))?);

        let order = self
            .gateway
            .create_order(&GatewayOrderRequest {
                amount,
                currency: self.config.payment.currency.clone(),
                receipt: metadata.order_number.clone(),
                notes: notes.clone(),
            })
            .await?;

        info!(
            "Opened checkout session {} for {} {}",
            order.id, order.amount, order.currency
        );

        Ok(CheckoutSession {
            key_id: self.config.payment.key_id.clone(),
            gateway_order_id: order.id,
            amount: order.amount,
            currency: order.currency,
            notes,
        })
    }

    /// Opens a gateway payment order for an amount already expressed in minor
    /// units (billing-page flow, where the order document exists first).
    #[instrument(skip(self))]
    pub async fn create_payment_order(
        &self,
        amount: i64,
        order_id: &str,
    ) -> Result<GatewayOrder, ServiceError> {
        if amount <= 0 {
            return Err(ServiceError::InvalidRequest(
                "Amount must be positive".to_string(),
            ));
        }
        if order_id.trim().is_empty() {
            return Err(ServiceError::InvalidRequest(
                "Order ID is required".to_string(),
            ));
        }

        self.gateway
            .create_order(&GatewayOrderRequest {
                amount,
                currency: self.config.payment.currency.clone(),
                receipt: order_id.to_string(),
                notes: BTreeMap::new(),
            })
            .await
    }
}

/// Converts a major-unit amount to the gateway's minor unit (×100), rounding
/// halves away from zero at the last place.
fn to_minor_units(amount: Decimal) -> Result<i64, ServiceError> {
    (amount * Decimal::from(100))
        .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
        .to_i64()
        .ok_or_else(|| ServiceError::InvalidRequest("Amount out of range".to_string()))
}

#[derive(Debug, Serialize)]
struct LineSummary {
    id: String,
    name: String,
    quantity: u32,
    price: Option<Decimal>,
}

fn line_summaries(lines: &[CheckoutLine]) -> Vec<LineSummary> {
    lines
        .iter()
        .map(|line| LineSummary {
            id: line.product.id.clone(),
            name: line.product.name.clone(),
            quantity: line.quantity,
            price: line.product.price,
        })
        .collect()
}
