//! Order lifecycle: creation in the content store, status transitions, and
//! per-user history reads.

use crate::{
    clients::ContentStore,
    errors::ServiceError,
    models::{
        BillingAddress, NewOrderDocument, NewOrderLine, Order, OrderPatch, OrderStatus,
        PaymentMethod,
    },
};
use chrono::Utc;
use rust_decimal::Decimal;
use std::str::FromStr;
use std::sync::Arc;
use tracing::{info, instrument};
use validator::Validate;

const ORDER_CURRENCY: &str = "INR";

/// Input for creating an order document.
#[derive(Debug, Clone)]
pub struct CreateOrderInput {
    pub order_number: String,
    pub lines: Vec<NewOrderLine>,
    pub total: Decimal,
    pub payment_id: String,
    pub payment_method: PaymentMethod,
    pub gateway_order_id: Option<String>,
    pub user_id: String,
    pub user_email: String,
    pub billing_address: BillingAddress,
}

#[derive(Clone)]
pub struct OrderService {
    store: Arc<dyn ContentStore>,
}

impl OrderService {
    pub fn new(store: Arc<dyn ContentStore>) -> Self {
        Self { store }
    }

    /// Creates a `pending` order document and returns its store id.
    ///
    /// The billing address is validated here, at the boundary between the
    /// request and the store; a malformed address never reaches persistence.
    #[instrument(skip(self, input), fields(order_number = %input.order_number))]
    pub async fn create_order(&self, input: CreateOrderInput) -> Result<String, ServiceError> {
        if input.order_number.trim().is_empty() {
            return Err(ServiceError::InvalidRequest(
                "Order number is required".to_string(),
            ));
        }
        if input.user_id.trim().is_empty() {
            return Err(ServiceError::InvalidRequest(
                "User ID is required".to_string(),
            ));
        }
        if input.lines.is_empty() {
            return Err(ServiceError::InvalidRequest(
                "Order must contain at least one item".to_string(),
            ));
        }
        if input.lines.iter().any(|line| line.quantity < 1) {
            return Err(ServiceError::InvalidRequest(
                "Item quantities must be at least 1".to_string(),
            ));
        }
        input
            .billing_address
            .validate()
            .map_err(|_| ServiceError::InvalidRequest("Invalid billing address".to_string()))?;

        let document = NewOrderDocument {
            order_number: input.order_number.clone(),
            status: OrderStatus::Pending,
            total_price: input.total,
            currency: ORDER_CURRENCY.to_string(),
            payment_method: input.payment_method,
            payment_id: input.payment_id,
            gateway_order_id: input.gateway_order_id,
            user_id: input.user_id,
            customer_name: input.billing_address.full_name.clone(),
            email: input.user_email,
            billing_address: input.billing_address,
            order_date: Utc::now(),
            lines: input.lines,
        };

        let order_id = self.store.create_order(&document).await?;
        info!(order_number = %input.order_number, "Created order {}", order_id);
        Ok(order_id)
    }

    /// Applies a status transition requested over the API. The status arrives
    /// as a string and must parse to a known [`OrderStatus`].
    #[instrument(skip(self))]
    pub async fn update_status(&self, order_id: &str, status: &str) -> Result<(), ServiceError> {
        if order_id.trim().is_empty() || status.trim().is_empty() {
            return Err(ServiceError::InvalidRequest(
                "Order ID and status are required".to_string(),
            ));
        }
        let status = OrderStatus::from_str(status)
            .map_err(|_| ServiceError::InvalidRequest(format!("Invalid status: {}", status)))?;

        self.store
            .patch_order(
                order_id,
                &OrderPatch {
                    status: Some(status),
                    payment_id: None,
                    updated_at: Some(Utc::now()),
                },
            )
            .await?;

        info!("Order {} moved to {}", order_id, status);
        Ok(())
    }

    /// Fetches a user's order history, newest first by order date.
    #[instrument(skip(self))]
    pub async fn list_for_user(&self, user_id: &str) -> Result<Vec<Order>, ServiceError> {
        if user_id.trim().is_empty() {
            return Err(ServiceError::InvalidRequest(
                "User ID is required".to_string(),
            ));
        }
        let mut orders = self.store.fetch_orders_for_user(user_id).await?;
        orders.sort_by(|a, b| b.order_date.cmp(&a.order_date));
        Ok(orders)
    }

    /// Marks the order behind a captured gateway payment as paid.
    #[instrument(skip(self))]
    pub async fn handle_payment_captured(
        &self,
        gateway_order_id: &str,
        payment_id: &str,
    ) -> Result<(), ServiceError> {
        let order = self
            .store
            .find_order_by_gateway_id(gateway_order_id)
            .await?
            .ok_or_else(|| ServiceError::NotFound("Order not found".to_string()))?;

        self.store
            .patch_order(
                &order.id,
                &OrderPatch {
                    status: Some(OrderStatus::Paid),
                    payment_id: Some(payment_id.to_string()),
                    updated_at: Some(Utc::now()),
                },
            )
            .await?;

        info!(
            "Payment captured for gateway order {}; order {} marked paid",
            gateway_order_id, order.id
        );
        Ok(())
    }

    /// Cancels the order behind a failed gateway payment.
    #[instrument(skip(self))]
    pub async fn handle_payment_failed(&self, gateway_order_id: &str) -> Result<(), ServiceError> {
        let order = self
            .store
            .find_order_by_gateway_id(gateway_order_id)
            .await?
            .ok_or_else(|| ServiceError::NotFound("Order not found".to_string()))?;

        self.store
            .patch_order(
                &order.id,
                &OrderPatch {
                    status: Some(OrderStatus::Cancelled),
                    payment_id: None,
                    updated_at: Some(Utc::now()),
                },
            )
            .await?;

        info!(
            "Payment failed for gateway order {}; order {} cancelled",
            gateway_order_id, order.id
        );
        Ok(())
    }
}
