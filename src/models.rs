//! Typed records for the entities exchanged with the content store.
//!
//! The content store itself is schemaless from our point of view; everything
//! crossing that boundary is deserialized into these records and validated
//! before any business logic runs.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use validator::Validate;

/// A merchandising tag grouping catalog items.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: String,
    pub name: String,
}

/// A purchasable catalog item as stored in the content store.
///
/// Prices are optional at the source: drafts may be published without one,
/// and checkout rejects such items rather than guessing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Product {
    pub id: String,
    pub name: String,
    pub price: Option<Decimal>,
    #[serde(default)]
    pub categories: Vec<Category>,
    #[serde(default)]
    pub description: Option<String>,
    /// Resolved CDN URL of the primary image, if any.
    #[serde(default)]
    pub image_url: Option<String>,
}

/// Payment flows supported by the storefront.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, strum::Display, strum::EnumString)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum PaymentMethod {
    /// Card payment through the gateway
    Razorpay,
    /// Manual payment agreed over chat
    Whatsapp,
}

/// Lifecycle states of an order document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, strum::Display, strum::EnumString)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum OrderStatus {
    Pending,
    Processing,
    Paid,
    Shipped,
    Delivered,
    Cancelled,
}

/// Billing address collected at checkout, validated at the boundary.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct BillingAddress {
    #[validate(length(min = 1))]
    pub full_name: String,
    #[validate(length(min = 1))]
    pub address_line1: String,
    #[serde(default)]
    pub address_line2: Option<String>,
    #[validate(length(min = 1))]
    pub city: String,
    #[validate(length(min = 1))]
    pub state: String,
    pub postal_code: u32,
    pub phone: u64,
}

/// A purchased line within a historical order, with the product resolved.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PurchaseLine {
    pub product: Product,
    pub quantity: i64,
}

/// An order document as read back from the content store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
    pub id: String,
    pub order_number: String,
    pub status: OrderStatus,
    pub total_price: Decimal,
    pub currency: String,
    pub payment_method: PaymentMethod,
    pub payment_id: String,
    #[serde(default)]
    pub gateway_order_id: Option<String>,
    pub user_id: String,
    pub customer_name: String,
    pub email: String,
    pub order_date: DateTime<Utc>,
    #[serde(default)]
    pub lines: Vec<PurchaseLine>,
}

/// A new order document to be created in the content store.
///
/// Lines carry product references only; the store resolves them on read.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewOrderDocument {
    pub order_number: String,
    pub status: OrderStatus,
    pub total_price: Decimal,
    pub currency: String,
    pub payment_method: PaymentMethod,
    pub payment_id: String,
    #[serde(default)]
    pub gateway_order_id: Option<String>,
    pub user_id: String,
    pub customer_name: String,
    pub email: String,
    pub billing_address: BillingAddress,
    pub order_date: DateTime<Utc>,
    pub lines: Vec<NewOrderLine>,
}

/// Product reference plus quantity within a new order document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewOrderLine {
    pub product_id: String,
    pub quantity: i64,
}

/// Fields the webhook and status endpoints may patch on an order document.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OrderPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<OrderStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payment_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

/// Display projection of a catalog item returned by the recommendation
/// endpoint. The transient score never leaves the scorer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecommendedProduct {
    pub id: String,
    pub name: String,
    pub price: Option<Decimal>,
    pub categories: Vec<Category>,
    pub image_url: Option<String>,
    pub description: Option<String>,
}

impl From<Product> for RecommendedProduct {
    fn from(product: Product) -> Self {
        Self {
            id: product.id,
            name: product.name,
            price: product.price,
            categories: product.categories,
            image_url: product.image_url,
            description: product.description,
        }
    }
}
