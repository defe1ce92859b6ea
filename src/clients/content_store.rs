//! Client for the headless content store that owns catalog and order data.

use crate::{
    config::ContentStoreConfig,
    errors::ServiceError,
    models::{Category, NewOrderDocument, Order, OrderPatch, Product, PurchaseLine},
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::StatusCode;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, instrument};
use uuid::Uuid;

/// Read/write access to the content store.
///
/// Reads power the storefront and the recommendation scorer; writes are
/// limited to order documents. The store itself owns retries, caching, and
/// consistency — callers see one attempt per operation.
#[async_trait]
pub trait ContentStore: Send + Sync {
    /// Fetch every catalog item with its category references resolved.
    async fn fetch_products(&self) -> Result<Vec<Product>, ServiceError>;

    /// Fetch a user's historical orders with purchased products resolved.
    async fn fetch_orders_for_user(&self, user_id: &str) -> Result<Vec<Order>, ServiceError>;

    /// Fetch the category set of a single item. `None` when the item does not
    /// resolve; callers treat that as "no boost", not an error.
    async fn fetch_item_categories(
        &self,
        product_id: &str,
    ) -> Result<Option<Vec<Category>>, ServiceError>;

    /// Create an order document, returning the store-assigned document id.
    async fn create_order(&self, order: &NewOrderDocument) -> Result<String, ServiceError>;

    /// Apply a partial update to an order document.
    async fn patch_order(&self, order_id: &str, patch: &OrderPatch) -> Result<(), ServiceError>;

    /// Look up an order by the payment-gateway order id stamped on it.
    async fn find_order_by_gateway_id(
        &self,
        gateway_order_id: &str,
    ) -> Result<Option<Order>, ServiceError>;
}

/// HTTP implementation of [`ContentStore`].
#[derive(Clone)]
pub struct HttpContentStore {
    client: reqwest::Client,
    base_url: String,
}

impl HttpContentStore {
    pub fn new(config: &ContentStoreConfig) -> Result<Self, ServiceError> {
        let mut headers = reqwest::header::HeaderMap::new();
        if let Some(token) = &config.api_token {
            let value = format!("Bearer {}", token)
                .parse()
                .map_err(|_| ServiceError::Internal("invalid content store token".to_string()))?;
            headers.insert(reqwest::header::AUTHORIZATION, value);
        }

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .default_headers(headers)
            .build()
            .map_err(|e| ServiceError::Internal(format!("failed to build http client: {}", e)))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Resolves a store asset reference like `image-abc123-800x600-png` to a
    /// CDN URL. Unparseable references resolve to `None` rather than failing
    /// the whole read.
    fn resolve_image_url(&self, asset_ref: &str) -> Option<String> {
        let body = asset_ref.strip_prefix("image-")?;
        let (name, extension) = body.rsplit_once('-')?;
        Some(format!("{}/assets/{}.{}", self.base_url, name, extension))
    }

    fn product_from_doc(&self, doc: ProductDoc) -> Product {
        let image_url = doc
            .image
            .and_then(|image| self.resolve_image_url(&image.asset.reference));
        Product {
            id: doc.id,
            name: doc.name,
            price: doc.price,
            categories: doc
                .categories
                .unwrap_or_default()
                .into_iter()
                .map(Category::from)
                .collect(),
            description: doc.description,
            image_url,
        }
    }

    fn order_from_doc(&self, doc: OrderDoc) -> Order {
        // Dangling product references are dropped, matching what the
        // storefront rendered before this service existed.
        let lines = doc
            .products
            .unwrap_or_default()
            .into_iter()
            .filter_map(|line| {
                line.product.map(|product| PurchaseLine {
                    product: self.product_from_doc(product),
                    quantity: line.quantity,
                })
            })
            .collect();

        Order {
            id: doc.id,
            order_number: doc.order_number,
            status: doc.status,
            total_price: doc.total_price,
            currency: doc.currency,
            payment_method: doc.payment_method,
            payment_id: doc.payment_id,
            gateway_order_id: doc.gateway_order_id,
            user_id: doc.user_id,
            customer_name: doc.customer_name,
            email: doc.email,
            order_date: doc.order_date,
            lines,
        }
    }

    async fn read_error(response: reqwest::Response, context: &str) -> ServiceError {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        ServiceError::Retrieval(format!("{}: status {} ({})", context, status, body))
    }
}

#[async_trait]
impl ContentStore for HttpContentStore {
    #[instrument(skip(self))]
    async fn fetch_products(&self) -> Result<Vec<Product>, ServiceError> {
        let response = self.client.get(self.url("/products")).send().await?;
        if !response.status().is_success() {
            return Err(Self::read_error(response, "fetching products").await);
        }
        let docs: Vec<ProductDoc> = response.json().await?;
        debug!("Fetched {} catalog items", docs.len());
        Ok(docs.into_iter().map(|d| self.product_from_doc(d)).collect())
    }

    #[instrument(skip(self))]
    async fn fetch_orders_for_user(&self, user_id: &str) -> Result<Vec<Order>, ServiceError> {
        let response = self
            .client
            .get(self.url("/orders"))
            .query(&[("userId", user_id)])
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(Self::read_error(response, "fetching order history").await);
        }
        let docs: Vec<OrderDoc> = response.json().await?;
        Ok(docs.into_iter().map(|d| self.order_from_doc(d)).collect())
    }

    #[instrument(skip(self))]
    async fn fetch_item_categories(
        &self,
        product_id: &str,
    ) -> Result<Option<Vec<Category>>, ServiceError> {
        let response = self
            .client
            .get(self.url(&format!("/products/{}/categories", product_id)))
            .send()
            .await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !response.status().is_success() {
            return Err(Self::read_error(response, "fetching item categories").await);
        }
        let body: CategoriesDoc = response.json().await?;
        Ok(Some(
            body.categories.into_iter().map(Category::from).collect(),
        ))
    }

    #[instrument(skip(self, order))]
    async fn create_order(&self, order: &NewOrderDocument) -> Result<String, ServiceError> {
        let doc = NewOrderDoc::from(order);
        let response = self
            .client
            .post(self.url("/orders"))
            .json(&doc)
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(Self::read_error(response, "creating order").await);
        }
        let created: CreatedDoc = response.json().await?;
        debug!(order_number = %order.order_number, "Created order document {}", created.id);
        Ok(created.id)
    }

    #[instrument(skip(self, patch))]
    async fn patch_order(&self, order_id: &str, patch: &OrderPatch) -> Result<(), ServiceError> {
        let response = self
            .client
            .patch(self.url(&format!("/orders/{}", order_id)))
            .json(&OrderPatchDoc::from(patch))
            .send()
            .await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Err(ServiceError::NotFound(format!(
                "Order {} not found",
                order_id
            )));
        }
        if !response.status().is_success() {
            return Err(Self::read_error(response, "patching order").await);
        }
        Ok(())
    }

    #[instrument(skip(self))]
    async fn find_order_by_gateway_id(
        &self,
        gateway_order_id: &str,
    ) -> Result<Option<Order>, ServiceError> {
        let response = self
            .client
            .get(self.url(&format!("/orders/by-gateway/{}", gateway_order_id)))
            .send()
            .await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !response.status().is_success() {
            return Err(Self::read_error(response, "looking up order by gateway id").await);
        }
        let doc: OrderDoc = response.json().await?;
        Ok(Some(self.order_from_doc(doc)))
    }
}

// Wire representations of store documents.

#[derive(Debug, Deserialize)]
struct ProductDoc {
    #[serde(rename = "_id")]
    id: String,
    name: String,
    #[serde(default)]
    price: Option<Decimal>,
    #[serde(default)]
    categories: Option<Vec<CategoryDoc>>,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    image: Option<ImageDoc>,
}

#[derive(Debug, Deserialize)]
struct CategoryDoc {
    #[serde(rename = "_id")]
    id: String,
    name: String,
}

impl From<CategoryDoc> for Category {
    fn from(doc: CategoryDoc) -> Self {
        Category {
            id: doc.id,
            name: doc.name,
        }
    }
}

#[derive(Debug, Deserialize)]
struct ImageDoc {
    asset: AssetRef,
}

#[derive(Debug, Deserialize)]
struct AssetRef {
    #[serde(rename = "_ref")]
    reference: String,
}

#[derive(Debug, Deserialize)]
struct CategoriesDoc {
    #[serde(default)]
    categories: Vec<CategoryDoc>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct OrderDoc {
    #[serde(rename = "_id")]
    id: String,
    order_number: String,
    status: crate::models::OrderStatus,
    total_price: Decimal,
    currency: String,
    payment_method: crate::models::PaymentMethod,
    payment_id: String,
    #[serde(default)]
    gateway_order_id: Option<String>,
    user_id: String,
    customer_name: String,
    email: String,
    order_date: DateTime<Utc>,
    #[serde(default)]
    products: Option<Vec<OrderLineDoc>>,
}

#[derive(Debug, Deserialize)]
struct OrderLineDoc {
    #[serde(default)]
    product: Option<ProductDoc>,
    quantity: i64,
}

#[derive(Debug, Deserialize)]
struct CreatedDoc {
    #[serde(rename = "_id")]
    id: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct NewOrderDoc {
    order_number: String,
    order_date: DateTime<Utc>,
    status: crate::models::OrderStatus,
    total_price: Decimal,
    currency: String,
    payment_method: crate::models::PaymentMethod,
    payment_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    gateway_order_id: Option<String>,
    user_id: String,
    customer_name: String,
    email: String,
    billing_address: BillingAddressDoc,
    products: Vec<NewOrderLineDoc>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct BillingAddressDoc {
    full_name: String,
    address_line1: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    address_line2: Option<String>,
    city: String,
    state: String,
    postal_code: u32,
    phone: u64,
}

#[derive(Debug, Serialize)]
struct NewOrderLineDoc {
    #[serde(rename = "_key")]
    key: String,
    product: ProductRef,
    quantity: i64,
}

#[derive(Debug, Serialize)]
struct ProductRef {
    #[serde(rename = "_ref")]
    reference: String,
}

impl From<&NewOrderDocument> for NewOrderDoc {
    fn from(order: &NewOrderDocument) -> Self {
        let products = order
            .lines
            .iter()
            .map(|line| NewOrderLineDoc {
                key: format!("{}-{}", line.product_id, Uuid::new_v4().simple()),
                product: ProductRef {
                    reference: line.product_id.clone(),
                },
                quantity: line.quantity,
            })
            .collect();

        Self {
            order_number: order.order_number.clone(),
            order_date: order.order_date,
            status: order.status,
            total_price: order.total_price,
            currency: order.currency.clone(),
            payment_method: order.payment_method,
            payment_id: order.payment_id.clone(),
            gateway_order_id: order.gateway_order_id.clone(),
            user_id: order.user_id.clone(),
            customer_name: order.customer_name.clone(),
            email: order.email.clone(),
            billing_address: BillingAddressDoc {
                full_name: order.billing_address.full_name.clone(),
                address_line1: order.billing_address.address_line1.clone(),
                address_line2: order.billing_address.address_line2.clone(),
                city: order.billing_address.city.clone(),
                state: order.billing_address.state.clone(),
                postal_code: order.billing_address.postal_code,
                phone: order.billing_address.phone,
            },
            products,
        }
    }
}

impl From<&OrderPatch> for OrderPatchDoc {
    fn from(patch: &OrderPatch) -> Self {
        Self {
            status: patch.status,
            payment_id: patch.payment_id.clone(),
            updated_at: patch.updated_at,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct OrderPatchDoc {
    #[serde(skip_serializing_if = "Option::is_none")]
    status: Option<crate::models::OrderStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    payment_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    updated_at: Option<DateTime<Utc>>,
}
