#![allow(dead_code)]

use async_trait::async_trait;
use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    Router,
};
use chrono::Utc;
use rust_decimal_macros::dec;
use serde_json::Value;
use std::sync::{
    atomic::{AtomicBool, AtomicU64, Ordering},
    Arc, Mutex, RwLock,
};
use storefront_api::{
    clients::{ContentStore, GatewayOrder, GatewayOrderRequest, PaymentGateway, SupportAssistant},
    config::{AppConfig, AssistantConfig, ContentStoreConfig, PaymentConfig},
    errors::ServiceError,
    models::{
        Category, NewOrderDocument, Order, OrderPatch, Product, PurchaseLine,
    },
    AppState,
};
use tower::ServiceExt;

pub const WEBHOOK_SECRET: &str = "test_webhook_secret";

/// In-memory stand-in for the headless content store.
#[derive(Default)]
pub struct InMemoryContentStore {
    pub products: RwLock<Vec<Product>>,
    pub orders: RwLock<Vec<Order>>,
    next_id: AtomicU64,
    fail_reads: AtomicBool,
}

impl InMemoryContentStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn seed_products(&self, products: Vec<Product>) {
        *self.products.write().unwrap() = products;
    }

    pub fn seed_order(&self, order: Order) {
        self.orders.write().unwrap().push(order);
    }

    /// Make every read fail, to exercise RetrievalError paths.
    pub fn fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::SeqCst);
    }

    pub fn order(&self, order_id: &str) -> Option<Order> {
        self.orders
            .read()
            .unwrap()
            .iter()
            .find(|order| order.id == order_id)
            .cloned()
    }

    fn check_reads(&self) -> Result<(), ServiceError> {
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(ServiceError::Retrieval("store unreachable".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl ContentStore for InMemoryContentStore {
    async fn fetch_products(&self) -> Result<Vec<Product>, ServiceError> {
        self.check_reads()?;
        Ok(self.products.read().unwrap().clone())
    }

    async fn fetch_orders_for_user(&self, user_id: &str) -> Result<Vec<Order>, ServiceError> {
        self.check_reads()?;
        Ok(self
            .orders
            .read()
            .unwrap()
            .iter()
            .filter(|order| order.user_id == user_id)
            .cloned()
            .collect())
    }

    async fn fetch_item_categories(
        &self,
        product_id: &str,
    ) -> Result<Option<Vec<Category>>, ServiceError> {
        self.check_reads()?;
        Ok(self
            .products
            .read()
            .unwrap()
            .iter()
            .find(|product| product.id == product_id)
            .map(|product| product.categories.clone()))
    }

    async fn create_order(&self, order: &NewOrderDocument) -> Result<String, ServiceError> {
        let id = format!("doc-{}", self.next_id.fetch_add(1, Ordering::SeqCst) + 1);
        let products = self.products.read().unwrap();
        let lines = order
            .lines
            .iter()
            .filter_map(|line| {
                products
                    .iter()
                    .find(|product| product.id == line.product_id)
                    .map(|product| PurchaseLine {
                        product: product.clone(),
                        quantity: line.quantity,
                    })
            })
            .collect();
        drop(products);

        self.orders.write().unwrap().push(Order {
            id: id.clone(),
            order_number: order.order_number.clone(),
            status: order.status,
            total_price: order.total_price,
            currency: order.currency.clone(),
            payment_method: order.payment_method,
            payment_id: order.payment_id.clone(),
            gateway_order_id: order.gateway_order_id.clone(),
            user_id: order.user_id.clone(),
            customer_name: order.customer_name.clone(),
            email: order.email.clone(),
            order_date: order.order_date,
            lines,
        });
        Ok(id)
    }

    async fn patch_order(&self, order_id: &str, patch: &OrderPatch) -> Result<(), ServiceError> {
        let mut orders = self.orders.write().unwrap();
        let order = orders
            .iter_mut()
            .find(|order| order.id == order_id)
            .ok_or_else(|| ServiceError::NotFound(format!("Order {} not found", order_id)))?;
        if let Some(status) = patch.status {
            order.status = status;
        }
        if let Some(payment_id) = &patch.payment_id {
            order.payment_id = payment_id.clone();
        }
        Ok(())
    }

    async fn find_order_by_gateway_id(
        &self,
        gateway_order_id: &str,
    ) -> Result<Option<Order>, ServiceError> {
        self.check_reads()?;
        Ok(self
            .orders
            .read()
            .unwrap()
            .iter()
            .find(|order| order.gateway_order_id.as_deref() == Some(gateway_order_id))
            .cloned())
    }
}

/// Fake payment gateway recording every order it is asked to open.
#[derive(Default)]
pub struct FakeGateway {
    pub requests: Mutex<Vec<GatewayOrderRequest>>,
    next_id: AtomicU64,
    fail: AtomicBool,
}

impl FakeGateway {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_next(&self, fail: bool) {
        self.fail.store(fail, Ordering::SeqCst);
    }

    pub fn last_request(&self) -> Option<GatewayOrderRequest> {
        self.requests.lock().unwrap().last().cloned()
    }
}

#[async_trait]
impl PaymentGateway for FakeGateway {
    async fn create_order(
        &self,
        request: &GatewayOrderRequest,
    ) -> Result<GatewayOrder, ServiceError> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(ServiceError::PaymentFailed("gateway down".to_string()));
        }
        self.requests.lock().unwrap().push(request.clone());
        Ok(GatewayOrder {
            id: format!("gw_order_{}", self.next_id.fetch_add(1, Ordering::SeqCst) + 1),
            amount: request.amount,
            currency: request.currency.clone(),
        })
    }
}

/// Fake assistant with a canned reply.
pub struct FakeAssistant {
    pub reply: String,
    fail: AtomicBool,
}

impl FakeAssistant {
    pub fn new(reply: &str) -> Self {
        Self {
            reply: reply.to_string(),
            fail: AtomicBool::new(false),
        }
    }

    pub fn fail_next(&self, fail: bool) {
        self.fail.store(fail, Ordering::SeqCst);
    }
}

#[async_trait]
impl SupportAssistant for FakeAssistant {
    async fn generate_reply(&self, _prompt: &str) -> Result<String, ServiceError> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(ServiceError::Retrieval("assistant unavailable".to_string()));
        }
        Ok(self.reply.clone())
    }
}

/// Application harness wired to in-memory fakes.
pub struct TestApp {
    pub router: Router,
    pub store: Arc<InMemoryContentStore>,
    pub gateway: Arc<FakeGateway>,
    pub assistant: Arc<FakeAssistant>,
}

impl TestApp {
    pub fn new() -> Self {
        let cfg = AppConfig::new(
            ContentStoreConfig {
                base_url: "http://store.local".into(),
                api_token: None,
                request_timeout_secs: 5,
            },
            PaymentConfig {
                base_url: "http://gateway.local".into(),
                key_id: "rzp_test_key".into(),
                key_secret: "secret".into(),
                webhook_secret: Some(WEBHOOK_SECRET.into()),
                currency: "INR".into(),
            },
            AssistantConfig {
                base_url: "http://assistant.local".into(),
                api_key: None,
                model: "gemini-pro".into(),
            },
        );

        let store = Arc::new(InMemoryContentStore::new());
        let gateway = Arc::new(FakeGateway::new());
        let assistant = Arc::new(FakeAssistant::new("Happy to help!"));

        let state = Arc::new(AppState::new(
            Arc::new(cfg),
            store.clone(),
            gateway.clone(),
            assistant.clone(),
        ));

        Self {
            router: storefront_api::app_router(state),
            store,
            gateway,
            assistant,
        }
    }

    pub async fn get(&self, uri: &str) -> (StatusCode, Value) {
        let request = Request::builder()
            .method(Method::GET)
            .uri(uri)
            .body(Body::empty())
            .unwrap();
        self.send(request).await
    }

    pub async fn post_json(&self, uri: &str, body: Value) -> (StatusCode, Value) {
        self.send_json(Method::POST, uri, body).await
    }

    pub async fn patch_json(&self, uri: &str, body: Value) -> (StatusCode, Value) {
        self.send_json(Method::PATCH, uri, body).await
    }

    pub async fn post_raw(
        &self,
        uri: &str,
        body: Vec<u8>,
        headers: &[(&str, &str)],
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(Method::POST).uri(uri);
        for (name, value) in headers {
            builder = builder.header(*name, *value);
        }
        let request = builder.body(Body::from(body)).unwrap();
        self.send(request).await
    }

    async fn send_json(&self, method: Method, uri: &str, body: Value) -> (StatusCode, Value) {
        let request = Request::builder()
            .method(method)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();
        self.send(request).await
    }

    async fn send(&self, request: Request<Body>) -> (StatusCode, Value) {
        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("request failed");
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("failed to read body");
        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::String(
                String::from_utf8_lossy(&bytes).into_owned(),
            ))
        };
        (status, json)
    }
}

// Builders shared across test binaries.

pub fn category(id: &str, name: &str) -> Category {
    Category {
        id: id.into(),
        name: name.into(),
    }
}

pub fn product(id: &str, categories: Vec<Category>) -> Product {
    Product {
        id: id.into(),
        name: format!("Product {}", id),
        price: Some(dec!(499)),
        categories,
        description: Some("A fine garment".into()),
        image_url: Some(format!("http://cdn.local/{}.png", id)),
    }
}

pub fn paid_order(id: &str, user_id: &str, lines: Vec<(Product, i64)>) -> Order {
    Order {
        id: id.into(),
        order_number: format!("ORD-{}", id),
        status: storefront_api::models::OrderStatus::Paid,
        total_price: dec!(999),
        currency: "INR".into(),
        payment_method: storefront_api::models::PaymentMethod::Razorpay,
        payment_id: "pay_1".into(),
        gateway_order_id: None,
        user_id: user_id.into(),
        customer_name: "Asha".into(),
        email: "asha@example.com".into(),
        order_date: Utc::now(),
        lines: lines
            .into_iter()
            .map(|(product, quantity)| PurchaseLine { product, quantity })
            .collect(),
    }
}

/// Hex HMAC-SHA256 signature over the payload, as the gateway would send it.
pub fn webhook_signature(payload: &[u8], secret: &str) -> String {
    use hmac::{Hmac, Mac};
    type HmacSha256 = Hmac<sha2::Sha256>;
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes()).unwrap();
    mac.update(payload);
    hex::encode(mac.finalize().into_bytes())
}
