//! Storefront API Library
//!
//! Backend for an e-commerce storefront: catalog recommendations, checkout
//! and payments, order persistence in a headless content store, and a
//! support chatbot.
#![forbid(unsafe_code)]
#![deny(rust_2018_idioms)]
#![warn(clippy::all, clippy::perf, clippy::dbg_macro)]

pub mod clients;
pub mod config;
pub mod errors;
pub mod handlers;
pub mod models;
pub mod services;
pub mod session;

use axum::{routing::get, Router};
use std::sync::Arc;
use tower_http::{compression::CompressionLayer, trace::TraceLayer};

use clients::{ContentStore, PaymentGateway, SupportAssistant};
use services::{ChatService, CheckoutService, OrderService, RecommendationService};

/// Shared application state: configuration plus the services built from the
/// injected external-collaborator clients.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<config::AppConfig>,
    pub recommendations: RecommendationService,
    pub orders: OrderService,
    pub checkout: CheckoutService,
    pub chat: ChatService,
}

impl AppState {
    pub fn new(
        config: Arc<config::AppConfig>,
        content_store: Arc<dyn ContentStore>,
        payment_gateway: Arc<dyn PaymentGateway>,
        assistant: Arc<dyn SupportAssistant>,
    ) -> Self {
        Self {
            recommendations: RecommendationService::new(content_store.clone()),
            orders: OrderService::new(content_store),
            checkout: CheckoutService::new(payment_gateway, config.clone()),
            chat: ChatService::new(assistant),
            config,
        }
    }
}

/// The versioned API surface.
pub fn api_v1_routes() -> Router<Arc<AppState>> {
    Router::new()
        .nest("/recommendations", handlers::recommendations::routes())
        .nest("/orders", handlers::orders::routes())
        .nest(
            "/payments",
            handlers::payments::routes().merge(handlers::webhooks::routes()),
        )
        .nest("/checkout", handlers::checkout::routes())
        .nest("/chat", handlers::chat::routes())
        .merge(handlers::health::routes())
}

/// Builds the application router with tracing and compression applied.
/// CORS is layered on by the binary from configuration.
pub fn app_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(|| async { "storefront-api up" }))
        .nest("/api/v1", api_v1_routes())
        .layer(TraceLayer::new_for_http())
        .layer(CompressionLayer::new())
        .with_state(state)
}
