use crate::handlers::common::success_response;
use axum::{response::IntoResponse, routing::get, Router};
use std::sync::Arc;

use crate::AppState;

/// Creates the router for health endpoints
pub fn routes() -> Router<Arc<AppState>> {
    Router::new().route("/health", get(health_check))
}

/// Liveness probe; external collaborators are not pinged here
async fn health_check() -> impl IntoResponse {
    success_response(serde_json::json!({
        "status": "ok",
        "service": "storefront-api",
        "version": env!("CARGO_PKG_VERSION"),
        "timestamp": chrono::Utc::now().to_rfc3339(),
    }))
}
