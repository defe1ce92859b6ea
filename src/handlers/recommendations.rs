use crate::{
    errors::ServiceError, handlers::common::success_response, models::RecommendedProduct, AppState,
};
use axum::{
    extract::{Query, State},
    response::IntoResponse,
    routing::get,
    Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Creates the router for recommendation endpoints
pub fn routes() -> Router<Arc<AppState>> {
    Router::new().route("/", get(get_recommendations))
}

#[derive(Debug, Deserialize)]
pub struct RecommendationsQuery {
    pub user_id: Option<String>,
    /// Currently viewed item; its categories receive a relevance boost.
    pub product_id: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct RecommendationsResponse {
    pub recommendations: Vec<RecommendedProduct>,
}

/// Get up to six catalog items ranked for the user
async fn get_recommendations(
    State(state): State<Arc<AppState>>,
    Query(query): Query<RecommendationsQuery>,
) -> Result<impl IntoResponse, ServiceError> {
    let user_id = query
        .user_id
        .as_deref()
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .ok_or_else(|| ServiceError::InvalidRequest("User ID is required".to_string()))?;

    let recommendations = state
        .recommendations
        .recommend(user_id, query.product_id.as_deref())
        .await?;

    Ok(success_response(RecommendationsResponse {
        recommendations,
    }))
}
