use crate::{
    errors::ServiceError, handlers::common::success_response, services::chat::ChatTurn, AppState,
};
use axum::{extract::State, response::IntoResponse, routing::post, Json, Router};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Creates the router for the support chatbot
pub fn routes() -> Router<Arc<AppState>> {
    Router::new().route("/", post(chat))
}

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    pub message: String,
    #[serde(default)]
    pub history: Vec<ChatTurn>,
}

#[derive(Debug, Serialize)]
pub struct ChatResponse {
    pub reply: String,
}

/// Generate a support reply for the customer's message
async fn chat(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<ChatRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    let reply = state.chat.reply(&payload.message, &payload.history).await?;
    Ok(success_response(ChatResponse { reply }))
}
