//! Client for the generative-text API behind the support chatbot.

use crate::{config::AssistantConfig, errors::ServiceError};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::instrument;

/// Generative-text seam: one prompt in, one reply out. Conversation state is
/// assembled by the chat service, not the transport.
#[async_trait]
pub trait SupportAssistant: Send + Sync {
    async fn generate_reply(&self, prompt: &str) -> Result<String, ServiceError>;
}

/// HTTP implementation of [`SupportAssistant`] against a
/// `generateContent`-shaped API.
#[derive(Clone)]
pub struct HttpAssistant {
    client: reqwest::Client,
    base_url: String,
    model: String,
    api_key: Option<String>,
}

impl HttpAssistant {
    pub fn new(config: &AssistantConfig) -> Result<Self, ServiceError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| ServiceError::Internal(format!("failed to build http client: {}", e)))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            api_key: config.api_key.clone(),
        })
    }
}

#[async_trait]
impl SupportAssistant for HttpAssistant {
    #[instrument(skip(self, prompt))]
    async fn generate_reply(&self, prompt: &str) -> Result<String, ServiceError> {
        let url = format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url, self.model
        );

        let mut request = self.client.post(url).json(&GenerateRequest::from(prompt));
        if let Some(key) = &self.api_key {
            request = request.query(&[("key", key)]);
        }

        let response = request.send().await?;
        if !response.status().is_success() {
            let status = response.status();
            return Err(ServiceError::Retrieval(format!(
                "assistant returned status {}",
                status
            )));
        }

        let body: GenerateResponse = response.json().await?;
        body.first_text().ok_or_else(|| {
            ServiceError::Retrieval("assistant response contained no text".to_string())
        })
    }
}

#[derive(Debug, Serialize)]
struct GenerateRequest {
    contents: Vec<Content>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Content {
    parts: Vec<Part>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Part {
    text: String,
}

impl From<&str> for GenerateRequest {
    fn from(prompt: &str) -> Self {
        Self {
            contents: vec![Content {
                parts: vec![Part {
                    text: prompt.to_string(),
                }],
            }],
        }
    }
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Content,
}

impl GenerateResponse {
    fn first_text(self) -> Option<String> {
        self.candidates
            .into_iter()
            .next()?
            .content
            .parts
            .into_iter()
            .next()
            .map(|part| part.text)
    }
}
