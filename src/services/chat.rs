//! Support chatbot: storefront prompt assembly over the assistant client.

use crate::{clients::SupportAssistant, errors::ServiceError};
use serde::{Deserialize, Serialize};
use std::fmt::Write as _;
use std::sync::Arc;
use tracing::instrument;

const SYSTEM_PROMPT: &str = "You are a helpful support assistant for an online clothing store. \
Answer questions about products, orders, shipping, and payments. Keep replies short and \
friendly, and ask for an order number when the customer reports a problem with an order.";

/// One prior turn of the conversation, supplied by the client.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatTurn {
    pub role: ChatRole,
    pub text: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    Customer,
    Assistant,
}

#[derive(Clone)]
pub struct ChatService {
    assistant: Arc<dyn SupportAssistant>,
}

impl ChatService {
    pub fn new(assistant: Arc<dyn SupportAssistant>) -> Self {
        Self { assistant }
    }

    /// Produces a reply to `message`, threading prior turns into the prompt.
    #[instrument(skip(self, message, history))]
    pub async fn reply(
        &self,
        message: &str,
        history: &[ChatTurn],
    ) -> Result<String, ServiceError> {
        if message.trim().is_empty() {
            return Err(ServiceError::InvalidRequest(
                "Message is required".to_string(),
            ));
        }

        let prompt = build_prompt(message, history);
        self.assistant.generate_reply(&prompt).await
    }
}

fn build_prompt(message: &str, history: &[ChatTurn]) -> String {
    let mut prompt = String::from(SYSTEM_PROMPT);
    prompt.push_str("\n\n");
    for turn in history {
        let speaker = match turn.role {
            ChatRole::Customer => "Customer",
            ChatRole::Assistant => "Assistant",
        };
        let _ = writeln!(prompt, "{}: {}", speaker, turn.text);
    }
    let _ = writeln!(prompt, "Customer: {}", message);
    prompt.push_str("Assistant:");
    prompt
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prompt_threads_history_in_order() {
        let history = vec![
            ChatTurn {
                role: ChatRole::Customer,
                text: "Do you ship to Pune?".into(),
            },
            ChatTurn {
                role: ChatRole::Assistant,
                text: "Yes, we do!".into(),
            },
        ];
        let prompt = build_prompt("How long does it take?", &history);

        let customer_pos = prompt.find("Customer: Do you ship to Pune?").unwrap();
        let assistant_pos = prompt.find("Assistant: Yes, we do!").unwrap();
        let latest_pos = prompt.find("Customer: How long does it take?").unwrap();
        assert!(customer_pos < assistant_pos);
        assert!(assistant_pos < latest_pos);
        assert!(prompt.ends_with("Assistant:"));
    }
}
