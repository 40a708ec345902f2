//! Amazon Bedrock backend using the Anthropic Messages request format.
//!
//! Requests go through `InvokeModel` with the model's native JSON body rather
//! than the Converse abstraction, so the system prompt, message list and token
//! budget are passed exactly as the model expects them.

use async_trait::async_trait;
use aws_sdk_bedrockruntime::Client as BedrockClient;
use aws_sdk_bedrockruntime::primitives::Blob;
use serde_json::{Value, json};
use tracing::{debug, info};

use super::llm::{ChatModel, CompletionRequest, truncate_at_stop};
use crate::core::models::Role;
use crate::errors::HandlerError;

const ANTHROPIC_VERSION: &str = "bedrock-2023-05-31";

pub struct BedrockChatModel {
    client: BedrockClient,
    model_id: String,
}

impl BedrockChatModel {
    #[must_use]
    pub fn new(client: BedrockClient, model_id: impl Into<String>) -> Self {
        Self {
            client,
            model_id: model_id.into(),
        }
    }
}

#[async_trait]
impl ChatModel for BedrockChatModel {
    async fn complete(&self, request: &CompletionRequest) -> Result<String, HandlerError> {
        #[cfg(feature = "debug-logs")]
        info!("Using Bedrock prompt:\n{:?}", request);

        #[cfg(not(feature = "debug-logs"))]
        info!(
            model = %self.model_id,
            messages = request.messages.len(),
            estimated_input_tokens = request.estimated_input_tokens(),
            "Invoking Bedrock model"
        );

        let body = build_messages_body(request);
        let bytes = serde_json::to_vec(&body)
            .map_err(|e| HandlerError::Llm(format!("Failed to encode Bedrock request: {e}")))?;

        let response = self
            .client
            .invoke_model()
            .model_id(&self.model_id)
            .content_type("application/json")
            .accept("application/json")
            .body(Blob::new(bytes))
            .send()
            .await
            .map_err(|e| {
                HandlerError::Llm(format!(
                    "Bedrock invoke_model failed: {}",
                    aws_sdk_bedrockruntime::error::DisplayErrorContext(&e)
                ))
            })?;

        let response_json: Value = serde_json::from_slice(response.body().as_ref())
            .map_err(|e| HandlerError::Llm(format!("Failed to parse Bedrock response: {e}")))?;

        let reason = stop_reason(&response_json);
        debug!(stop_reason = reason, "Bedrock response received");

        let text = extract_text(&response_json)
            .ok_or_else(|| HandlerError::Llm("No text in Bedrock response".to_string()))?;
        Ok(truncate_at_stop(&text, &request.stop_sequences).to_string())
    }
}

pub(crate) fn build_messages_body(request: &CompletionRequest) -> Value {
    let messages: Vec<Value> = request
        .messages
        .iter()
        .map(|m| {
            let role = match m.role {
                Role::User => "user",
                Role::Assistant => "assistant",
            };
            json!({ "role": role, "content": m.content })
        })
        .collect();

    let mut body = json!({
        "anthropic_version": ANTHROPIC_VERSION,
        "max_tokens": request.max_tokens,
        "messages": messages,
    });

    if let Some(system) = &request.system {
        body["system"] = json!(system);
    }
    if let Some(temperature) = request.temperature {
        body["temperature"] = json!(temperature);
    }
    if !request.stop_sequences.is_empty() {
        body["stop_sequences"] = json!(request.stop_sequences);
    }

    body
}

/// `end_turn`, `max_tokens` or `stop_sequence`.
pub(crate) fn stop_reason(response: &Value) -> Option<&str> {
    response.get("stop_reason").and_then(Value::as_str)
}

pub(crate) fn extract_text(response: &Value) -> Option<String> {
    let parts: Vec<&str> = response
        .get("content")?
        .as_array()?
        .iter()
        .filter(|block| block.get("type").and_then(Value::as_str) == Some("text"))
        .filter_map(|block| block.get("text").and_then(Value::as_str))
        .collect();

    if parts.is_empty() {
        None
    } else {
        Some(parts.concat())
    }
}
