//! `OpenAI` Responses API backend.
//!
//! The Responses API has no stop-sequence parameter, so stops are applied to
//! the returned text instead.

use async_trait::async_trait;
use openai_api_rs::v1::chat_completion::{ChatCompletionMessage, Content, MessageRole};
use reqwest::Client;
use serde_json::{Value, json};
use tracing::info;

use super::llm::{ChatModel, CompletionRequest, truncate_at_stop};
use crate::core::models::Role;
use crate::errors::HandlerError;

const RESPONSES_URL: &str = "https://api.openai.com/v1/responses";

pub struct OpenAiChatModel {
    http: Client,
    api_key: String,
    org_id: Option<String>,
    model_name: String,
}

impl OpenAiChatModel {
    #[must_use]
    pub fn new(http: Client, api_key: String, org_id: Option<String>, model_name: String) -> Self {
        Self {
            http,
            api_key,
            org_id,
            model_name,
        }
    }

    #[must_use]
    pub fn build_prompt(&self, request: &CompletionRequest) -> Vec<ChatCompletionMessage> {
        let mut chat = Vec::with_capacity(request.messages.len() + 1);

        if let Some(system) = &request.system {
            chat.push(text_message(MessageRole::system, system));
        }

        for turn in &request.messages {
            let role = match turn.role {
                Role::User => MessageRole::user,
                Role::Assistant => MessageRole::assistant,
            };
            chat.push(text_message(role, &turn.content));
        }

        chat
    }

    fn headers(&self) -> Result<reqwest::header::HeaderMap, HandlerError> {
        let mut headers = reqwest::header::HeaderMap::new();
        let auth_value = format!("Bearer {}", self.api_key)
            .parse()
            .map_err(|e| HandlerError::Http(format!("Invalid Authorization header: {e}")))?;
        headers.insert("Authorization", auth_value);

        if let Some(org) = &self.org_id {
            let org_value = org.parse().map_err(|e| {
                HandlerError::Http(format!("Invalid OpenAI-Organization header: {e}"))
            })?;
            headers.insert("OpenAI-Organization", org_value);
        }

        Ok(headers)
    }
}

#[async_trait]
impl ChatModel for OpenAiChatModel {
    async fn complete(&self, request: &CompletionRequest) -> Result<String, HandlerError> {
        let prompt = self.build_prompt(request);

        #[cfg(feature = "debug-logs")]
        info!("Using OpenAI prompt:\n{:?}", prompt);

        #[cfg(not(feature = "debug-logs"))]
        info!(
            model = %self.model_name,
            messages = prompt.len(),
            estimated_input_tokens = request.estimated_input_tokens(),
            "Invoking OpenAI model"
        );

        let mut request_body = json!({
            "model": self.model_name,
            "input": build_responses_input(&prompt),
            "max_output_tokens": request.max_tokens,
        });
        if let Some(temperature) = request.temperature {
            request_body["temperature"] = json!(temperature);
        }

        let response = self
            .http
            .post(RESPONSES_URL)
            .headers(self.headers()?)
            .json(&request_body)
            .send()
            .await
            .map_err(|e| HandlerError::Llm(format!("OpenAI API request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_else(|e| {
                format!("Failed to read error response body (status {status}): {e}")
            });
            return Err(HandlerError::Llm(format!(
                "OpenAI API error (status {status}): {error_text}"
            )));
        }

        let response_json: Value = response
            .json()
            .await
            .map_err(|e| HandlerError::Llm(format!("Failed to parse OpenAI response: {e}")))?;

        let text = extract_output_text(&response_json)
            .ok_or_else(|| HandlerError::Llm("No text in response".to_string()))?;
        Ok(truncate_at_stop(&text, &request.stop_sequences).to_string())
    }
}

fn text_message(role: MessageRole, text: &str) -> ChatCompletionMessage {
    ChatCompletionMessage {
        role,
        content: Content::Text(text.to_string()),
        name: None,
        tool_calls: None,
        tool_call_id: None,
    }
}

pub(crate) fn build_responses_input(prompt: &[ChatCompletionMessage]) -> Vec<Value> {
    prompt
        .iter()
        .filter_map(|m| {
            let Content::Text(text) = &m.content else {
                return None;
            };
            let (role, part_type) = match m.role {
                MessageRole::system => ("system", "input_text"),
                MessageRole::assistant => ("assistant", "output_text"),
                _ => ("user", "input_text"),
            };
            Some(json!({
                "role": role,
                "content": [{ "type": part_type, "text": text }]
            }))
        })
        .collect()
}

pub(crate) fn extract_output_text(response_json: &Value) -> Option<String> {
    if let Some(text) = response_json.get("output_text").and_then(Value::as_str) {
        return Some(text.to_string());
    }

    let mut collected: Vec<String> = Vec::new();
    for item in response_json.get("output")?.as_array()? {
        let Some(parts) = item.get("content").and_then(Value::as_array) else {
            continue;
        };
        for p in parts {
            let is_output_text = p
                .get("type")
                .and_then(Value::as_str)
                .is_some_and(|t| t == "output_text");
            if !is_output_text {
                continue;
            }
            if let Some(s) = p.get("text").and_then(Value::as_str) {
                collected.push(s.to_string());
            } else if let Some(s) = p
                .get("text")
                .and_then(|t| t.get("value"))
                .and_then(Value::as_str)
            {
                collected.push(s.to_string());
            }
        }
    }

    if collected.is_empty() {
        None
    } else {
        Some(collected.join("\n"))
    }
}
