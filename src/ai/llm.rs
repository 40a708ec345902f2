//! Backend-independent language model seam.

use async_trait::async_trait;

use crate::core::models::ConversationTurn;
use crate::errors::HandlerError;

/// A single request/response round trip to a chat model.
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionRequest {
    pub system: Option<String>,
    pub messages: Vec<ConversationTurn>,
    pub max_tokens: u32,
    pub temperature: Option<f32>,
    pub stop_sequences: Vec<String>,
}

impl CompletionRequest {
    #[must_use]
    pub fn new(messages: Vec<ConversationTurn>, max_tokens: u32) -> Self {
        Self {
            system: None,
            messages,
            max_tokens,
            temperature: None,
            stop_sequences: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_system(mut self, system: impl Into<String>) -> Self {
        self.system = Some(system.into());
        self
    }

    #[must_use]
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    #[must_use]
    pub fn with_stop_sequences(mut self, stops: &[&str]) -> Self {
        self.stop_sequences = stops.iter().map(|s| (*s).to_string()).collect();
        self
    }

    /// Rough token count of everything sent to the model.
    #[must_use]
    pub fn estimated_input_tokens(&self) -> usize {
        let system = self.system.as_deref().map_or(0, estimate_tokens);
        system
            + self
                .messages
                .iter()
                .map(|m| estimate_tokens(&m.content))
                .sum::<usize>()
    }
}

#[async_trait]
pub trait ChatModel: Send + Sync {
    /// Returns the generated text of the first candidate.
    async fn complete(&self, request: &CompletionRequest) -> Result<String, HandlerError>;
}

#[must_use]
pub fn estimate_tokens(text: &str) -> usize {
    text.chars().count() / 4 + 1
}

/// Cuts `text` at the earliest stop sequence.
///
/// Applied to every completion so backends without native stop-sequence
/// support behave like those with it.
#[must_use]
pub fn truncate_at_stop<'a>(text: &'a str, stops: &[String]) -> &'a str {
    stops
        .iter()
        .filter(|s| !s.is_empty())
        .filter_map(|s| text.find(s.as_str()))
        .min()
        .map_or(text, |idx| &text[..idx])
}
