//! Storage seams used by the handlers.
//!
//! Each method maps to a single get or update call against the backing
//! key-value service. Implementations live in `infrastructure`; tests use
//! in-memory fakes.

use async_trait::async_trait;

use super::models::{ConversationTurn, SessionRecord, UserRecord};
use crate::errors::HandlerError;

#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Returns `None` when no item exists for `session_id`.
    async fn get_session(&self, session_id: &str) -> Result<Option<SessionRecord>, HandlerError>;

    /// Full conversation history in persisted order; empty for unknown sessions.
    async fn load_history(&self, session_id: &str) -> Result<Vec<ConversationTurn>, HandlerError> {
        Ok(self
            .get_session(session_id)
            .await?
            .map(|s| s.history)
            .unwrap_or_default())
    }

    async fn append_turns(
        &self,
        session_id: &str,
        turns: &[ConversationTurn],
    ) -> Result<(), HandlerError>;

    async fn set_title(&self, session_id: &str, title: &str) -> Result<(), HandlerError>;

    async fn set_summary(&self, session_id: &str, summary: &str) -> Result<(), HandlerError>;

    async fn set_created_at(&self, session_id: &str, created_at: &str) -> Result<(), HandlerError>;

    async fn set_updated_at(&self, session_id: &str, updated_at: &str) -> Result<(), HandlerError>;

    /// Marks the session as forwarded to another user.
    async fn set_escalated(&self, session_id: &str) -> Result<(), HandlerError>;
}

#[async_trait]
pub trait UserStore: Send + Sync {
    async fn get_user(&self, user_id: &str) -> Result<Option<UserRecord>, HandlerError>;

    /// Adds `session_id` to the user's session set; a no-op if already present.
    async fn add_session_id(&self, user_id: &str, session_id: &str) -> Result<(), HandlerError>;

    /// Adds `session_id` to the sessions escalated to this user.
    async fn add_escalated_session_id(
        &self,
        user_id: &str,
        session_id: &str,
    ) -> Result<(), HandlerError>;

    /// Updates the display name and returns the user as stored afterwards.
    async fn set_display_name(
        &self,
        user_id: &str,
        display_name: &str,
    ) -> Result<UserRecord, HandlerError>;
}

#[async_trait]
pub trait SecretStore: Send + Sync {
    async fn get_secret(&self, name: &str) -> Result<String, HandlerError>;
}

/// Plain-text email.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmailMessage {
    pub from: String,
    pub to: String,
    pub subject: String,
    pub body: String,
}

#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, message: &EmailMessage) -> Result<(), HandlerError>;
}

/// Resolves a credential from a secret value.
///
/// Secrets are stored either as the raw credential or as a JSON object keyed
/// by the secret name, e.g. `{"LANGCHAIN_API_KEY": "..."}`.
#[must_use]
pub fn credential_from_secret(name: &str, raw: &str) -> String {
    serde_json::from_str::<serde_json::Value>(raw)
        .ok()
        .and_then(|v| v.get(name).and_then(|k| k.as_str()).map(str::to_string))
        .unwrap_or_else(|| raw.trim().to_string())
}
