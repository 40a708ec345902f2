use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

impl Role {
    /// Message type tag used in stored history and session views.
    #[must_use]
    pub fn message_type(self) -> &'static str {
        match self {
            Role::User => "human",
            Role::Assistant => "ai",
        }
    }
}

/// One persisted exchange entry. Turns are append-only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationTurn {
    pub role: Role,
    pub content: String,
}

impl ConversationTurn {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionRecord {
    pub session_id: String,
    pub title: Option<String>,
    pub summary: Option<String>,
    pub history: Vec<ConversationTurn>,
    pub is_escalated: Option<bool>,
    pub created_at: Option<String>,
    pub updated_at: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserRecord {
    pub user_id: String,
    pub email: Option<String>,
    pub display_name: Option<String>,
    pub session_ids: Vec<String>,
    pub escalated_session_ids: Vec<String>,
    /// User who invited this one; the default escalation recipient.
    pub inviter: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserAgentInfo {
    pub os_name: String,
    pub browser_name: String,
    pub device_name: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateTitleRequest {
    pub session_id: String,
    pub session_history: Value,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateTitleResponse {
    pub session_title: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatRequest {
    pub message: String,
    pub session_id: String,
    pub date_time: String,
    #[serde(default, deserialize_with = "user_agent_from_value")]
    pub user_agent: Option<UserAgentInfo>,
    #[serde(default)]
    pub user_id: Option<String>,
}

impl ChatRequest {
    /// The client only sends `userAgent` with the opening message of a session.
    #[must_use]
    pub fn is_first_turn(&self) -> bool {
        self.user_agent.is_some()
    }
}

#[derive(Debug, Serialize)]
pub struct ChatResponse {
    pub message: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SummarizeRequest {
    pub session_id: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SummarizeResponse {
    pub summarized_text: String,
}

/// Queue message asking for a session summary to be forwarded.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EscalationRequest {
    pub session_id: String,
    pub from_user_id: String,
    pub from_user_email: String,
    #[serde(default)]
    pub to_user_id: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateUserRequest {
    #[serde(default)]
    pub display_name: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserView {
    pub user_id: String,
    pub email: Option<String>,
    pub display_name: Option<String>,
    pub session_ids: Vec<String>,
    pub escalated_session_ids: Vec<String>,
    pub inviter: Option<String>,
}

impl From<UserRecord> for UserView {
    fn from(user: UserRecord) -> Self {
        Self {
            user_id: user.user_id,
            email: user.email,
            display_name: user.display_name,
            session_ids: user.session_ids,
            escalated_session_ids: user.escalated_session_ids,
            inviter: user.inviter,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct HistoryEntryView {
    pub role: &'static str,
    pub message: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionView {
    pub session_id: String,
    pub session_title: String,
    pub session_history: Vec<HistoryEntryView>,
    pub is_escalated: bool,
    pub created_at: Option<String>,
    pub updated_at: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSummaryView {
    pub session_id: String,
    pub session_title: String,
    pub is_escalated: bool,
    pub created_at: Option<String>,
    pub updated_at: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionListView {
    pub sessions: Vec<SessionSummaryView>,
    pub escalated_sessions: Vec<SessionSummaryView>,
}

// Some clients send `userAgent` as a JSON-encoded string instead of an object.
fn user_agent_from_value<'de, D>(deserializer: D) -> Result<Option<UserAgentInfo>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let raw = Option::<Value>::deserialize(deserializer)?;
    match raw {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => serde_json::from_str(&s)
            .map(Some)
            .map_err(serde::de::Error::custom),
        Some(other) => serde_json::from_value(other)
            .map(Some)
            .map_err(serde::de::Error::custom),
    }
}
