use std::collections::HashMap;

use async_trait::async_trait;
use aws_sdk_dynamodb::Client as DynamoClient;
use aws_sdk_dynamodb::types::{AttributeValue, ReturnValue};
use tracing::{debug, warn};

use crate::core::models::{ConversationTurn, Role, SessionRecord, UserRecord};
use crate::core::store::{SessionStore, UserStore};
use crate::errors::HandlerError;

const SESSION_KEY: &str = "SessionId";
const USER_KEY: &str = "UserId";

const ATTR_TITLE: &str = "SessionTitle";
const ATTR_SUMMARY: &str = "SessionSummary";
const ATTR_HISTORY: &str = "History";
const ATTR_ESCALATED: &str = "IsEscalated";
const ATTR_CREATED_AT: &str = "CreatedAt";
const ATTR_UPDATED_AT: &str = "UpdatedAt";
const ATTR_EMAIL: &str = "Email";
const ATTR_DISPLAY_NAME: &str = "DisplayName";
const ATTR_INVITER: &str = "Inviter";
const ATTR_SESSION_IDS: &str = "SessionIds";
const ATTR_ESCALATED_SESSION_IDS: &str = "EscalatedSessionIds";

/// Session table keyed by `SessionId`.
pub struct DynamoSessionStore {
    client: DynamoClient,
    table_name: String,
}

impl DynamoSessionStore {
    #[must_use]
    pub fn new(client: DynamoClient, table_name: impl Into<String>) -> Self {
        Self {
            client,
            table_name: table_name.into(),
        }
    }

    async fn set_string_attribute(
        &self,
        session_id: &str,
        attribute: &str,
        value: &str,
    ) -> Result<(), HandlerError> {
        debug!(session_id, attribute, "Updating session attribute");
        self.client
            .update_item()
            .table_name(&self.table_name)
            .key(SESSION_KEY, AttributeValue::S(session_id.to_string()))
            .update_expression("SET #attr = :value")
            .expression_attribute_names("#attr", attribute)
            .expression_attribute_values(":value", AttributeValue::S(value.to_string()))
            .return_values(ReturnValue::AllNew)
            .send()
            .await?;
        Ok(())
    }
}

#[async_trait]
impl SessionStore for DynamoSessionStore {
    async fn get_session(&self, session_id: &str) -> Result<Option<SessionRecord>, HandlerError> {
        let output = self
            .client
            .get_item()
            .table_name(&self.table_name)
            .key(SESSION_KEY, AttributeValue::S(session_id.to_string()))
            .consistent_read(true)
            .send()
            .await?;

        Ok(output.item().map(|item| session_from_item(session_id, item)))
    }

    async fn append_turns(
        &self,
        session_id: &str,
        turns: &[ConversationTurn],
    ) -> Result<(), HandlerError> {
        if turns.is_empty() {
            return Ok(());
        }

        let encoded: Vec<AttributeValue> = turns.iter().map(turn_to_attribute).collect();
        self.client
            .update_item()
            .table_name(&self.table_name)
            .key(SESSION_KEY, AttributeValue::S(session_id.to_string()))
            .update_expression("SET #history = list_append(if_not_exists(#history, :empty), :turns)")
            .expression_attribute_names("#history", ATTR_HISTORY)
            .expression_attribute_values(":empty", AttributeValue::L(Vec::new()))
            .expression_attribute_values(":turns", AttributeValue::L(encoded))
            .return_values(ReturnValue::AllNew)
            .send()
            .await?;
        Ok(())
    }

    async fn set_title(&self, session_id: &str, title: &str) -> Result<(), HandlerError> {
        self.set_string_attribute(session_id, ATTR_TITLE, title).await
    }

    async fn set_summary(&self, session_id: &str, summary: &str) -> Result<(), HandlerError> {
        self.set_string_attribute(session_id, ATTR_SUMMARY, summary)
            .await
    }

    async fn set_created_at(&self, session_id: &str, created_at: &str) -> Result<(), HandlerError> {
        self.set_string_attribute(session_id, ATTR_CREATED_AT, created_at)
            .await
    }

    async fn set_updated_at(&self, session_id: &str, updated_at: &str) -> Result<(), HandlerError> {
        self.set_string_attribute(session_id, ATTR_UPDATED_AT, updated_at)
            .await
    }

    async fn set_escalated(&self, session_id: &str) -> Result<(), HandlerError> {
        self.client
            .update_item()
            .table_name(&self.table_name)
            .key(SESSION_KEY, AttributeValue::S(session_id.to_string()))
            .update_expression("SET #escalated = :escalated")
            .expression_attribute_names("#escalated", ATTR_ESCALATED)
            .expression_attribute_values(":escalated", AttributeValue::Bool(true))
            .send()
            .await?;
        Ok(())
    }
}

/// User table keyed by `UserId`.
pub struct DynamoUserStore {
    client: DynamoClient,
    table_name: String,
}

impl DynamoUserStore {
    #[must_use]
    pub fn new(client: DynamoClient, table_name: impl Into<String>) -> Self {
        Self {
            client,
            table_name: table_name.into(),
        }
    }

    async fn add_to_set(
        &self,
        user_id: &str,
        attribute: &str,
        session_id: &str,
    ) -> Result<(), HandlerError> {
        debug!(user_id, attribute, session_id, "Adding session to user set");
        self.client
            .update_item()
            .table_name(&self.table_name)
            .key(USER_KEY, AttributeValue::S(user_id.to_string()))
            .update_expression("ADD #ids :s")
            .expression_attribute_names("#ids", attribute)
            .expression_attribute_values(":s", AttributeValue::Ss(vec![session_id.to_string()]))
            .send()
            .await?;
        Ok(())
    }
}

#[async_trait]
impl UserStore for DynamoUserStore {
    async fn get_user(&self, user_id: &str) -> Result<Option<UserRecord>, HandlerError> {
        let output = self
            .client
            .get_item()
            .table_name(&self.table_name)
            .key(USER_KEY, AttributeValue::S(user_id.to_string()))
            .send()
            .await?;

        Ok(output.item().map(|item| user_from_item(user_id, item)))
    }

    async fn add_session_id(&self, user_id: &str, session_id: &str) -> Result<(), HandlerError> {
        self.add_to_set(user_id, ATTR_SESSION_IDS, session_id).await
    }

    async fn add_escalated_session_id(
        &self,
        user_id: &str,
        session_id: &str,
    ) -> Result<(), HandlerError> {
        self.add_to_set(user_id, ATTR_ESCALATED_SESSION_IDS, session_id)
            .await
    }

    async fn set_display_name(
        &self,
        user_id: &str,
        display_name: &str,
    ) -> Result<UserRecord, HandlerError> {
        let output = self
            .client
            .update_item()
            .table_name(&self.table_name)
            .key(USER_KEY, AttributeValue::S(user_id.to_string()))
            .update_expression("SET #name = :name")
            .expression_attribute_names("#name", ATTR_DISPLAY_NAME)
            .expression_attribute_values(":name", AttributeValue::S(display_name.to_string()))
            .return_values(ReturnValue::AllNew)
            .send()
            .await?;

        let empty = HashMap::new();
        Ok(user_from_item(user_id, output.attributes().unwrap_or(&empty)))
    }
}

// ============================================================================
// Item conversion
// ============================================================================

fn turn_to_attribute(turn: &ConversationTurn) -> AttributeValue {
    let kind = turn.role.message_type();
    let data = HashMap::from([
        ("type".to_string(), AttributeValue::S(kind.to_string())),
        ("content".to_string(), AttributeValue::S(turn.content.clone())),
    ]);
    AttributeValue::M(HashMap::from([
        ("type".to_string(), AttributeValue::S(kind.to_string())),
        ("data".to_string(), AttributeValue::M(data)),
    ]))
}

fn turn_from_attribute(value: &AttributeValue) -> Option<ConversationTurn> {
    let map = value.as_m().ok()?;
    let role = match map.get("type")?.as_s().ok()?.as_str() {
        "human" | "user" => Role::User,
        "ai" | "assistant" => Role::Assistant,
        _ => return None,
    };
    let content = map
        .get("data")
        .and_then(|d| d.as_m().ok())
        .and_then(|d| d.get("content"))
        .or_else(|| map.get("text"))
        .and_then(|c| c.as_s().ok())?;

    Some(ConversationTurn {
        role,
        content: content.clone(),
    })
}

fn session_from_item(session_id: &str, item: &HashMap<String, AttributeValue>) -> SessionRecord {
    let history = item
        .get(ATTR_HISTORY)
        .and_then(|h| h.as_l().ok())
        .map(|entries| {
            entries
                .iter()
                .filter_map(|entry| {
                    let turn = turn_from_attribute(entry);
                    if turn.is_none() {
                        warn!(session_id, "Skipping unreadable history entry");
                    }
                    turn
                })
                .collect()
        })
        .unwrap_or_default();

    SessionRecord {
        session_id: session_id.to_string(),
        title: string_attr(item, ATTR_TITLE),
        summary: string_attr(item, ATTR_SUMMARY),
        history,
        is_escalated: item.get(ATTR_ESCALATED).and_then(|v| v.as_bool().ok()).copied(),
        created_at: string_attr(item, ATTR_CREATED_AT),
        updated_at: string_attr(item, ATTR_UPDATED_AT),
    }
}

fn user_from_item(user_id: &str, item: &HashMap<String, AttributeValue>) -> UserRecord {
    UserRecord {
        user_id: user_id.to_string(),
        email: string_attr(item, ATTR_EMAIL),
        display_name: string_attr(item, ATTR_DISPLAY_NAME),
        session_ids: string_set(item, ATTR_SESSION_IDS),
        escalated_session_ids: string_set(item, ATTR_ESCALATED_SESSION_IDS),
        inviter: string_attr(item, ATTR_INVITER),
    }
}

fn string_attr(item: &HashMap<String, AttributeValue>, name: &str) -> Option<String> {
    item.get(name).and_then(|v| v.as_s().ok()).cloned()
}

fn string_set(item: &HashMap<String, AttributeValue>, name: &str) -> Vec<String> {
    item.get(name)
        .and_then(|v| v.as_ss().ok())
        .cloned()
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn turns_use_message_history_layout() {
        let attr = turn_to_attribute(&ConversationTurn::user("こんにちは"));
        let map = attr.as_m().unwrap();
        assert_eq!(map["type"].as_s().unwrap(), "human");
        let data = map["data"].as_m().unwrap();
        assert_eq!(data["content"].as_s().unwrap(), "こんにちは");

        assert_eq!(
            turn_from_attribute(&attr),
            Some(ConversationTurn::user("こんにちは"))
        );
    }

    #[test]
    fn flat_text_entries_are_readable() {
        let attr = AttributeValue::M(HashMap::from([
            ("type".to_string(), AttributeValue::S("ai".into())),
            ("text".to_string(), AttributeValue::S("answer".into())),
        ]));
        assert_eq!(
            turn_from_attribute(&attr),
            Some(ConversationTurn::assistant("answer"))
        );
    }

    #[test]
    fn session_item_preserves_history_order_and_metadata() {
        let item = HashMap::from([
            (SESSION_KEY.to_string(), AttributeValue::S("s1".into())),
            (ATTR_TITLE.to_string(), AttributeValue::S("Wi-Fi".into())),
            (ATTR_ESCALATED.to_string(), AttributeValue::Bool(true)),
            (
                ATTR_HISTORY.to_string(),
                AttributeValue::L(vec![
                    turn_to_attribute(&ConversationTurn::user("q1")),
                    turn_to_attribute(&ConversationTurn::assistant("a1")),
                    turn_to_attribute(&ConversationTurn::user("q2")),
                ]),
            ),
        ]);

        let record = session_from_item("s1", &item);
        assert_eq!(record.title.as_deref(), Some("Wi-Fi"));
        assert_eq!(record.is_escalated, Some(true));
        assert_eq!(record.summary, None);
        let contents: Vec<&str> = record.history.iter().map(|t| t.content.as_str()).collect();
        assert_eq!(contents, vec!["q1", "a1", "q2"]);
    }

    #[test]
    fn user_item_reads_profile_and_session_sets() {
        let item = HashMap::from([
            (USER_KEY.to_string(), AttributeValue::S("u1".into())),
            (ATTR_EMAIL.to_string(), AttributeValue::S("taro@example.com".into())),
            (ATTR_INVITER.to_string(), AttributeValue::S("boss".into())),
            (
                ATTR_ESCALATED_SESSION_IDS.to_string(),
                AttributeValue::Ss(vec!["s9".into()]),
            ),
        ]);

        let user = user_from_item("u1", &item);
        assert_eq!(user.email.as_deref(), Some("taro@example.com"));
        assert_eq!(user.inviter.as_deref(), Some("boss"));
        assert_eq!(user.display_name, None);
        assert!(user.session_ids.is_empty());
        assert_eq!(user.escalated_session_ids, vec!["s9"]);
    }
}
