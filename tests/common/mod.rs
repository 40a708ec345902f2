//! In-memory fakes for the handler seams.

#![allow(dead_code)]

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use makeit::ai::{ChatModel, CompletionRequest, RunExporter, RunRecord};
use makeit::core::config::AppConfig;
use makeit::core::context::AppContext;
use makeit::core::models::{ConversationTurn, SessionRecord, UserRecord};
use makeit::core::store::{EmailMessage, Mailer, SecretStore, SessionStore, UserStore};
use makeit::errors::HandlerError;
use makeit::tools::{Tool, Toolset};

/// Store operations in call order, e.g. `set_title:s1`.
pub type CallLog = Arc<Mutex<Vec<String>>>;

#[derive(Default)]
pub struct InMemorySessionStore {
    pub sessions: Mutex<HashMap<String, SessionRecord>>,
    pub calls: CallLog,
    pub fail_updates: bool,
}

impl InMemorySessionStore {
    pub fn with_history(session_id: &str, history: Vec<ConversationTurn>) -> Self {
        let store = Self::default();
        store.sessions.lock().unwrap().insert(
            session_id.to_string(),
            SessionRecord {
                session_id: session_id.to_string(),
                history,
                ..SessionRecord::default()
            },
        );
        store
    }

    pub fn failing() -> Self {
        Self {
            fail_updates: true,
            ..Self::default()
        }
    }

    pub fn insert(&self, record: SessionRecord) {
        self.sessions
            .lock()
            .unwrap()
            .insert(record.session_id.clone(), record);
    }

    pub fn session(&self, session_id: &str) -> SessionRecord {
        self.sessions
            .lock()
            .unwrap()
            .get(session_id)
            .cloned()
            .unwrap_or_default()
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn update(
        &self,
        op: &str,
        session_id: &str,
        apply: impl FnOnce(&mut SessionRecord),
    ) -> Result<(), HandlerError> {
        self.calls.lock().unwrap().push(format!("{op}:{session_id}"));
        if self.fail_updates {
            return Err(HandlerError::StoreAccess(
                "ProvisionedThroughputExceededException".to_string(),
            ));
        }
        let mut sessions = self.sessions.lock().unwrap();
        let record = sessions
            .entry(session_id.to_string())
            .or_insert_with(|| SessionRecord {
                session_id: session_id.to_string(),
                ..SessionRecord::default()
            });
        apply(record);
        Ok(())
    }
}

#[async_trait]
impl SessionStore for InMemorySessionStore {
    async fn get_session(&self, session_id: &str) -> Result<Option<SessionRecord>, HandlerError> {
        self.calls
            .lock()
            .unwrap()
            .push(format!("get_session:{session_id}"));
        Ok(self.sessions.lock().unwrap().get(session_id).cloned())
    }

    async fn append_turns(
        &self,
        session_id: &str,
        turns: &[ConversationTurn],
    ) -> Result<(), HandlerError> {
        self.update("append_turns", session_id, |r| {
            r.history.extend_from_slice(turns);
        })
    }

    async fn set_title(&self, session_id: &str, title: &str) -> Result<(), HandlerError> {
        self.update("set_title", session_id, |r| r.title = Some(title.to_string()))
    }

    async fn set_summary(&self, session_id: &str, summary: &str) -> Result<(), HandlerError> {
        self.update("set_summary", session_id, |r| {
            r.summary = Some(summary.to_string());
        })
    }

    async fn set_created_at(&self, session_id: &str, created_at: &str) -> Result<(), HandlerError> {
        self.update("set_created_at", session_id, |r| {
            r.created_at = Some(created_at.to_string());
        })
    }

    async fn set_updated_at(&self, session_id: &str, updated_at: &str) -> Result<(), HandlerError> {
        self.update("set_updated_at", session_id, |r| {
            r.updated_at = Some(updated_at.to_string());
        })
    }

    async fn set_escalated(&self, session_id: &str) -> Result<(), HandlerError> {
        self.update("set_escalated", session_id, |r| r.is_escalated = Some(true))
    }
}

#[derive(Default)]
pub struct InMemoryUserStore {
    pub users: Mutex<HashMap<String, UserRecord>>,
    pub calls: CallLog,
    pub fail_updates: bool,
}

impl InMemoryUserStore {
    pub fn failing() -> Self {
        Self {
            fail_updates: true,
            ..Self::default()
        }
    }

    pub fn insert(&self, record: UserRecord) {
        self.users
            .lock()
            .unwrap()
            .insert(record.user_id.clone(), record);
    }

    pub fn user(&self, user_id: &str) -> Option<UserRecord> {
        self.users.lock().unwrap().get(user_id).cloned()
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn update(
        &self,
        call: String,
        user_id: &str,
        apply: impl FnOnce(&mut UserRecord),
    ) -> Result<UserRecord, HandlerError> {
        self.calls.lock().unwrap().push(call);
        if self.fail_updates {
            return Err(HandlerError::StoreAccess(
                "ConditionalCheckFailedException".to_string(),
            ));
        }
        let mut users = self.users.lock().unwrap();
        let record = users.entry(user_id.to_string()).or_insert_with(|| UserRecord {
            user_id: user_id.to_string(),
            ..UserRecord::default()
        });
        apply(record);
        Ok(record.clone())
    }
}

fn add_unique(ids: &mut Vec<String>, id: &str) {
    if !ids.iter().any(|existing| existing == id) {
        ids.push(id.to_string());
    }
}

#[async_trait]
impl UserStore for InMemoryUserStore {
    async fn get_user(&self, user_id: &str) -> Result<Option<UserRecord>, HandlerError> {
        Ok(self.users.lock().unwrap().get(user_id).cloned())
    }

    async fn add_session_id(&self, user_id: &str, session_id: &str) -> Result<(), HandlerError> {
        self.update(
            format!("add_session_id:{user_id}:{session_id}"),
            user_id,
            |r| add_unique(&mut r.session_ids, session_id),
        )
        .map(|_| ())
    }

    async fn add_escalated_session_id(
        &self,
        user_id: &str,
        session_id: &str,
    ) -> Result<(), HandlerError> {
        self.update(
            format!("add_escalated_session_id:{user_id}:{session_id}"),
            user_id,
            |r| add_unique(&mut r.escalated_session_ids, session_id),
        )
        .map(|_| ())
    }

    async fn set_display_name(
        &self,
        user_id: &str,
        display_name: &str,
    ) -> Result<UserRecord, HandlerError> {
        self.update(format!("set_display_name:{user_id}"), user_id, |r| {
            r.display_name = Some(display_name.to_string());
        })
    }
}

pub struct FakeSecretStore {
    pub value: Option<String>,
}

impl FakeSecretStore {
    pub fn with_value(value: &str) -> Self {
        Self {
            value: Some(value.to_string()),
        }
    }

    pub fn denied() -> Self {
        Self { value: None }
    }
}

#[async_trait]
impl SecretStore for FakeSecretStore {
    async fn get_secret(&self, name: &str) -> Result<String, HandlerError> {
        self.value
            .clone()
            .ok_or_else(|| HandlerError::SecretAccess(format!("{name}: AccessDeniedException")))
    }
}

/// Records sent mail instead of delivering it.
#[derive(Default)]
pub struct RecordingMailer {
    pub sent: Mutex<Vec<EmailMessage>>,
    pub fail: bool,
}

impl RecordingMailer {
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    pub fn sent(&self) -> Vec<EmailMessage> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl Mailer for RecordingMailer {
    async fn send(&self, message: &EmailMessage) -> Result<(), HandlerError> {
        if self.fail {
            return Err(HandlerError::Mail("MessageRejected".to_string()));
        }
        self.sent.lock().unwrap().push(message.clone());
        Ok(())
    }
}

/// Returns canned outputs in order and records every request.
#[derive(Default)]
pub struct ScriptedModel {
    outputs: Mutex<VecDeque<String>>,
    pub requests: Mutex<Vec<CompletionRequest>>,
}

impl ScriptedModel {
    pub fn new(outputs: &[&str]) -> Self {
        Self {
            outputs: Mutex::new(outputs.iter().map(|s| (*s).to_string()).collect()),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn requests(&self) -> Vec<CompletionRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl ChatModel for ScriptedModel {
    async fn complete(&self, request: &CompletionRequest) -> Result<String, HandlerError> {
        self.requests.lock().unwrap().push(request.clone());
        self.outputs
            .lock()
            .unwrap()
            .pop_front()
            .ok_or_else(|| HandlerError::Llm("script exhausted".to_string()))
    }
}

/// Always answers with the same output.
pub struct RepeatingModel {
    pub output: String,
    pub calls: Mutex<usize>,
}

impl RepeatingModel {
    pub fn new(output: &str) -> Self {
        Self {
            output: output.to_string(),
            calls: Mutex::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        *self.calls.lock().unwrap()
    }
}

#[async_trait]
impl ChatModel for RepeatingModel {
    async fn complete(&self, _request: &CompletionRequest) -> Result<String, HandlerError> {
        *self.calls.lock().unwrap() += 1;
        Ok(self.output.clone())
    }
}

/// Tool that echoes its input, recording each call.
pub struct EchoTool {
    pub name: &'static str,
    pub inputs: Mutex<Vec<String>>,
}

impl EchoTool {
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            inputs: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl Tool for EchoTool {
    fn name(&self) -> &str {
        self.name
    }

    fn description(&self) -> &str {
        "Echoes the input back."
    }

    async fn call(&self, input: &str) -> Result<String, HandlerError> {
        self.inputs.lock().unwrap().push(input.to_string());
        Ok(format!("echo: {input}"))
    }
}

/// Captures exported runs instead of posting them.
#[derive(Default)]
pub struct RecordingExporter {
    pub runs: Mutex<Vec<(String, RunRecord)>>,
}

#[async_trait]
impl RunExporter for RecordingExporter {
    async fn export(&self, api_key: &str, run: &RunRecord) {
        self.runs
            .lock()
            .unwrap()
            .push((api_key.to_string(), run.clone()));
    }
}

pub fn test_config() -> AppConfig {
    AppConfig::from_lookup(|key| match key {
        "SESSION_TABLE_NAME" => Some("sessions".to_string()),
        "USER_TABLE_NAME" => Some("users".to_string()),
        _ => None,
    })
    .expect("test config")
}

/// Handles kept by a test so it can inspect the fakes after a call.
pub struct Harness {
    pub ctx: AppContext,
    pub sessions: Arc<InMemorySessionStore>,
    pub users: Arc<InMemoryUserStore>,
    pub mailer: Arc<RecordingMailer>,
    pub exporter: Arc<RecordingExporter>,
}

pub fn harness(
    sessions: InMemorySessionStore,
    secrets: FakeSecretStore,
    llm: Arc<dyn ChatModel>,
) -> Harness {
    harness_with_users(sessions, InMemoryUserStore::default(), secrets, llm)
}

pub fn harness_with_users(
    sessions: InMemorySessionStore,
    users: InMemoryUserStore,
    secrets: FakeSecretStore,
    llm: Arc<dyn ChatModel>,
) -> Harness {
    harness_with_mailer(sessions, users, RecordingMailer::default(), secrets, llm)
}

pub fn harness_with_mailer(
    sessions: InMemorySessionStore,
    users: InMemoryUserStore,
    mailer: RecordingMailer,
    secrets: FakeSecretStore,
    llm: Arc<dyn ChatModel>,
) -> Harness {
    let sessions = Arc::new(sessions);
    let users = Arc::new(users);
    let mailer = Arc::new(mailer);
    let exporter = Arc::new(RecordingExporter::default());
    let ctx = AppContext {
        config: test_config(),
        sessions: sessions.clone(),
        users: users.clone(),
        secrets: Arc::new(secrets),
        mailer: mailer.clone(),
        llm,
        tools: Arc::new(Toolset::new(vec![Box::new(EchoTool::new("wikipedia"))])),
        run_exporter: exporter.clone(),
    };
    Harness {
        ctx,
        sessions,
        users,
        mailer,
        exporter,
    }
}
