//! Read-only session queries.
//!
//! `GET /sessions/{sessionId}` returns one session with its history and
//! `GET /sessions?userId=` lists a user's sessions. Both are served by the same
//! function and routed on which parameter is present.

use futures::future::try_join_all;
use lambda_runtime::LambdaEvent;
use serde_json::Value;
use tracing::{info, warn};

use super::{helpers, parsing};
use crate::core::context::AppContext;
use crate::core::models::{
    HistoryEntryView, SessionListView, SessionRecord, SessionSummaryView, SessionView,
};
use crate::core::store::SessionStore;
use crate::errors::HandlerError;

const UNTITLED_SESSION: &str = "タイトル未生成";
const UNTITLED_LIST_ENTRY: &str = "タイトルなし";

/// # Errors
///
/// Returns `NotFound` for an unknown session and `StoreAccess` on store failure.
pub async fn fetch_session(ctx: &AppContext, session_id: &str) -> Result<Value, HandlerError> {
    let session = ctx
        .sessions
        .get_session(session_id)
        .await?
        .ok_or_else(|| HandlerError::NotFound(format!("session {session_id}")))?;

    Ok(helpers::ok(&session_view(session)))
}

/// # Errors
///
/// Returns `NotFound` for an unknown user and `StoreAccess` on store failure.
pub async fn fetch_sessions(ctx: &AppContext, user_id: &str) -> Result<Value, HandlerError> {
    let user = ctx
        .users
        .get_user(user_id)
        .await?
        .ok_or_else(|| HandlerError::NotFound(format!("user {user_id}")))?;

    let store = ctx.sessions.as_ref();
    let (sessions, escalated_sessions) = futures::try_join!(
        load_summaries(store, &user.session_ids, false),
        load_summaries(store, &user.escalated_session_ids, true),
    )?;
    info!(
        user_id,
        sessions = sessions.len(),
        escalated = escalated_sessions.len(),
        "Listed user sessions"
    );

    Ok(helpers::ok(&SessionListView {
        sessions,
        escalated_sessions,
    }))
}

/// Routes on `pathParameters.sessionId`, then `queryStringParameters.userId`.
///
/// # Errors
///
/// Returns `BadRequest` when neither parameter is present.
pub async fn route(ctx: &AppContext, event: &Value) -> Result<Value, HandlerError> {
    if let Some(session_id) = parsing::path_param(event, "sessionId") {
        return fetch_session(ctx, session_id).await;
    }
    if let Some(user_id) = parsing::query_param(event, "userId") {
        return fetch_sessions(ctx, user_id).await;
    }
    Err(HandlerError::BadRequest(
        "sessionId or userId is required".to_string(),
    ))
}

/// Lambda entry point.
///
/// # Errors
///
/// Returns an error only for fatal failures; others become error responses.
#[tracing::instrument(level = "info", skip(ctx, event), fields(request_id = %event.context.request_id))]
pub async fn function_handler(
    ctx: &AppContext,
    event: LambdaEvent<Value>,
) -> Result<Value, lambda_runtime::Error> {
    helpers::finish(route(ctx, &event.payload).await)
}

async fn load_summaries(
    store: &dyn SessionStore,
    session_ids: &[String],
    escalated: bool,
) -> Result<Vec<SessionSummaryView>, HandlerError> {
    let records = try_join_all(session_ids.iter().map(|id| store.get_session(id))).await?;

    let mut views: Vec<SessionSummaryView> = session_ids
        .iter()
        .zip(records)
        .filter_map(|(id, record)| match record {
            Some(record) => Some(summary_view(record, escalated)),
            None => {
                warn!(session_id = %id, "User references a missing session");
                None
            }
        })
        .collect();

    // ISO-8601 strings sort chronologically; sessions without a timestamp go last.
    views.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
    Ok(views)
}

fn session_view(session: SessionRecord) -> SessionView {
    SessionView {
        session_history: session
            .history
            .into_iter()
            .map(|turn| HistoryEntryView {
                role: turn.role.message_type(),
                message: turn.content,
            })
            .collect(),
        session_title: session
            .title
            .unwrap_or_else(|| UNTITLED_SESSION.to_string()),
        is_escalated: session.is_escalated.unwrap_or(false),
        session_id: session.session_id,
        created_at: session.created_at,
        updated_at: session.updated_at,
    }
}

fn summary_view(session: SessionRecord, escalated_list: bool) -> SessionSummaryView {
    SessionSummaryView {
        session_title: session
            .title
            .unwrap_or_else(|| UNTITLED_LIST_ENTRY.to_string()),
        is_escalated: session.is_escalated.unwrap_or(escalated_list),
        session_id: session.session_id,
        created_at: session.created_at,
        updated_at: session.updated_at,
    }
}
