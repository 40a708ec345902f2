//! Conversation agent handler.
//!
//! One invocation answers one user message:
//! - validate the request
//! - fetch the run-tracing credential (fatal on failure)
//! - load history and run the ReAct agent over the rendered prompt
//! - register a new session with its user, then persist the exchange and
//!   the session timestamps
//! - export the run trace (best effort)

use chrono::Utc;
use lambda_runtime::LambdaEvent;
use serde_json::{Value, json};
use tracing::{info, warn};

use super::{helpers, parsing};
use crate::agent::ReactAgent;
use crate::ai::RunRecord;
use crate::core::context::AppContext;
use crate::core::models::{ChatRequest, ChatResponse, ConversationTurn};
use crate::core::store::credential_from_secret;
use crate::errors::HandlerError;
use crate::prompt::{render_chat_prompt, render_user_agent_block};

const RUN_NAME: &str = "AgentExecutor";

/// Answers a chat message and records the exchange in the session.
///
/// # Errors
///
/// - `EmptyInput` for a blank message
/// - `BadRequest` for a malformed body or a first turn without `userId`
/// - `SecretAccess` when the tracing credential cannot be read (fatal)
/// - `Llm` or `StoreAccess` for backend failures
pub async fn chat(ctx: &AppContext, event: &Value) -> Result<Value, HandlerError> {
    let request: ChatRequest = parsing::parse_body(event)?;
    if request.message.trim().is_empty() {
        return Err(HandlerError::EmptyInput);
    }

    let first_turn_user = if request.is_first_turn() {
        let user_id = request
            .user_id
            .as_deref()
            .filter(|id| !id.is_empty())
            .ok_or_else(|| {
                HandlerError::BadRequest("userId is required on the first turn".to_string())
            })?;
        Some(user_id)
    } else {
        None
    };

    let secret_name = &ctx.config.tracing_secret_name;
    let raw_secret = ctx.secrets.get_secret(secret_name).await?;
    let tracing_key = credential_from_secret(secret_name, &raw_secret);

    let history = ctx.sessions.load_history(&request.session_id).await?;
    let user_agent_block = request.user_agent.as_ref().map(render_user_agent_block);
    let prompt = render_chat_prompt(&history, &request.message, user_agent_block.as_deref());

    info!(
        session_id = %request.session_id,
        history_turns = history.len(),
        first_turn = request.is_first_turn(),
        "Running conversation agent"
    );

    let started_at = Utc::now();
    let agent = ReactAgent::new(ctx.llm.as_ref(), ctx.tools.as_ref());
    let outcome = agent.run(&prompt).await?;
    if outcome.hit_iteration_limit() {
        warn!(session_id = %request.session_id, "Agent hit iteration limit; returning fallback reply");
    }

    // Must precede `append_turns`: a failure here leaves no stored turns.
    if let Some(user_id) = first_turn_user {
        ctx.users
            .add_session_id(user_id, &request.session_id)
            .await?;
        ctx.sessions
            .set_created_at(&request.session_id, &request.date_time)
            .await?;
    }

    let stored_message = match &user_agent_block {
        Some(block) => format!("{block}{}", request.message),
        None => request.message.clone(),
    };
    ctx.sessions
        .append_turns(
            &request.session_id,
            &[
                ConversationTurn::user(stored_message),
                ConversationTurn::assistant(outcome.reply.clone()),
            ],
        )
        .await?;
    ctx.sessions
        .set_updated_at(&request.session_id, &request.date_time)
        .await?;

    let run = RunRecord::new(RUN_NAME, started_at).finished(
        json!({ "input": prompt }),
        json!({ "output": outcome.reply }),
        json!({
            "session_id": request.session_id,
            "model_calls": outcome.trace.model_calls,
            "steps": outcome.trace.steps,
        }),
    );
    ctx.run_exporter.export(&tracing_key, &run).await;

    Ok(helpers::ok(&ChatResponse {
        message: outcome.reply,
    }))
}

/// Lambda entry point.
///
/// # Errors
///
/// Returns an error when the tracing credential cannot be read; all other
/// failures become error responses.
#[tracing::instrument(level = "info", skip(ctx, event), fields(request_id = %event.context.request_id))]
pub async fn function_handler(
    ctx: &AppContext,
    event: LambdaEvent<Value>,
) -> Result<Value, lambda_runtime::Error> {
    helpers::finish(chat(ctx, &event.payload).await)
}
