//! Conversation summaries.

use lambda_runtime::LambdaEvent;
use serde_json::Value;
use tracing::info;

use super::{helpers, parsing};
use crate::ai::CompletionRequest;
use crate::core::context::AppContext;
use crate::core::models::{ConversationTurn, SummarizeRequest, SummarizeResponse};
use crate::errors::HandlerError;
use crate::prompt::render_summary_prompt;

const SUMMARY_MAX_TOKENS: u32 = 4096;
const SUMMARY_TEMPERATURE: f32 = 0.1;

/// Summarizes the stored history in one model call and overwrites the
/// session summary.
///
/// # Errors
///
/// Returns `BadRequest` for a malformed body, and `Llm` or `StoreAccess` when
/// the model call or a store operation fails.
pub async fn summarize_session(ctx: &AppContext, event: &Value) -> Result<Value, HandlerError> {
    let request: SummarizeRequest = parsing::parse_body(event)?;
    let history = ctx.sessions.load_history(&request.session_id).await?;
    info!(session_id = %request.session_id, turns = history.len(), "Summarizing session");

    let completion = CompletionRequest::new(
        vec![ConversationTurn::user(render_summary_prompt(&history))],
        SUMMARY_MAX_TOKENS,
    )
    .with_temperature(SUMMARY_TEMPERATURE);
    let summary = ctx.llm.complete(&completion).await?;

    ctx.sessions
        .set_summary(&request.session_id, &summary)
        .await?;

    Ok(helpers::ok(&SummarizeResponse {
        summarized_text: summary,
    }))
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
    helpers::finish(summarize_session(ctx, &event.payload).await)
}
