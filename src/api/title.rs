//! Session title generation.

use lambda_runtime::LambdaEvent;
use serde_json::Value;
use tracing::info;

use super::{helpers, parsing};
use crate::ai::CompletionRequest;
use crate::core::context::AppContext;
use crate::core::models::{ConversationTurn, GenerateTitleRequest, GenerateTitleResponse};
use crate::errors::HandlerError;
use crate::prompt::TITLE_SYSTEM_PROMPT;

const TITLE_MAX_TOKENS: u32 = 1000;

/// Generates a short title from the caller-supplied history and stores it.
///
/// # Errors
///
/// Returns `BadRequest` for a malformed body, and `Llm` or `StoreAccess` when
/// the model call or the title update fails.
pub async fn generate_title(ctx: &AppContext, event: &Value) -> Result<Value, HandlerError> {
    let request: GenerateTitleRequest = parsing::parse_body(event)?;
    let history_json = serde_json::to_string(&request.session_history)?;

    let completion =
        CompletionRequest::new(vec![ConversationTurn::user(history_json)], TITLE_MAX_TOKENS)
            .with_system(TITLE_SYSTEM_PROMPT);
    let title = ctx.llm.complete(&completion).await?;

    ctx.sessions.set_title(&request.session_id, &title).await?;
    info!(session_id = %request.session_id, "Stored session title");

    Ok(helpers::ok(&GenerateTitleResponse {
        session_title: title,
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
    helpers::finish(generate_title(ctx, &event.payload).await)
}
