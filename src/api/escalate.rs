//! Escalation worker.
//!
//! Consumes queue messages asking for a session summary to be forwarded to
//! another user, by default the one who invited the sender. Records are
//! handled one at a time; a failed record is logged and the batch continues.

use lambda_runtime::LambdaEvent;
use serde::Serialize;
use serde_json::Value;
use tracing::{error, info, warn};

use super::parsing::v_str;
use crate::core::context::AppContext;
use crate::core::models::EscalationRequest;
use crate::core::store::EmailMessage;
use crate::errors::HandlerError;

/// Per-batch tally, returned as the invocation result.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize)]
pub struct EscalationReport {
    pub forwarded: usize,
    pub skipped: usize,
    pub failed: usize,
}

#[derive(Debug, PartialEq, Eq)]
enum RecordOutcome {
    Forwarded,
    /// The session has no summary yet.
    Skipped,
}

#[must_use]
pub fn escalation_subject(from_user_email: &str) -> String {
    format!("{from_user_email}さんからお困りごとが転送されました。")
}

/// Processes every record in an SQS event.
pub async fn escalate_batch(ctx: &AppContext, event: &Value) -> EscalationReport {
    let mut report = EscalationReport::default();
    let Some(records) = event.get("Records").and_then(Value::as_array) else {
        warn!("Escalation event has no Records");
        return report;
    };

    for record in records {
        let message_id = v_str(record, &["messageId"]).unwrap_or("unknown");
        match escalate_record(ctx, record).await {
            Ok(RecordOutcome::Forwarded) => report.forwarded += 1,
            Ok(RecordOutcome::Skipped) => report.skipped += 1,
            Err(e) => {
                error!(message_id, error = %e, "Failed to process escalation message");
                report.failed += 1;
            }
        }
    }

    info!(
        forwarded = report.forwarded,
        skipped = report.skipped,
        failed = report.failed,
        "Escalation batch processed"
    );
    report
}

async fn escalate_record(ctx: &AppContext, record: &Value) -> Result<RecordOutcome, HandlerError> {
    let body = v_str(record, &["body"])
        .ok_or_else(|| HandlerError::BadRequest("SQS record has no body".to_string()))?;
    let request: EscalationRequest = serde_json::from_str(body)?;

    let recipient_id = resolve_recipient(ctx, &request).await?;
    let (recipient, session) = futures::try_join!(
        ctx.users.get_user(&recipient_id),
        ctx.sessions.get_session(&request.session_id),
    )?;

    let session = session
        .ok_or_else(|| HandlerError::NotFound(format!("session {}", request.session_id)))?;
    let Some(summary) = session.summary.filter(|s| !s.trim().is_empty()) else {
        warn!(session_id = %request.session_id, "Session summary not found; skipping");
        return Ok(RecordOutcome::Skipped);
    };
    let to = recipient
        .and_then(|user| user.email)
        .ok_or_else(|| HandlerError::NotFound(format!("email for user {recipient_id}")))?;

    ctx.mailer
        .send(&EmailMessage {
            from: ctx.config.escalation_from_address.clone(),
            to,
            subject: escalation_subject(&request.from_user_email),
            body: summary,
        })
        .await?;

    futures::try_join!(
        ctx.sessions.set_escalated(&request.session_id),
        ctx.users
            .add_escalated_session_id(&recipient_id, &request.session_id),
    )?;

    info!(
        session_id = %request.session_id,
        from_user_id = %request.from_user_id,
        recipient_id = %recipient_id,
        "Session escalated"
    );
    Ok(RecordOutcome::Forwarded)
}

/// Explicit `toUserId`, otherwise the sender's inviter.
async fn resolve_recipient(
    ctx: &AppContext,
    request: &EscalationRequest,
) -> Result<String, HandlerError> {
    if let Some(to) = request.to_user_id.as_deref().filter(|id| !id.is_empty()) {
        return Ok(to.to_string());
    }

    let sender = ctx
        .users
        .get_user(&request.from_user_id)
        .await?
        .ok_or_else(|| HandlerError::NotFound(format!("user {}", request.from_user_id)))?;
    sender
        .inviter
        .filter(|id| !id.is_empty())
        .ok_or_else(|| HandlerError::NotFound(format!("inviter of {}", request.from_user_id)))
}

/// Lambda entry point.
///
/// # Errors
///
/// Only fails if the report cannot be serialised; record failures are logged.
#[tracing::instrument(level = "info", skip(ctx, event), fields(request_id = %event.context.request_id))]
pub async fn function_handler(
    ctx: &AppContext,
    event: LambdaEvent<Value>,
) -> Result<Value, lambda_runtime::Error> {
    let report = escalate_batch(ctx, &event.payload).await;
    Ok(serde_json::to_value(report)?)
}
