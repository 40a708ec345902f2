//! User profile endpoints.
//!
//! `GET /users/{userId}` returns the stored profile and `PUT /users/{userId}`
//! updates its display name. Both are served by one function and routed on
//! the HTTP method.

use lambda_runtime::LambdaEvent;
use serde_json::Value;
use tracing::info;

use super::{helpers, parsing};
use crate::core::context::AppContext;
use crate::core::models::{UpdateUserRequest, UserView};
use crate::errors::HandlerError;

fn user_id_param(event: &Value) -> Result<&str, HandlerError> {
    parsing::path_param(event, "userId")
        .ok_or_else(|| HandlerError::BadRequest("userId is required".to_string()))
}

/// # Errors
///
/// Returns `BadRequest` without a `userId`, `NotFound` for an unknown user.
pub async fn fetch_user(ctx: &AppContext, event: &Value) -> Result<Value, HandlerError> {
    let user_id = user_id_param(event)?;
    let user = ctx
        .users
        .get_user(user_id)
        .await?
        .ok_or_else(|| HandlerError::NotFound(format!("user {user_id}")))?;

    Ok(helpers::ok(&UserView::from(user)))
}

/// # Errors
///
/// Returns `BadRequest` without a `userId` or a non-empty `displayName`.
pub async fn update_user(ctx: &AppContext, event: &Value) -> Result<Value, HandlerError> {
    let user_id = user_id_param(event)?;
    let request: UpdateUserRequest = parsing::parse_body(event)?;
    let display_name = request
        .display_name
        .filter(|name| !name.trim().is_empty())
        .ok_or_else(|| HandlerError::BadRequest("displayName is required".to_string()))?;

    let user = ctx.users.set_display_name(user_id, &display_name).await?;
    info!(user_id, "Display name updated");

    Ok(helpers::ok(&UserView::from(user)))
}

/// `PUT` updates, anything else reads.
///
/// # Errors
///
/// See [`fetch_user`] and [`update_user`].
pub async fn route(ctx: &AppContext, event: &Value) -> Result<Value, HandlerError> {
    let method = parsing::v_str(event, &["httpMethod"])
        .or_else(|| parsing::v_str(event, &["requestContext", "http", "method"]))
        .unwrap_or("GET");

    if method.eq_ignore_ascii_case("PUT") {
        update_user(ctx, event).await
    } else {
        fetch_user(ctx, event).await
    }
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
