//! makeit - Lambda handlers for an IT support chat assistant.
//!
//! The crate ships one Lambda binary per handler:
//! 1. Title generation for a new session
//! 2. A ReAct conversation agent with web search and Wikipedia tools
//! 3. Conversation summaries for escalation
//! 4. Read-only session queries
//! 5. User profile fetch and display-name update
//! 6. An SQS worker that mails a session summary to another user
//!
//! # Architecture
//!
//! The system uses:
//! - AWS Lambda for serverless execution
//! - DynamoDB for session and user records
//! - SSM Parameter Store for the run-tracing credential
//! - SES for escalation mail
//! - Amazon Bedrock or the `OpenAI` Responses API for inference
//! - Tokio for async runtime
//!
//! Clients are built once per container into an [`core::context::AppContext`]
//! and passed by reference to each invocation.
//!
//! # Example
//!
//! ```no_run
//! use makeit::core::{config::AppConfig, context::AppContext};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
//!     makeit::setup_logging();
//!
//!     let config = AppConfig::from_env()?;
//!     let ctx = AppContext::from_config(config).await?;
//!
//!     let event = serde_json::json!({ "body": { "sessionId": "session-1" } });
//!     let response = makeit::api::summarize::summarize_session(&ctx, &event).await?;
//!     println!("{response}");
//!     Ok(())
//! }
//! ```

pub mod agent;
pub mod ai;
pub mod api;
pub mod core;
pub mod errors;
pub mod infrastructure;
pub mod prompt;
pub mod tools;

pub use errors::HandlerError;

/// Configure structured logging with JSON format for AWS Lambda environments.
///
/// Installs a `tracing-subscriber` registry with a JSON formatter suitable for
/// `CloudWatch` Logs. The level comes from `RUST_LOG` and defaults to `info`.
/// Call once at the start of each Lambda binary.
///
/// # Example
///
/// ```
/// makeit::setup_logging();
/// ```
pub fn setup_logging() {
    use tracing_subscriber::prelude::*;
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    let fmt_layer = tracing_subscriber::fmt::layer().json().with_target(true);

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .init();
}
