//! Session title generation Lambda.

use lambda_runtime::{Error, LambdaEvent, service_fn};
use makeit::api::title::function_handler;
use makeit::core::{config::AppConfig, context::AppContext};
use serde_json::Value;
use tracing::error;

#[tokio::main]
async fn main() -> Result<(), Error> {
    makeit::setup_logging();

    let config = AppConfig::from_env().map_err(|e| {
        error!("Config error: {}", e);
        Error::from(e)
    })?;
    let ctx = AppContext::from_config(config).await?;
    let ctx = &ctx;

    lambda_runtime::run(service_fn(move |event: LambdaEvent<Value>| async move {
        function_handler(ctx, event).await
    }))
    .await
}
