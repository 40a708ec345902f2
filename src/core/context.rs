//! Shared handler resources, built once per Lambda container.

use std::sync::Arc;
use std::time::Duration;

use tracing::info;

use super::config::{AppConfig, LlmProvider};
use super::store::{Mailer, SecretStore, SessionStore, UserStore};
use crate::ai::{
    BedrockChatModel, ChatModel, LangSmithRunExporter, NoopRunExporter, OpenAiChatModel,
    RunExporter,
};
use crate::errors::HandlerError;
use crate::infrastructure::aws::{DynamoSessionStore, DynamoUserStore, SesMailer, SsmSecretStore};
use crate::tools::Toolset;

const HTTP_TIMEOUT: Duration = Duration::from_secs(30);

pub struct AppContext {
    pub config: AppConfig,
    pub sessions: Arc<dyn SessionStore>,
    pub users: Arc<dyn UserStore>,
    pub secrets: Arc<dyn SecretStore>,
    pub mailer: Arc<dyn Mailer>,
    pub llm: Arc<dyn ChatModel>,
    pub tools: Arc<Toolset>,
    pub run_exporter: Arc<dyn RunExporter>,
}

impl AppContext {
    /// Wires the AWS-backed stores and mailer, the configured model backend
    /// and the agent tools.
    ///
    /// # Errors
    ///
    /// Returns `Config` if the HTTP client cannot be built or the selected
    /// model backend is missing its credentials.
    pub async fn from_config(config: AppConfig) -> Result<Self, HandlerError> {
        let shared = aws_config::from_env().load().await;
        let http = reqwest::Client::builder()
            .timeout(HTTP_TIMEOUT)
            .build()
            .map_err(|e| HandlerError::Config(format!("Failed to build HTTP client: {e}")))?;

        let dynamo = aws_sdk_dynamodb::Client::new(&shared);
        let sessions: Arc<dyn SessionStore> = Arc::new(DynamoSessionStore::new(
            dynamo.clone(),
            config.session_table_name.clone(),
        ));
        let users: Arc<dyn UserStore> =
            Arc::new(DynamoUserStore::new(dynamo, config.user_table_name.clone()));
        let secrets: Arc<dyn SecretStore> =
            Arc::new(SsmSecretStore::new(aws_sdk_ssm::Client::new(&shared)));
        let mailer: Arc<dyn Mailer> =
            Arc::new(SesMailer::new(aws_sdk_sesv2::Client::new(&shared)));

        let llm: Arc<dyn ChatModel> = match config.llm_provider {
            LlmProvider::Bedrock => {
                info!(model_id = %config.bedrock_model_id, "Using Bedrock backend");
                Arc::new(BedrockChatModel::new(
                    aws_sdk_bedrockruntime::Client::new(&shared),
                    config.bedrock_model_id.clone(),
                ))
            }
            LlmProvider::OpenAi => {
                let api_key = config.openai_api_key.clone().ok_or_else(|| {
                    HandlerError::Config("OPENAI_API_KEY is not set".to_string())
                })?;
                info!(model = %config.openai_model, "Using OpenAI backend");
                Arc::new(OpenAiChatModel::new(
                    http.clone(),
                    api_key,
                    config.openai_org_id.clone(),
                    config.openai_model.clone(),
                ))
            }
        };

        let run_exporter: Arc<dyn RunExporter> = match &config.tracing_endpoint {
            Some(endpoint) => Arc::new(LangSmithRunExporter::new(
                http.clone(),
                endpoint,
                config.tracing_project.clone(),
            )),
            None => Arc::new(NoopRunExporter),
        };

        let tools = Arc::new(Toolset::standard(http, &config.wikipedia_lang));

        Ok(Self {
            config,
            sessions,
            users,
            secrets,
            mailer,
            llm,
            tools,
            run_exporter,
        })
    }
}
