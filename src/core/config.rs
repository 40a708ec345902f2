use std::env;

pub const DEFAULT_BEDROCK_MODEL_ID: &str = "anthropic.claude-3-5-sonnet-20240620-v1:0";
pub const DEFAULT_OPENAI_MODEL: &str = "gpt-4o";
pub const DEFAULT_TRACING_SECRET_NAME: &str = "LANGCHAIN_API_KEY";
pub const DEFAULT_TRACING_ENDPOINT: &str = "https://api.smith.langchain.com";
pub const DEFAULT_ESCALATION_FROM_ADDRESS: &str = "noreply@angel-make-it.com";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LlmProvider {
    Bedrock,
    OpenAi,
}

impl LlmProvider {
    fn parse(raw: &str) -> Result<Self, String> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "" | "bedrock" => Ok(LlmProvider::Bedrock),
            "openai" => Ok(LlmProvider::OpenAi),
            other => Err(format!(
                "LLM_PROVIDER: unsupported provider '{other}' (expected bedrock or openai)"
            )),
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub session_table_name: String,
    pub user_table_name: String,
    pub llm_provider: LlmProvider,
    pub bedrock_model_id: String,
    pub openai_api_key: Option<String>,
    pub openai_org_id: Option<String>,
    pub openai_model: String,
    pub tracing_secret_name: String,
    /// `None` disables run export; the credential is still fetched.
    pub tracing_endpoint: Option<String>,
    pub tracing_project: String,
    pub wikipedia_lang: String,
    /// Sender of escalation emails.
    pub escalation_from_address: String,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, String> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, String>
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let session_table_name = non_empty("SESSION_TABLE_NAME")
            .ok_or_else(|| "SESSION_TABLE_NAME: environment variable not found".to_string())?;
        let user_table_name = non_empty("USER_TABLE_NAME")
            .ok_or_else(|| "USER_TABLE_NAME: environment variable not found".to_string())?;
        let llm_provider = LlmProvider::parse(&lookup("LLM_PROVIDER").unwrap_or_default())?;
        let openai_api_key = non_empty("OPENAI_API_KEY");

        if llm_provider == LlmProvider::OpenAi && openai_api_key.is_none() {
            return Err("OPENAI_API_KEY: required when LLM_PROVIDER=openai".to_string());
        }

        let tracing_endpoint = match lookup("LANGCHAIN_ENDPOINT") {
            Some(v) if v.trim().is_empty() => None,
            Some(v) => Some(v.trim_end_matches('/').to_string()),
            None => Some(DEFAULT_TRACING_ENDPOINT.to_string()),
        };

        Ok(Self {
            session_table_name,
            user_table_name,
            llm_provider,
            bedrock_model_id: non_empty("BEDROCK_MODEL_ID")
                .unwrap_or_else(|| DEFAULT_BEDROCK_MODEL_ID.to_string()),
            openai_api_key,
            openai_org_id: non_empty("OPENAI_ORG_ID"),
            openai_model: non_empty("OPENAI_MODEL")
                .unwrap_or_else(|| DEFAULT_OPENAI_MODEL.to_string()),
            tracing_secret_name: non_empty("TRACING_SECRET_NAME")
                .unwrap_or_else(|| DEFAULT_TRACING_SECRET_NAME.to_string()),
            tracing_endpoint,
            tracing_project: non_empty("LANGCHAIN_PROJECT").unwrap_or_else(|| "default".to_string()),
            wikipedia_lang: non_empty("WIKIPEDIA_LANG").unwrap_or_else(|| "ja".to_string()),
            escalation_from_address: non_empty("ESCALATION_FROM_ADDRESS")
                .unwrap_or_else(|| DEFAULT_ESCALATION_FROM_ADDRESS.to_string()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> + use<> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    const TABLES: [(&str, &str); 2] = [
        ("SESSION_TABLE_NAME", "sessions"),
        ("USER_TABLE_NAME", "users"),
    ];

    fn with_tables(extra: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> + use<> {
        let mut pairs: Vec<(&str, &str)> = TABLES.to_vec();
        pairs.extend_from_slice(extra);
        lookup_from(&pairs)
    }

    #[test]
    fn defaults_apply_when_only_tables_are_set() {
        let config = AppConfig::from_lookup(with_tables(&[])).unwrap();

        assert_eq!(config.session_table_name, "sessions");
        assert_eq!(config.user_table_name, "users");
        assert_eq!(config.llm_provider, LlmProvider::Bedrock);
        assert_eq!(config.bedrock_model_id, DEFAULT_BEDROCK_MODEL_ID);
        assert_eq!(config.tracing_secret_name, "LANGCHAIN_API_KEY");
        assert_eq!(
            config.tracing_endpoint.as_deref(),
            Some(DEFAULT_TRACING_ENDPOINT)
        );
        assert_eq!(config.wikipedia_lang, "ja");
        assert_eq!(config.escalation_from_address, DEFAULT_ESCALATION_FROM_ADDRESS);
    }

    #[test]
    fn missing_session_table_is_an_error() {
        let err = AppConfig::from_lookup(lookup_from(&[])).unwrap_err();
        assert!(err.contains("SESSION_TABLE_NAME"));
    }

    #[test]
    fn missing_user_table_is_an_error() {
        let err = AppConfig::from_lookup(lookup_from(&[("SESSION_TABLE_NAME", "sessions")]))
            .unwrap_err();
        assert!(err.contains("USER_TABLE_NAME"));

        let err = AppConfig::from_lookup(lookup_from(&[
            ("SESSION_TABLE_NAME", "sessions"),
            ("USER_TABLE_NAME", " "),
        ]))
        .unwrap_err();
        assert!(err.contains("USER_TABLE_NAME"));
    }

    #[test]
    fn openai_provider_requires_api_key() {
        let err = AppConfig::from_lookup(with_tables(&[("LLM_PROVIDER", "openai")])).unwrap_err();
        assert!(err.contains("OPENAI_API_KEY"));
    }

    #[test]
    fn empty_tracing_endpoint_disables_export() {
        let config = AppConfig::from_lookup(with_tables(&[("LANGCHAIN_ENDPOINT", "")])).unwrap();
        assert!(config.tracing_endpoint.is_none());
    }

    #[test]
    fn unknown_provider_is_rejected() {
        let err = AppConfig::from_lookup(with_tables(&[("LLM_PROVIDER", "ollama")])).unwrap_err();
        assert!(err.contains("ollama"));
    }
}
