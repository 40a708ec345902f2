//! Export of agent runs to a LangSmith-compatible tracing endpoint.
//!
//! Export is best effort: failures are logged and never surface to the caller.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::Client;
use serde_json::{Value, json};
use tracing::{info, warn};
use uuid::Uuid;

/// A finished run, ready to be posted.
#[derive(Debug, Clone)]
pub struct RunRecord {
    pub name: String,
    pub inputs: Value,
    pub outputs: Value,
    pub extra: Value,
    pub started_at: DateTime<Utc>,
    pub ended_at: DateTime<Utc>,
}

impl RunRecord {
    #[must_use]
    pub fn new(name: impl Into<String>, started_at: DateTime<Utc>) -> Self {
        Self {
            name: name.into(),
            inputs: Value::Null,
            outputs: Value::Null,
            extra: Value::Null,
            started_at,
            ended_at: started_at,
        }
    }

    #[must_use]
    pub fn finished(mut self, inputs: Value, outputs: Value, extra: Value) -> Self {
        self.inputs = inputs;
        self.outputs = outputs;
        self.extra = extra;
        self.ended_at = Utc::now();
        self
    }
}

#[async_trait]
pub trait RunExporter: Send + Sync {
    async fn export(&self, api_key: &str, run: &RunRecord);
}

/// Used when no tracing endpoint is configured.
pub struct NoopRunExporter;

#[async_trait]
impl RunExporter for NoopRunExporter {
    async fn export(&self, _api_key: &str, run: &RunRecord) {
        info!(run = %run.name, "Run tracing disabled; skipping export");
    }
}

pub struct LangSmithRunExporter {
    http: Client,
    endpoint: String,
    project: String,
}

impl LangSmithRunExporter {
    #[must_use]
    pub fn new(http: Client, endpoint: &str, project: impl Into<String>) -> Self {
        Self {
            http,
            endpoint: endpoint.trim_end_matches('/').to_string(),
            project: project.into(),
        }
    }

    pub(crate) fn payload(&self, run: &RunRecord) -> Value {
        json!({
            "id": Uuid::new_v4().to_string(),
            "name": run.name,
            "run_type": "chain",
            "start_time": run.started_at.to_rfc3339(),
            "end_time": run.ended_at.to_rfc3339(),
            "inputs": run.inputs,
            "outputs": run.outputs,
            "extra": run.extra,
            "session_name": self.project,
        })
    }
}

#[async_trait]
impl RunExporter for LangSmithRunExporter {
    async fn export(&self, api_key: &str, run: &RunRecord) {
        let url = format!("{}/runs", self.endpoint);
        let result = self
            .http
            .post(&url)
            .header("x-api-key", api_key)
            .json(&self.payload(run))
            .send()
            .await;

        match result {
            Ok(response) if response.status().is_success() => {
                info!(run = %run.name, "Exported run trace");
            }
            Ok(response) => {
                warn!(status = %response.status(), run = %run.name, "Run trace export rejected");
            }
            Err(e) => {
                warn!(error = %e, run = %run.name, "Run trace export failed");
            }
        }
    }
}
