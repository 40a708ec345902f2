//! Language model backends and run tracing.

pub mod bedrock;
pub mod llm;
pub mod openai;
pub mod run_tracer;

pub use bedrock::BedrockChatModel;
pub use llm::{ChatModel, CompletionRequest};
pub use openai::OpenAiChatModel;
pub use run_tracer::{LangSmithRunExporter, NoopRunExporter, RunExporter, RunRecord};
