//! ReAct-style conversation agent.

pub mod parser;
pub mod react;

pub use parser::{AgentDecision, ParseError, ToolInvocation, parse_react_output};
pub use react::{
    AgentFailure, AgentOutcome, AgentRun, AgentState, AgentStep, AgentTrace, ITERATION_LIMIT_REPLY,
    MAX_AGENT_STEPS, ReactAgent,
};
