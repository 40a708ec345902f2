//! Bounded ReAct loop as an explicit state machine.
//!
//! ```text
//! Reasoning ──tool call──▶ AwaitingToolResult ──observation──▶ Reasoning
//!     │  └─parse error (observation fed back)─▶ Reasoning
//!     ├─final answer─▶ Done
//!     └─step budget exhausted─▶ Failed(IterationLimit)
//! ```
//!
//! One step is one model call. The step counter is checked before every call,
//! so a run never makes more than `max_steps` model calls.

use serde::Serialize;
use tracing::{debug, info, warn};

use super::parser::{AgentDecision, ToolInvocation, parse_react_output};
use crate::ai::{ChatModel, CompletionRequest};
use crate::core::models::ConversationTurn;
use crate::errors::HandlerError;
use crate::prompt::render_react_prompt;
use crate::tools::Toolset;

pub const MAX_AGENT_STEPS: usize = 10;

/// Reply returned to the user when the step budget runs out.
pub const ITERATION_LIMIT_REPLY: &str = "エラーが発生しました、再度お試しください";

const AGENT_MAX_TOKENS: u32 = 8192;
const STOP_SEQUENCES: [&str; 1] = ["\nObservation:"];
const PARSE_ERROR_TOOL: &str = "_Exception";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum AgentFailure {
    IterationLimit,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AgentState {
    Reasoning,
    AwaitingToolResult(ToolInvocation),
    Done(String),
    Failed(AgentFailure),
}

impl AgentState {
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        matches!(self, AgentState::Done(_) | AgentState::Failed(_))
    }
}

/// One intermediate step: what the model asked for and what it saw back.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AgentStep {
    pub tool: String,
    pub tool_input: String,
    pub log: String,
    pub observation: String,
}

/// Ephemeral record of a single agent run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AgentTrace {
    pub steps: Vec<AgentStep>,
    pub model_calls: usize,
}

impl AgentTrace {
    /// Renders prior steps in the `Observation:` / `Thought:` scratchpad format.
    #[must_use]
    pub fn scratchpad(&self) -> String {
        let mut thoughts = String::new();
        for step in &self.steps {
            thoughts.push_str(&step.log);
            thoughts.push_str(&format!("\nObservation: {}\nThought: ", step.observation));
        }
        thoughts
    }
}

#[derive(Debug, Clone)]
pub struct AgentOutcome {
    pub reply: String,
    pub state: AgentState,
    pub trace: AgentTrace,
}

impl AgentOutcome {
    #[must_use]
    pub fn hit_iteration_limit(&self) -> bool {
        self.state == AgentState::Failed(AgentFailure::IterationLimit)
    }
}

pub struct ReactAgent<'a> {
    model: &'a dyn ChatModel,
    tools: &'a Toolset,
    max_steps: usize,
}

impl<'a> ReactAgent<'a> {
    #[must_use]
    pub fn new(model: &'a dyn ChatModel, tools: &'a Toolset) -> Self {
        Self {
            model,
            tools,
            max_steps: MAX_AGENT_STEPS,
        }
    }

    #[must_use]
    pub fn with_max_steps(mut self, max_steps: usize) -> Self {
        self.max_steps = max_steps;
        self
    }

    #[must_use]
    pub fn start(&self, question: &str) -> AgentRun<'_, 'a> {
        AgentRun {
            agent: self,
            question: question.to_string(),
            state: AgentState::Reasoning,
            trace: AgentTrace::default(),
        }
    }

    /// Drives a run to a terminal state.
    ///
    /// # Errors
    ///
    /// Returns an error if a model call fails. Parse errors, tool failures and
    /// the step limit are handled inside the loop.
    pub async fn run(&self, question: &str) -> Result<AgentOutcome, HandlerError> {
        let mut run = self.start(question);
        while !run.state().is_terminal() {
            run.advance().await?;
        }
        Ok(run.into_outcome())
    }
}

pub struct AgentRun<'r, 'a> {
    agent: &'r ReactAgent<'a>,
    question: String,
    state: AgentState,
    trace: AgentTrace,
}

impl AgentRun<'_, '_> {
    #[must_use]
    pub fn state(&self) -> &AgentState {
        &self.state
    }

    #[must_use]
    pub fn trace(&self) -> &AgentTrace {
        &self.trace
    }

    /// Performs exactly one transition. Terminal states are left unchanged.
    ///
    /// # Errors
    ///
    /// Returns an error if the model call fails.
    pub async fn advance(&mut self) -> Result<(), HandlerError> {
        let next = match std::mem::replace(&mut self.state, AgentState::Reasoning) {
            AgentState::Reasoning => self.reason().await?,
            AgentState::AwaitingToolResult(call) => self.act(call).await,
            terminal => terminal,
        };
        self.state = next;
        Ok(())
    }

    async fn reason(&mut self) -> Result<AgentState, HandlerError> {
        if self.trace.model_calls >= self.agent.max_steps {
            warn!(
                steps = self.trace.model_calls,
                "Agent stopped due to iteration limit"
            );
            return Ok(AgentState::Failed(AgentFailure::IterationLimit));
        }
        self.trace.model_calls += 1;

        let prompt = render_react_prompt(
            &self.agent.tools.render_descriptions(),
            &self.agent.tools.names(),
            &self.question,
            &self.trace.scratchpad(),
        );
        let request = CompletionRequest::new(vec![ConversationTurn::user(prompt)], AGENT_MAX_TOKENS)
            .with_temperature(0.0)
            .with_stop_sequences(&STOP_SEQUENCES);

        let output = self.agent.model.complete(&request).await?;
        debug!(step = self.trace.model_calls, output = %output, "Agent model output");

        match parse_react_output(&output) {
            Ok(AgentDecision::Finish(answer)) => {
                info!(steps = self.trace.model_calls, "Agent produced final answer");
                Ok(AgentState::Done(answer))
            }
            Ok(AgentDecision::Act(call)) => Ok(AgentState::AwaitingToolResult(call)),
            Err(e) => {
                warn!(error = %e, "Agent output could not be parsed; feeding error back");
                self.trace.steps.push(AgentStep {
                    tool: PARSE_ERROR_TOOL.to_string(),
                    tool_input: "Invalid or incomplete response".to_string(),
                    log: output,
                    observation: e.observation,
                });
                Ok(AgentState::Reasoning)
            }
        }
    }

    async fn act(&mut self, call: ToolInvocation) -> AgentState {
        let observation = match self.agent.tools.get(&call.tool) {
            Some(tool) => {
                info!(tool = %call.tool, input = %call.input, "Calling agent tool");
                match tool.call(&call.input).await {
                    Ok(output) => output,
                    Err(e) => {
                        warn!(tool = %call.tool, error = %e, "Agent tool failed");
                        format!("Tool error: {e}")
                    }
                }
            }
            None => format!(
                "{} is not a valid tool, try one of [{}].",
                call.tool,
                self.agent.tools.names().join(", ")
            ),
        };

        self.trace.steps.push(AgentStep {
            tool: call.tool,
            tool_input: call.input,
            log: call.log,
            observation,
        });
        AgentState::Reasoning
    }

    #[must_use]
    pub fn into_outcome(self) -> AgentOutcome {
        let reply = match &self.state {
            AgentState::Done(answer) => answer.clone(),
            _ => ITERATION_LIMIT_REPLY.to_string(),
        };
        AgentOutcome {
            reply,
            state: self.state,
            trace: self.trace,
        }
    }
}
