//! Parser for ReAct-formatted model output.

use once_cell::sync::Lazy;
use regex::Regex;
use thiserror::Error;

pub const FINAL_ANSWER_ACTION: &str = "Final Answer:";

const MISSING_ACTION_AFTER_THOUGHT: &str = "Invalid Format: Missing 'Action:' after 'Thought:'";
const MISSING_ACTION_INPUT_AFTER_ACTION: &str =
    "Invalid Format: Missing 'Action Input:' after 'Action:'";
const FINAL_ANSWER_AND_ACTION: &str =
    "Parsing LLM output produced both a final answer and a parse-able action";
const EMPTY_FINAL_ANSWER: &str = "Invalid Format: 'Final Answer:' must be followed by the answer";

/// A tool call requested by the model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolInvocation {
    pub tool: String,
    pub input: String,
    /// Raw model output that produced this call, replayed in the scratchpad.
    pub log: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AgentDecision {
    Act(ToolInvocation),
    Finish(String),
}

/// Unparseable model output. `observation` is fed back to the model.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("Could not parse LLM output: `{text}`")]
pub struct ParseError {
    pub observation: String,
    pub text: String,
}

impl ParseError {
    fn new(observation: &str, text: &str) -> Self {
        Self {
            observation: observation.to_string(),
            text: text.to_string(),
        }
    }
}

static ACTION_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?s)Action\s*\d*\s*:[\s]*(.*?)[\s]*Action\s*\d*\s*Input\s*\d*\s*:[\s]*(.*)")
        .expect("static regex compile")
});
static ACTION_ONLY_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)Action\s*\d*\s*:[\s]*(.*?)").expect("static regex compile"));
static ACTION_INPUT_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?s)[\s]*Action\s*\d*\s*Input\s*\d*\s*:[\s]*(.*)").expect("static regex compile")
});

/// # Errors
///
/// Returns a `ParseError` when the text is neither a tool call nor a final answer.
pub fn parse_react_output(text: &str) -> Result<AgentDecision, ParseError> {
    let includes_answer = text.contains(FINAL_ANSWER_ACTION);

    if let Some(caps) = ACTION_RE.captures(text) {
        if includes_answer {
            return Err(ParseError::new(FINAL_ANSWER_AND_ACTION, text));
        }
        let tool = caps[1].trim().to_string();
        let input = caps[2].trim().trim_matches('"').to_string();
        return Ok(AgentDecision::Act(ToolInvocation {
            tool,
            input,
            log: text.to_string(),
        }));
    }

    if includes_answer {
        let answer = text
            .rsplit(FINAL_ANSWER_ACTION)
            .next()
            .unwrap_or_default()
            .trim();
        if answer.is_empty() {
            return Err(ParseError::new(EMPTY_FINAL_ANSWER, text));
        }
        return Ok(AgentDecision::Finish(answer.to_string()));
    }

    if !ACTION_ONLY_RE.is_match(text) {
        return Err(ParseError::new(MISSING_ACTION_AFTER_THOUGHT, text));
    }
    if !ACTION_INPUT_RE.is_match(text) {
        return Err(ParseError::new(MISSING_ACTION_INPUT_AFTER_ACTION, text));
    }
    Err(ParseError::new(
        &format!("Could not parse LLM output: `{text}`"),
        text,
    ))
}
