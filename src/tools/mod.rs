//! Tools available to the conversation agent.

pub mod web_search;
pub mod wikipedia;

use async_trait::async_trait;

use crate::errors::HandlerError;

pub use web_search::DuckDuckGoSearchTool;
pub use wikipedia::WikipediaTool;

/// A single-input tool the agent can call by name.
#[async_trait]
pub trait Tool: Send + Sync {
    fn name(&self) -> &str;

    fn description(&self) -> &str;

    /// Runs the tool. The returned text becomes the agent's observation.
    async fn call(&self, input: &str) -> Result<String, HandlerError>;
}

/// Fixed, ordered set of tools offered to the agent.
#[derive(Default)]
pub struct Toolset {
    tools: Vec<Box<dyn Tool>>,
}

impl Toolset {
    #[must_use]
    pub fn new(tools: Vec<Box<dyn Tool>>) -> Self {
        Self { tools }
    }

    /// Web search and Wikipedia lookup sharing one HTTP client.
    #[must_use]
    pub fn standard(http: reqwest::Client, wikipedia_lang: &str) -> Self {
        Self::new(vec![
            Box::new(DuckDuckGoSearchTool::new(http.clone())),
            Box::new(WikipediaTool::new(http, wikipedia_lang)),
        ])
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&dyn Tool> {
        self.tools
            .iter()
            .find(|t| t.name() == name)
            .map(AsRef::as_ref)
    }

    #[must_use]
    pub fn names(&self) -> Vec<&str> {
        self.tools.iter().map(|t| t.name()).collect()
    }

    /// One `name: description` line per tool.
    #[must_use]
    pub fn render_descriptions(&self) -> String {
        self.tools
            .iter()
            .map(|t| format!("{}: {}", t.name(), t.description()))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// Caps `text` at `max_chars` characters.
pub(crate) fn truncate_chars(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => text[..idx].to_string(),
        None => text.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn standard_toolset_lists_search_then_wikipedia() {
        let tools = Toolset::standard(reqwest::Client::new(), "ja");
        assert_eq!(tools.names(), vec!["duckduckgo_search", "wikipedia"]);
        assert!(tools.get("wikipedia").is_some());
        assert!(tools.get("calculator").is_none());

        let rendered = tools.render_descriptions();
        assert!(rendered.starts_with("duckduckgo_search: "));
        assert!(rendered.contains("\nwikipedia: "));
    }

    #[test]
    fn truncate_chars_respects_multibyte_boundaries() {
        assert_eq!(truncate_chars("日本語テキスト", 3), "日本語");
        assert_eq!(truncate_chars("abc", 10), "abc");
    }
}
