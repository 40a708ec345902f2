//! `duckduckgo_search` tool backed by the DuckDuckGo Instant Answer API.
//!
//! The API needs no key and returns abstracts, direct answers, definitions
//! and related topics rather than a full result listing.

use async_trait::async_trait;
use serde_json::Value;
use tracing::debug;

use super::{Tool, truncate_chars};
use crate::errors::HandlerError;

pub const WEB_SEARCH: &str = "duckduckgo_search";

const DDG_API_URL: &str = "https://api.duckduckgo.com/";
const MAX_RELATED_TOPICS: usize = 10;
const MAX_OUTPUT_CHARS: usize = 4000;
const NO_RESULT: &str = "No good DuckDuckGo Search Result was found";

pub struct DuckDuckGoSearchTool {
    http: reqwest::Client,
}

impl DuckDuckGoSearchTool {
    #[must_use]
    pub fn new(http: reqwest::Client) -> Self {
        Self { http }
    }
}

#[async_trait]
impl Tool for DuckDuckGoSearchTool {
    fn name(&self) -> &str {
        WEB_SEARCH
    }

    fn description(&self) -> &str {
        "A wrapper around DuckDuckGo Search. Useful for when you need to answer questions \
         about current events. Input should be a search query."
    }

    async fn call(&self, input: &str) -> Result<String, HandlerError> {
        debug!(query = input, "DuckDuckGo search");
        let response = self
            .http
            .get(DDG_API_URL)
            .query(&[
                ("q", input),
                ("format", "json"),
                ("no_html", "1"),
                ("skip_disambig", "1"),
            ])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(HandlerError::Http(format!(
                "Search API returned error: {}",
                response.status()
            )));
        }

        let body: Value = response.json().await?;
        Ok(format_search_results(&body))
    }
}

pub(crate) fn format_search_results(data: &Value) -> String {
    let mut sections: Vec<String> = Vec::new();

    if let Some(abstract_text) = data["AbstractText"].as_str()
        && !abstract_text.is_empty()
    {
        let source = data["AbstractSource"].as_str().unwrap_or("Unknown");
        let url = data["AbstractURL"].as_str().unwrap_or("");
        sections.push(format!("{abstract_text}\nSource: {source} {url}"));
    }

    if let Some(answer) = data["Answer"].as_str()
        && !answer.is_empty()
    {
        sections.push(format!("Answer: {answer}"));
    }

    if let Some(definition) = data["Definition"].as_str()
        && !definition.is_empty()
    {
        let url = data["DefinitionURL"].as_str().unwrap_or("");
        sections.push(format!("Definition: {definition} {url}"));
    }

    if let Some(topics) = data["RelatedTopics"].as_array() {
        let topic_lines: Vec<String> = topics
            .iter()
            .filter_map(|t| {
                let text = t["Text"].as_str().filter(|s| !s.is_empty())?;
                let url = t["FirstURL"].as_str().unwrap_or("");
                Some(format!("- {text} ({url})"))
            })
            .take(MAX_RELATED_TOPICS)
            .collect();

        if !topic_lines.is_empty() {
            sections.push(format!("Related:\n{}", topic_lines.join("\n")));
        }
    }

    if sections.is_empty() {
        return NO_RESULT.to_string();
    }

    truncate_chars(&sections.join("\n\n"), MAX_OUTPUT_CHARS)
}
