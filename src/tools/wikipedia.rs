use async_trait::async_trait;
use serde_json::Value;
use tracing::debug;

use super::{Tool, truncate_chars};
use crate::errors::HandlerError;

pub const WIKIPEDIA: &str = "wikipedia";

const TOP_K_RESULTS: usize = 3;
const MAX_OUTPUT_CHARS: usize = 4000;
const NO_RESULT: &str = "No good Wikipedia Search Result was found";

/// Wikipedia lookup: one `generator=search` query returning plain-text intros.
pub struct WikipediaTool {
    http: reqwest::Client,
    api_url: String,
}

impl WikipediaTool {
    #[must_use]
    pub fn new(http: reqwest::Client, lang: &str) -> Self {
        Self {
            http,
            api_url: format!("https://{lang}.wikipedia.org/w/api.php"),
        }
    }
}

#[async_trait]
impl Tool for WikipediaTool {
    fn name(&self) -> &str {
        WIKIPEDIA
    }

    fn description(&self) -> &str {
        "A wrapper around Wikipedia. Useful for when you need to answer general questions \
         about people, places, companies, facts, historical events, or other subjects. \
         Input should be a search query."
    }

    async fn call(&self, input: &str) -> Result<String, HandlerError> {
        debug!(query = input, "Wikipedia search");
        let limit = TOP_K_RESULTS.to_string();
        let response = self
            .http
            .get(&self.api_url)
            .query(&[
                ("action", "query"),
                ("format", "json"),
                ("formatversion", "2"),
                ("generator", "search"),
                ("gsrsearch", input),
                ("gsrlimit", limit.as_str()),
                ("prop", "extracts|info"),
                ("inprop", "url"),
                ("exintro", "1"),
                ("explaintext", "1"),
                ("redirects", "1"),
            ])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(HandlerError::Http(format!(
                "Wikipedia API returned error: {}",
                response.status()
            )));
        }

        let body: Value = response.json().await?;
        Ok(format_pages(&body))
    }
}

pub(crate) fn format_pages(data: &Value) -> String {
    let Some(pages) = data["query"]["pages"].as_array() else {
        return NO_RESULT.to_string();
    };

    let mut ordered: Vec<&Value> = pages.iter().collect();
    ordered.sort_by_key(|p| p["index"].as_u64().unwrap_or(u64::MAX));

    let summaries: Vec<String> = ordered
        .into_iter()
        .filter_map(|page| {
            let title = page["title"].as_str()?;
            let extract = page["extract"].as_str().filter(|s| !s.trim().is_empty())?;
            let url = page["fullurl"].as_str().map_or_else(
                || format!("https://wikipedia.org/wiki/{}", urlencoding::encode(title)),
                str::to_string,
            );
            Some(format!("Page: {title}\nURL: {url}\nSummary: {}", extract.trim()))
        })
        .take(TOP_K_RESULTS)
        .collect();

    if summaries.is_empty() {
        return NO_RESULT.to_string();
    }

    truncate_chars(&summaries.join("\n\n"), MAX_OUTPUT_CHARS)
}
