//! Web search via the Tavily search API.

use async_trait::async_trait;
use deskpilot_core::error::ToolError;
use deskpilot_core::tool::{Tool, ToolOutcome};
use serde::Deserialize;

pub(crate) const TAVILY_BASE_URL: &str = "https://api.tavily.com";
const DEFAULT_MAX_RESULTS: u32 = 4;

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    results: Vec<SearchResult>,
    #[serde(default)]
    answer: Option<String>,
}

#[derive(Debug, Deserialize)]
struct SearchResult {
    title: String,
    url: String,
    #[serde(default)]
    content: String,
    #[serde(default)]
    raw_content: Option<String>,
}

/// Render results as the readable block the model consumes, ending with
/// the source URLs it is instructed to cite.
fn format_results(response: &SearchResponse) -> String {
    let mut out = String::new();
    if let Some(answer) = &response.answer {
        out.push_str(&format!("Answer: {answer}\n\n"));
    }
    for (i, result) in response.results.iter().enumerate() {
        out.push_str(&format!(
            "{}. {} ({})\n{}\n",
            i + 1,
            result.title,
            result.url,
            result.content
        ));
        if let Some(raw) = &result.raw_content {
            out.push_str(&format!("{raw}\n"));
        }
        out.push('\n');
    }
    if response.results.is_empty() {
        out.push_str("No results found.");
    }
    out.trim_end().to_string()
}

pub struct InternetSearchTool {
    api_key: Option<String>,
    base_url: String,
    client: reqwest::Client,
}

impl InternetSearchTool {
    pub fn new(api_key: Option<String>) -> Self {
        Self::with_base_url(api_key, TAVILY_BASE_URL)
    }

    pub fn with_base_url(api_key: Option<String>, base_url: impl Into<String>) -> Self {
        Self {
            api_key,
            base_url: base_url.into(),
            client: reqwest::Client::new(),
        }
    }
}

#[async_trait]
impl Tool for InternetSearchTool {
    fn name(&self) -> &str {
        "internet_search"
    }

    fn description(&self) -> &str {
        "Search the web for current, public information: general knowledge, recent news, sports, weather, finance. \
         Use when the user asks to search, look up, or check something online."
    }

    fn parameters_schema(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "query": {
                    "type": "string",
                    "description": "The text to search for"
                },
                "max_results": {
                    "type": "integer",
                    "description": "Number of results to retrieve (default 4)"
                },
                "topic": {
                    "type": "string",
                    "enum": ["general", "news", "finance"],
                    "description": "Search domain: 'general' for broad searches, 'news' for recent events, 'finance' for markets"
                },
                "include_raw_content": {
                    "type": "boolean",
                    "description": "Include raw webpage text in results"
                }
            },
            "required": ["query"]
        })
    }

    async fn execute(&self, arguments: serde_json::Value) -> Result<ToolOutcome, ToolError> {
        let query = arguments["query"]
            .as_str()
            .ok_or_else(|| ToolError::InvalidArguments("Missing 'query' argument".into()))?;

        let Some(api_key) = &self.api_key else {
            return Ok(ToolOutcome::failure(
                "Web search is not configured: no search API key is set.",
            ));
        };

        let topic = arguments["topic"].as_str().unwrap_or("general");
        if !matches!(topic, "general" | "news" | "finance") {
            return Ok(ToolOutcome::failure(format!(
                "Invalid topic '{topic}'. Use 'general', 'news', or 'finance'."
            )));
        }
        let max_results = arguments["max_results"]
            .as_u64()
            .map(|n| n as u32)
            .unwrap_or(DEFAULT_MAX_RESULTS);
        let include_raw_content = arguments["include_raw_content"].as_bool().unwrap_or(false);

        tracing::debug!(query, topic, max_results, "Running web search");

        let response = self
            .client
            .post(format!("{}/search", self.base_url))
            .bearer_auth(api_key)
            .json(&serde_json::json!({
                "query": query,
                "max_results": max_results,
                "topic": topic,
                "include_raw_content": include_raw_content,
            }))
            .send()
            .await;

        let response = match response {
            Ok(response) => response,
            Err(e) => {
                return Ok(ToolOutcome::failure(format!(
                    "Web search request failed: {e}"
                )));
            }
        };

        if !response.status().is_success() {
            return Ok(ToolOutcome::failure(format!(
                "Search API returned status {}",
                response.status()
            )));
        }

        match response.json::<SearchResponse>().await {
            Ok(parsed) => Ok(ToolOutcome::ok(format_results(&parsed))),
            Err(e) => Ok(ToolOutcome::failure(format!(
                "Could not parse search results: {e}"
            ))),
        }
    }
}
