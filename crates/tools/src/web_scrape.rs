//! Page extraction via the Tavily extract API: full markdown content of
//! known URLs.

use crate::web_search::TAVILY_BASE_URL;
use async_trait::async_trait;
use deskpilot_core::error::ToolError;
use deskpilot_core::tool::{Tool, ToolOutcome};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
struct ExtractResponse {
    #[serde(default)]
    results: Vec<ExtractResult>,
    #[serde(default)]
    failed_results: Vec<FailedResult>,
}

#[derive(Debug, Deserialize)]
struct ExtractResult {
    url: String,
    #[serde(default)]
    raw_content: String,
}

#[derive(Debug, Deserialize)]
struct FailedResult {
    url: String,
    #[serde(default)]
    error: Option<String>,
}

fn format_extracts(response: &ExtractResponse) -> String {
    let mut out = String::new();
    for result in &response.results {
        out.push_str(&format!("## {}\n\n{}\n\n", result.url, result.raw_content));
    }
    for failed in &response.failed_results {
        out.push_str(&format!(
            "Could not extract {}: {}\n",
            failed.url,
            failed.error.as_deref().unwrap_or("unknown error")
        ));
    }
    if out.is_empty() {
        out.push_str("No content could be extracted.");
    }
    out.trim_end().to_string()
}

pub struct WebScrapeTool {
    api_key: Option<String>,
    base_url: String,
    client: reqwest::Client,
}

impl WebScrapeTool {
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
impl Tool for WebScrapeTool {
    fn name(&self) -> &str {
        "web_scrape"
    }

    fn description(&self) -> &str {
        "Extract the full content of one or more known URLs as markdown. \
         Use when the user provides links or asks to read a specific page."
    }

    fn parameters_schema(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "urls": {
                    "type": "array",
                    "items": { "type": "string" },
                    "description": "One or more URLs to extract content from"
                }
            },
            "required": ["urls"]
        })
    }

    async fn execute(&self, arguments: serde_json::Value) -> Result<ToolOutcome, ToolError> {
        // A single URL string is accepted alongside the documented array.
        let urls: Vec<String> = match &arguments["urls"] {
            serde_json::Value::String(url) => vec![url.clone()],
            serde_json::Value::Array(items) => items
                .iter()
                .filter_map(|v| v.as_str().map(str::to_string))
                .collect(),
            _ => {
                return Err(ToolError::InvalidArguments(
                    "Missing 'urls' argument".into(),
                ));
            }
        };
        if urls.is_empty() {
            return Err(ToolError::InvalidArguments(
                "'urls' must contain at least one URL".into(),
            ));
        }

        let Some(api_key) = &self.api_key else {
            return Ok(ToolOutcome::failure(
                "Web scraping is not configured: no search API key is set.",
            ));
        };

        tracing::debug!(count = urls.len(), "Extracting page content");

        let response = self
            .client
            .post(format!("{}/extract", self.base_url))
            .bearer_auth(api_key)
            .json(&serde_json::json!({
                "urls": urls,
                "extract_depth": "advanced",
                "format": "markdown",
            }))
            .send()
            .await;

        let response = match response {
            Ok(response) => response,
            Err(e) => {
                return Ok(ToolOutcome::failure(format!(
                    "Extraction request failed: {e}"
                )));
            }
        };

        if !response.status().is_success() {
            return Ok(ToolOutcome::failure(format!(
                "Extract API returned status {}",
                response.status()
            )));
        }

        match response.json::<ExtractResponse>().await {
            Ok(parsed) => Ok(ToolOutcome::ok(format_extracts(&parsed))),
            Err(e) => Ok(ToolOutcome::failure(format!(
                "Could not parse extraction results: {e}"
            ))),
        }
    }
}
