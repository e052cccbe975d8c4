//! Open a URL or a search query in the default browser. URLs go straight
//! through (with https prefixed for bare `www.` addresses); anything else
//! becomes a search-engine query.

use async_trait::async_trait;
use deskpilot_core::error::ToolError;
use deskpilot_core::tool::{Tool, ToolOutcome};
use std::process::Command;
use std::sync::Arc;

/// Hands a URL to the desktop's default browser.
pub trait BrowserOpener: Send + Sync {
    fn open(&self, url: &str) -> Result<(), String>;
}

/// `xdg-open` on Linux, `open` on macOS.
pub struct SystemBrowserOpener;

impl BrowserOpener for SystemBrowserOpener {
    fn open(&self, url: &str) -> Result<(), String> {
        let program = if cfg!(target_os = "macos") {
            "open"
        } else {
            "xdg-open"
        };
        Command::new(program)
            .arg(url)
            .spawn()
            .map(|_| ())
            .map_err(|e| format!("failed to run {program}: {e}"))
    }
}

pub struct OpenBrowserTool {
    opener: Arc<dyn BrowserOpener>,
}

impl OpenBrowserTool {
    pub fn new(opener: Arc<dyn BrowserOpener>) -> Self {
        Self { opener }
    }
}

#[async_trait]
impl Tool for OpenBrowserTool {
    fn name(&self) -> &str {
        "open_url_or_query"
    }

    fn description(&self) -> &str {
        "Open a URL directly in the default browser, or search the web for any other text."
    }

    fn parameters_schema(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "url_or_query": {
                    "type": "string",
                    "description": "A URL to open, or plain text to search for"
                }
            },
            "required": ["url_or_query"]
        })
    }

    async fn execute(&self, arguments: serde_json::Value) -> Result<ToolOutcome, ToolError> {
        let input = arguments["url_or_query"]
            .as_str()
            .ok_or_else(|| ToolError::InvalidArguments("Missing 'url_or_query' argument".into()))?
            .trim();

        let is_url = input.starts_with("http://")
            || input.starts_with("https://")
            || input.starts_with("www.");

        if is_url {
            let url = if input.starts_with("www.") {
                format!("https://{input}")
            } else {
                input.to_string()
            };
            return Ok(match self.opener.open(&url) {
                Ok(()) => ToolOutcome::ok(format!("Opened URL in browser: {url}")),
                Err(e) => ToolOutcome::failure(format!("An error occurred: {e}")),
            });
        }

        let search_url = format!(
            "https://www.google.com/search?q={}",
            urlencoding::encode(input)
        );
        Ok(match self.opener.open(&search_url) {
            Ok(()) => ToolOutcome::ok(format!("Opened web search for: {input}")),
            Err(e) => ToolOutcome::failure(format!("An error occurred: {e}")),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    struct RecordingOpener {
        opened: Mutex<Vec<String>>,
    }

    impl BrowserOpener for RecordingOpener {
        fn open(&self, url: &str) -> Result<(), String> {
            self.opened.lock().unwrap().push(url.to_string());
            Ok(())
        }
    }

    fn tool() -> (OpenBrowserTool, Arc<RecordingOpener>) {
        let opener = Arc::new(RecordingOpener {
            opened: Mutex::new(Vec::new()),
        });
        (OpenBrowserTool::new(opener.clone()), opener)
    }

    #[tokio::test]
    async fn full_url_passes_through() {
        let (tool, opener) = tool();
        let outcome = tool
            .execute(serde_json::json!({"url_or_query": "https://docs.rs/tokio"}))
            .await
            .unwrap();

        assert!(outcome.success);
        assert_eq!(opener.opened.lock().unwrap()[0], "https://docs.rs/tokio");
    }

    #[tokio::test]
    async fn www_address_gets_https_prefix() {
        let (tool, opener) = tool();
        tool.execute(serde_json::json!({"url_or_query": "www.example.com"}))
            .await
            .unwrap();

        assert_eq!(opener.opened.lock().unwrap()[0], "https://www.example.com");
    }

    #[tokio::test]
    async fn plain_text_becomes_encoded_search() {
        let (tool, opener) = tool();
        let outcome = tool
            .execute(serde_json::json!({"url_or_query": "rust zip crate docs"}))
            .await
            .unwrap();

        assert!(outcome.success);
        assert!(outcome.output.contains("web search for"));
        assert_eq!(
            opener.opened.lock().unwrap()[0],
            "https://www.google.com/search?q=rust%20zip%20crate%20docs"
        );
    }

    #[tokio::test]
    async fn surrounding_whitespace_is_trimmed() {
        let (tool, opener) = tool();
        tool.execute(serde_json::json!({"url_or_query": "  https://example.com  "}))
            .await
            .unwrap();

        assert_eq!(opener.opened.lock().unwrap()[0], "https://example.com");
    }
}
