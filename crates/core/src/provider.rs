//! Provider trait — the model gateway boundary.
//!
//! A Provider knows how to send the full turn history plus the advertised
//! tool catalogue to a chat-completion model and get one assistant turn
//! back. Each call is stateless: all conversational memory lives in the
//! session, never in the gateway.

use crate::error::ProviderError;
use crate::turn::{Turn, TurnToolCall};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// One gateway invocation: full history + tool catalogue.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderRequest {
    /// The model to use (e.g., "gemini-2.5-flash")
    pub model: String,

    /// The full conversation so far, system directive first
    pub turns: Vec<Turn>,

    /// Temperature (0.0 = deterministic)
    #[serde(default = "default_temperature")]
    pub temperature: f32,

    /// Maximum tokens to generate
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,

    /// Tools the model may request
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tools: Vec<ToolSpec>,
}

fn default_temperature() -> f32 {
    0.0
}

/// A tool advertisement sent to the model.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolSpec {
    /// The tool name
    pub name: String,

    /// Description of what the tool does (natural language, for the model)
    pub description: String,

    /// JSON Schema describing the tool's arguments
    pub parameters: serde_json::Value,
}

/// A complete response from a provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderReply {
    /// The generated assistant turn. Empty `requested_calls` means this is
    /// the round's terminal answer.
    pub text: String,

    /// Tool calls the model wants executed, in the order it listed them.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub requested_calls: Vec<TurnToolCall>,

    /// Token usage statistics
    pub usage: Option<Usage>,

    /// Which model actually responded
    pub model: String,
}

impl ProviderReply {
    /// Fold this reply into an assistant turn for the session log.
    pub fn into_turn(self) -> Turn {
        Turn::assistant_with_calls(self.text, self.requested_calls)
    }
}

/// Token usage information.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Usage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub total_tokens: u32,
}

/// The model gateway trait.
///
/// The dispatch loop calls `complete()` without knowing which backend is
/// configured. Failure kinds are surfaced distinctly (see [`ProviderError`]);
/// the loop never retries on its own.
#[async_trait]
pub trait Provider: Send + Sync {
    /// A human-readable name for this provider (e.g., "gemini").
    fn name(&self) -> &str;

    /// Send a request and get a complete response.
    async fn complete(
        &self,
        request: ProviderRequest,
    ) -> std::result::Result<ProviderReply, ProviderError>;

    /// List available models for this provider.
    async fn list_models(&self) -> std::result::Result<Vec<String>, ProviderError> {
        Ok(Vec::new())
    }

    /// Health check — can we reach the provider?
    async fn health_check(&self) -> std::result::Result<bool, ProviderError> {
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reply_without_calls_is_terminal_turn() {
        let reply = ProviderReply {
            text: "Volume is now 55%.".into(),
            requested_calls: vec![],
            usage: None,
            model: "test-model".into(),
        };
        match reply.into_turn() {
            Turn::Assistant {
                text,
                requested_calls,
            } => {
                assert_eq!(text, "Volume is now 55%.");
                assert!(requested_calls.is_empty());
            }
            other => panic!("expected assistant turn, got {other:?}"),
        }
    }

    #[test]
    fn tool_spec_serialization() {
        let spec = ToolSpec {
            name: "set_volume".into(),
            description: "Adjust or read the system volume".into(),
            parameters: serde_json::json!({
                "type": "object",
                "properties": {
                    "action": { "type": "string", "enum": ["set_to", "increase_by", "decrease_by", "current"] },
                    "amount": { "type": "integer" }
                },
                "required": ["action"]
            }),
        };
        let json = serde_json::to_string(&spec).unwrap();
        assert!(json.contains("set_volume"));
        assert!(json.contains("increase_by"));
    }

    #[test]
    fn request_defaults_to_deterministic() {
        let req: ProviderRequest = serde_json::from_str(
            r#"{"model":"gemini-2.5-flash","turns":[]}"#,
        )
        .unwrap();
        assert_eq!(req.temperature, 0.0);
        assert!(req.max_tokens.is_none());
        assert!(req.tools.is_empty());
    }
}
