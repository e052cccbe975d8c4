//! Gemini provider — Google Generative Language API.
//!
//! Talks to the `generateContent` endpoint with function calling. The
//! gateway is stateless per invocation: the full turn history is converted
//! to API `contents` on every call, and the response is classified into the
//! distinct error kinds the dispatch loop surfaces (rate-limited, auth,
//! invalid request, unavailable).

use async_trait::async_trait;
use deskpilot_core::error::ProviderError;
use deskpilot_core::provider::{Provider, ProviderReply, ProviderRequest, ToolSpec, Usage};
use deskpilot_core::turn::{Turn, TurnToolCall};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::{debug, warn};

const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// A Gemini chat-completion provider.
pub struct GeminiProvider {
    base_url: String,
    api_key: String,
    client: reqwest::Client,
}

impl GeminiProvider {
    /// Create a new Gemini provider.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self::with_base_url(api_key, DEFAULT_BASE_URL)
    }

    /// Create a provider against a non-default endpoint (tests, proxies).
    pub fn with_base_url(api_key: impl Into<String>, base_url: impl Into<String>) -> Self {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(120))
            .build()
            .unwrap_or_default();

        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            client,
        }
    }

    /// Split the turn history into the system instruction and API contents.
    ///
    /// Gemini correlates function responses by name, not call id, so tool
    /// result turns are resolved against the requesting assistant turns.
    fn to_api_payload(turns: &[Turn]) -> (Option<ApiSystemInstruction>, Vec<ApiContent>) {
        let mut call_names: HashMap<&str, &str> = HashMap::new();
        for turn in turns {
            if let Turn::Assistant {
                requested_calls, ..
            } = turn
            {
                for call in requested_calls {
                    call_names.insert(call.id.as_str(), call.name.as_str());
                }
            }
        }

        let mut system = None;
        let mut contents: Vec<ApiContent> = Vec::new();

        for turn in turns {
            match turn {
                Turn::System { text } => {
                    system = Some(ApiSystemInstruction {
                        parts: vec![ApiPart::text(text)],
                    });
                }
                Turn::User { text } => contents.push(ApiContent {
                    role: "user".into(),
                    parts: vec![ApiPart::text(text)],
                }),
                Turn::Assistant {
                    text,
                    requested_calls,
                } => {
                    let mut parts = Vec::new();
                    if !text.is_empty() {
                        parts.push(ApiPart::text(text));
                    }
                    for call in requested_calls {
                        parts.push(ApiPart {
                            text: None,
                            function_call: Some(ApiFunctionCall {
                                name: call.name.clone(),
                                args: serde_json::from_str(&call.arguments)
                                    .unwrap_or(serde_json::Value::Null),
                            }),
                            function_response: None,
                        });
                    }
                    if parts.is_empty() {
                        parts.push(ApiPart::text(""));
                    }
                    contents.push(ApiContent {
                        role: "model".into(),
                        parts,
                    });
                }
                Turn::ToolResult { call_id, text } => {
                    let name = call_names.get(call_id.as_str()).copied().unwrap_or("tool");
                    contents.push(ApiContent {
                        role: "user".into(),
                        parts: vec![ApiPart {
                            text: None,
                            function_call: None,
                            function_response: Some(ApiFunctionResponse {
                                name: name.to_string(),
                                response: serde_json::json!({ "result": text }),
                            }),
                        }],
                    });
                }
            }
        }

        (system, contents)
    }

    fn to_api_tools(tools: &[ToolSpec]) -> Vec<ApiTool> {
        if tools.is_empty() {
            return Vec::new();
        }
        vec![ApiTool {
            function_declarations: tools
                .iter()
                .map(|t| ApiFunctionDeclaration {
                    name: t.name.clone(),
                    description: t.description.clone(),
                    parameters: t.parameters.clone(),
                })
                .collect(),
        }]
    }

    /// Map a non-200 status to the distinct gateway error kinds.
    fn classify_error(status: u16, body: &str) -> ProviderError {
        match status {
            429 => ProviderError::RateLimited {
                retry_after_secs: 5,
            },
            401 | 403 => ProviderError::AuthenticationFailed(
                "Invalid API key or insufficient permissions".into(),
            ),
            400 if body.to_lowercase().contains("api key not valid") => {
                ProviderError::AuthenticationFailed("API key not valid".into())
            }
            400 | 404 => ProviderError::InvalidRequest(body.to_string()),
            _ => ProviderError::Unavailable {
                status_code: status,
                message: body.to_string(),
            },
        }
    }
}

#[async_trait]
impl Provider for GeminiProvider {
    fn name(&self) -> &str {
        "gemini"
    }

    async fn complete(
        &self,
        request: ProviderRequest,
    ) -> std::result::Result<ProviderReply, ProviderError> {
        let url = format!(
            "{}/models/{}:generateContent",
            self.base_url, request.model
        );

        let (system_instruction, contents) = Self::to_api_payload(&request.turns);

        let mut generation_config = serde_json::json!({
            "temperature": request.temperature,
        });
        if let Some(max_tokens) = request.max_tokens {
            generation_config["maxOutputTokens"] = serde_json::json!(max_tokens);
        }

        let mut body = serde_json::json!({
            "contents": contents,
            "generationConfig": generation_config,
        });
        if let Some(system) = system_instruction {
            body["systemInstruction"] = serde_json::to_value(system)
                .map_err(|e| ProviderError::InvalidRequest(e.to_string()))?;
        }
        let tools = Self::to_api_tools(&request.tools);
        if !tools.is_empty() {
            body["tools"] = serde_json::to_value(tools)
                .map_err(|e| ProviderError::InvalidRequest(e.to_string()))?;
        }

        debug!(model = %request.model, turns = request.turns.len(), "Sending completion request");

        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    ProviderError::Timeout(e.to_string())
                } else {
                    ProviderError::Network(e.to_string())
                }
            })?;

        let status = response.status().as_u16();
        if status != 200 {
            let error_body = response.text().await.unwrap_or_default();
            warn!(status, body = %error_body, "Provider returned error");
            return Err(Self::classify_error(status, &error_body));
        }

        let api_response: ApiResponse =
            response.json().await.map_err(|e| ProviderError::Unavailable {
                status_code: 200,
                message: format!("Failed to parse response: {e}"),
            })?;

        let candidate = api_response
            .candidates
            .into_iter()
            .next()
            .ok_or_else(|| ProviderError::Unavailable {
                status_code: 200,
                message: "No candidates in response".into(),
            })?;

        let mut text = String::new();
        let mut requested_calls = Vec::new();
        for part in candidate.content.parts {
            if let Some(t) = part.text {
                text.push_str(&t);
            }
            if let Some(fc) = part.function_call {
                requested_calls.push(TurnToolCall {
                    id: format!("call_{}", uuid::Uuid::new_v4()),
                    name: fc.name,
                    arguments: fc.args.to_string(),
                });
            }
        }

        let usage = api_response.usage_metadata.map(|u| Usage {
            prompt_tokens: u.prompt_token_count,
            completion_tokens: u.candidates_token_count,
            total_tokens: u.total_token_count,
        });

        Ok(ProviderReply {
            text,
            requested_calls,
            usage,
            model: api_response
                .model_version
                .unwrap_or_else(|| request.model.clone()),
        })
    }

    async fn list_models(&self) -> std::result::Result<Vec<String>, ProviderError> {
        let url = format!("{}/models", self.base_url);
        let response = self
            .client
            .get(&url)
            .header("x-goog-api-key", &self.api_key)
            .send()
            .await
            .map_err(|e| ProviderError::Network(e.to_string()))?;

        if !response.status().is_success() {
            return Ok(Vec::new());
        }

        let body: serde_json::Value = response
            .json()
            .await
            .map_err(|e| ProviderError::Network(e.to_string()))?;

        let models = body["models"]
            .as_array()
            .map(|arr| {
                arr.iter()
                    .filter_map(|m| m["name"].as_str())
                    .map(|name| name.trim_start_matches("models/").to_string())
                    .collect()
            })
            .unwrap_or_default();

        Ok(models)
    }

    async fn health_check(&self) -> std::result::Result<bool, ProviderError> {
        let url = format!("{}/models", self.base_url);
        let response = self
            .client
            .get(&url)
            .header("x-goog-api-key", &self.api_key)
            .send()
            .await
            .map_err(|e| ProviderError::Network(e.to_string()))?;

        Ok(response.status().is_success())
    }
}

// --- Gemini API types (internal) ---

#[derive(Debug, Serialize, Deserialize)]
struct ApiSystemInstruction {
    parts: Vec<ApiPart>,
}

#[derive(Debug, Serialize, Deserialize)]
struct ApiContent {
    role: String,
    parts: Vec<ApiPart>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ApiPart {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    text: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    function_call: Option<ApiFunctionCall>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    function_response: Option<ApiFunctionResponse>,
}

impl ApiPart {
    fn text(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            function_call: None,
            function_response: None,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct ApiFunctionCall {
    name: String,
    #[serde(default)]
    args: serde_json::Value,
}

#[derive(Debug, Serialize, Deserialize)]
struct ApiFunctionResponse {
    name: String,
    response: serde_json::Value,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ApiTool {
    function_declarations: Vec<ApiFunctionDeclaration>,
}

#[derive(Debug, Serialize)]
struct ApiFunctionDeclaration {
    name: String,
    description: String,
    parameters: serde_json::Value,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ApiResponse {
    #[serde(default)]
    candidates: Vec<ApiCandidate>,
    #[serde(default)]
    usage_metadata: Option<ApiUsageMetadata>,
    #[serde(default)]
    model_version: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiCandidate {
    content: ApiCandidateContent,
}

#[derive(Debug, Deserialize)]
struct ApiCandidateContent {
    #[serde(default)]
    parts: Vec<ApiPart>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ApiUsageMetadata {
    #[serde(default)]
    prompt_token_count: u32,
    #[serde(default)]
    candidates_token_count: u32,
    #[serde(default)]
    total_token_count: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn directive_becomes_system_instruction() {
        let turns = vec![
            Turn::System {
                text: "You are DeskPilot.".into(),
            },
            Turn::user("hello"),
        ];
        let (system, contents) = GeminiProvider::to_api_payload(&turns);
        assert_eq!(
            system.unwrap().parts[0].text.as_deref(),
            Some("You are DeskPilot.")
        );
        assert_eq!(contents.len(), 1);
        assert_eq!(contents[0].role, "user");
    }

    #[test]
    fn assistant_calls_become_function_call_parts() {
        let turns = vec![Turn::assistant_with_calls(
            "",
            vec![TurnToolCall {
                id: "call_1".into(),
                name: "set_volume".into(),
                arguments: r#"{"action":"set_to","amount":55}"#.into(),
            }],
        )];
        let (_, contents) = GeminiProvider::to_api_payload(&turns);
        assert_eq!(contents[0].role, "model");
        let fc = contents[0].parts[0].function_call.as_ref().unwrap();
        assert_eq!(fc.name, "set_volume");
        assert_eq!(fc.args["amount"], 55);
    }

    #[test]
    fn tool_results_correlate_by_call_id() {
        let turns = vec![
            Turn::assistant_with_calls(
                "",
                vec![TurnToolCall {
                    id: "call_9".into(),
                    name: "create_folder".into(),
                    arguments: r#"{"name_of_folder":"X"}"#.into(),
                }],
            ),
            Turn::tool_result("call_9", "Folder created at ~/Desktop/X"),
        ];
        let (_, contents) = GeminiProvider::to_api_payload(&turns);
        let fr = contents[1].parts[0].function_response.as_ref().unwrap();
        assert_eq!(fr.name, "create_folder");
        assert_eq!(fr.response["result"], "Folder created at ~/Desktop/X");
    }

    #[test]
    fn tool_specs_grouped_under_one_declaration_block() {
        let specs = vec![
            ToolSpec {
                name: "open_app".into(),
                description: "Open an application".into(),
                parameters: serde_json::json!({"type": "object"}),
            },
            ToolSpec {
                name: "close_app".into(),
                description: "Close an application".into(),
                parameters: serde_json::json!({"type": "object"}),
            },
        ];
        let tools = GeminiProvider::to_api_tools(&specs);
        assert_eq!(tools.len(), 1);
        assert_eq!(tools[0].function_declarations.len(), 2);
    }

    #[test]
    fn parse_text_candidate() {
        let data = r#"{
            "candidates": [{"content": {"role": "model", "parts": [{"text": "Hello!"}]}}],
            "usageMetadata": {"promptTokenCount": 10, "candidatesTokenCount": 5, "totalTokenCount": 15},
            "modelVersion": "gemini-2.5-flash"
        }"#;
        let parsed: ApiResponse = serde_json::from_str(data).unwrap();
        assert_eq!(
            parsed.candidates[0].content.parts[0].text.as_deref(),
            Some("Hello!")
        );
        assert_eq!(parsed.usage_metadata.unwrap().total_token_count, 15);
        assert_eq!(parsed.model_version.as_deref(), Some("gemini-2.5-flash"));
    }

    #[test]
    fn parse_function_call_candidate() {
        let data = r#"{
            "candidates": [{"content": {"role": "model", "parts": [
                {"functionCall": {"name": "set_volume", "args": {"action": "set_to", "amount": 55}}}
            ]}}]
        }"#;
        let parsed: ApiResponse = serde_json::from_str(data).unwrap();
        let fc = parsed.candidates[0].content.parts[0]
            .function_call
            .as_ref()
            .unwrap();
        assert_eq!(fc.name, "set_volume");
        assert_eq!(fc.args["action"], "set_to");
    }

    #[test]
    fn classify_rate_limit() {
        let err = GeminiProvider::classify_error(429, "quota exceeded");
        assert!(matches!(err, ProviderError::RateLimited { .. }));
    }

    #[test]
    fn classify_bad_key_as_auth() {
        let err = GeminiProvider::classify_error(400, "API key not valid. Please pass a valid key.");
        assert!(matches!(err, ProviderError::AuthenticationFailed(_)));
        let err = GeminiProvider::classify_error(403, "forbidden");
        assert!(matches!(err, ProviderError::AuthenticationFailed(_)));
    }

    #[test]
    fn classify_bad_request_and_server_error() {
        let err = GeminiProvider::classify_error(400, "malformed contents");
        assert!(matches!(err, ProviderError::InvalidRequest(_)));
        let err = GeminiProvider::classify_error(503, "overloaded");
        assert!(matches!(err, ProviderError::Unavailable { status_code: 503, .. }));
    }
}
