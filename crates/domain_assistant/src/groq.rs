//! Groq chat-completions client
//!
//! Talks to any OpenAI-compatible `chat/completions` endpoint. Provider
//! failures are mapped onto `PortError`:
//! - 401/403 -> `PortError::Unauthorized`
//! - 404 -> `PortError::NotFound`
//! - 429 -> `PortError::RateLimited`
//! - 5xx -> `PortError::ServiceUnavailable`
//! - Timeouts -> `PortError::Timeout`
//! - Other -> `PortError::Internal`

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, instrument, warn};

use core_kernel::{HealthCheckResult, HealthCheckable, PortError};

use crate::llm::{ChatMessage, ChatRole, LlmClient, LlmReply, ToolCall, ToolDefinition};

pub const DEFAULT_BASE_URL: &str = "https://api.groq.com/openai/v1";
pub const DEFAULT_MODEL: &str = "llama-3.3-70b-versatile";

const OPERATION: &str = "groq chat completion";

#[derive(Debug, Clone)]
pub struct GroqConfig {
    pub api_key: String,
    /// Base URL without the `/chat/completions` suffix
    pub base_url: String,
    pub model: String,
    pub temperature: f32,
    pub max_tokens: u32,
    pub timeout_secs: u64,
}

impl GroqConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            ..Default::default()
        }
    }
}

impl Default for GroqConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            base_url: DEFAULT_BASE_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            temperature: 0.7,
            max_tokens: 1000,
            timeout_secs: 30,
        }
    }
}

#[derive(Debug, Clone)]
pub struct GroqClient {
    config: GroqConfig,
    http: Client,
}

impl GroqClient {
    pub fn new(config: GroqConfig) -> Result<Self, PortError> {
        if config.api_key.trim().is_empty() {
            return Err(PortError::validation("Groq API key must not be empty"));
        }
        let http = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| PortError::Connection {
                message: "failed to build HTTP client".to_string(),
                source: Some(Box::new(e)),
            })?;
        Ok(Self { config, http })
    }

    pub fn model(&self) -> &str {
        &self.config.model
    }

    fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.config.base_url.trim_end_matches('/'))
    }

    fn request_body<'a>(&'a self, messages: &'a [ChatMessage], tools: &'a [ToolDefinition]) -> CompletionRequest<'a> {
        CompletionRequest {
            model: &self.config.model,
            messages: messages.iter().map(WireMessage::from).collect(),
            tools: tools.iter().map(WireTool::from).collect(),
            tool_choice: if tools.is_empty() { None } else { Some("auto") },
            temperature: self.config.temperature,
            max_tokens: self.config.max_tokens,
        }
    }

    fn map_transport_error(&self, error: reqwest::Error) -> PortError {
        if error.is_timeout() {
            PortError::Timeout {
                operation: OPERATION.to_string(),
                duration_ms: self.config.timeout_secs * 1000,
            }
        } else {
            PortError::Connection {
                message: format!("{} failed", OPERATION),
                source: Some(Box::new(error)),
            }
        }
    }
}

/// Maps a non-success provider status to a port error
pub(crate) fn map_status(status: StatusCode, retry_after: Option<u64>, body: &str) -> PortError {
    match status.as_u16() {
        401 | 403 => PortError::Unauthorized {
            message: "LLM provider rejected the API key".to_string(),
        },
        404 => PortError::not_found("LLM endpoint", status),
        429 => PortError::RateLimited {
            retry_after_secs: retry_after.unwrap_or(60),
        },
        500..=599 => PortError::unavailable("groq"),
        _ => PortError::internal(format!("LLM provider returned {}: {}", status, body)),
    }
}

#[async_trait]
impl LlmClient for GroqClient {
    #[instrument(skip(self, messages, tools), fields(model = %self.config.model, messages = messages.len()))]
    async fn chat(&self, messages: &[ChatMessage], tools: &[ToolDefinition]) -> Result<LlmReply, PortError> {
        let response = self
            .http
            .post(self.endpoint())
            .bearer_auth(&self.config.api_key)
            .json(&self.request_body(messages, tools))
            .send()
            .await
            .map_err(|e| self.map_transport_error(e))?;

        let status = response.status();
        if !status.is_success() {
            let retry_after = response
                .headers()
                .get(reqwest::header::RETRY_AFTER)
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.parse().ok());
            let body = response.text().await.unwrap_or_default();
            warn!(%status, "LLM provider returned an error");
            return Err(map_status(status, retry_after, &body));
        }

        let completion: CompletionResponse = response
            .json()
            .await
            .map_err(|e| PortError::Transformation {
                message: format!("invalid completion payload: {}", e),
            })?;
        let reply = completion.into_reply()?;
        debug!(tool_calls = reply.tool_calls.len(), "LLM replied");
        Ok(reply)
    }
}

#[async_trait]
impl HealthCheckable for GroqClient {
    /// Reports configuration only; probing the provider would spend tokens
    async fn health_check(&self) -> HealthCheckResult {
        HealthCheckResult::healthy(format!("groq:{}", self.config.model))
    }
}

// Wire format

#[derive(Debug, Serialize)]
struct CompletionRequest<'a> {
    model: &'a str,
    messages: Vec<WireMessage<'a>>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    tools: Vec<WireTool<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tool_choice: Option<&'static str>,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Debug, Serialize)]
struct WireMessage<'a> {
    role: ChatRole,
    content: Option<&'a str>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    tool_calls: Vec<WireToolCall>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tool_call_id: Option<&'a str>,
}

impl<'a> From<&'a ChatMessage> for WireMessage<'a> {
    fn from(message: &'a ChatMessage) -> Self {
        Self {
            role: message.role,
            content: message.content.as_deref(),
            tool_calls: message
                .tool_calls
                .iter()
                .map(|call| WireToolCall {
                    id: call.id.clone(),
                    kind: "function".to_string(),
                    function: WireFunctionCall {
                        name: call.name.clone(),
                        arguments: call.arguments.to_string(),
                    },
                })
                .collect(),
            tool_call_id: message.tool_call_id.as_deref(),
        }
    }
}

#[derive(Debug, Serialize)]
struct WireTool<'a> {
    #[serde(rename = "type")]
    kind: &'static str,
    function: WireFunction<'a>,
}

#[derive(Debug, Serialize)]
struct WireFunction<'a> {
    name: &'a str,
    description: &'a str,
    parameters: &'a Value,
}

impl<'a> From<&'a ToolDefinition> for WireTool<'a> {
    fn from(tool: &'a ToolDefinition) -> Self {
        Self {
            kind: "function",
            function: WireFunction {
                name: &tool.name,
                description: &tool.description,
                parameters: &tool.parameters,
            },
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct WireToolCall {
    id: String,
    #[serde(rename = "type", default = "function_kind")]
    kind: String,
    function: WireFunctionCall,
}

fn function_kind() -> String {
    "function".to_string()
}

#[derive(Debug, Serialize, Deserialize)]
struct WireFunctionCall {
    name: String,
    #[serde(default)]
    arguments: String,
}

#[derive(Debug, Deserialize)]
struct CompletionResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    content: Option<String>,
    #[serde(default)]
    tool_calls: Option<Vec<WireToolCall>>,
}

impl CompletionResponse {
    fn into_reply(self) -> Result<LlmReply, PortError> {
        let Some(choice) = self.choices.into_iter().next() else {
            return Ok(LlmReply::default());
        };
        let tool_calls = choice
            .message
            .tool_calls
            .unwrap_or_default()
            .into_iter()
            .map(|call| {
                let arguments = parse_arguments(&call.function.arguments)?;
                Ok(ToolCall {
                    id: call.id,
                    name: call.function.name,
                    arguments,
                })
            })
            .collect::<Result<Vec<_>, PortError>>()?;
        Ok(LlmReply {
            content: choice.message.content,
            tool_calls,
        })
    }
}

/// Tool arguments arrive as a JSON string; blank means no arguments
fn parse_arguments(raw: &str) -> Result<Value, PortError> {
    if raw.trim().is_empty() {
        return Ok(Value::Object(Default::default()));
    }
    serde_json::from_str(raw).map_err(|e| PortError::Transformation {
        message: format!("tool arguments are not valid JSON: {}", e),
    })
}
