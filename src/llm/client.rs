use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use super::oracle::{Oracle, OracleRequest, ToolSpec};
use crate::error::OracleError;

const DEFAULT_MODEL: &str = "claude-sonnet-4-20250514";
const DEFAULT_BASE_URL: &str = "https://api.anthropic.com";

/// Configuration for the Anthropic API client
#[derive(Debug, Clone)]
pub struct AnthropicConfig {
    /// API key (from ANTHROPIC_API_KEY env var)
    pub api_key: String,
    /// Model to use (e.g., "claude-sonnet-4-20250514")
    pub model: String,
    /// API root, without the `/v1/messages` path
    pub base_url: String,
    /// Temperature (0-1, lower = more deterministic)
    pub temperature: f64,
    /// Maximum tokens in response
    pub max_tokens: u32,
    /// HTTP-level timeout for one request
    pub request_timeout: Duration,
}

impl AnthropicConfig {
    /// Create config from environment variables
    ///
    /// `ANTHROPIC_API_KEY` is required; `ANTHROPIC_MODEL` and
    /// `ANTHROPIC_BASE_URL` override the defaults.
    pub fn from_env() -> Result<Self, OracleError> {
        let api_key = std::env::var("ANTHROPIC_API_KEY").map_err(|_| {
            OracleError::Config("ANTHROPIC_API_KEY environment variable not set".to_string())
        })?;

        let mut config = Self::new(api_key, DEFAULT_MODEL.to_string());
        if let Ok(model) = std::env::var("ANTHROPIC_MODEL") {
            config.model = model;
        }
        if let Ok(base_url) = std::env::var("ANTHROPIC_BASE_URL") {
            config.base_url = base_url;
        }
        Ok(config)
    }

    /// Create with custom settings
    pub fn new(api_key: String, model: String) -> Self {
        Self {
            api_key,
            model,
            base_url: DEFAULT_BASE_URL.to_string(),
            temperature: 0.0,
            max_tokens: 8192,
            request_timeout: Duration::from_secs(180),
        }
    }

    /// Same credentials, different model
    pub fn with_model(&self, model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            ..self.clone()
        }
    }
}

/// Anthropic API client
pub struct AnthropicClient {
    client: Client,
    config: AnthropicConfig,
}

impl AnthropicClient {
    pub fn new(config: AnthropicConfig) -> Result<Self, OracleError> {
        let client = Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| OracleError::Config(format!("Failed to build HTTP client: {}", e)))?;
        Ok(Self { client, config })
    }

    pub fn model(&self) -> &str {
        &self.config.model
    }

    /// Send a message with a single forced tool and return the tool input
    pub async fn send_with_tool(
        &self,
        system: &str,
        user: &str,
        tool: &ToolSpec,
    ) -> Result<Value, OracleError> {
        let request = AnthropicToolRequest {
            model: self.config.model.clone(),
            max_tokens: self.config.max_tokens,
            temperature: Some(self.config.temperature),
            system: Some(system.to_string()),
            messages: vec![Message {
                role: "user".to_string(),
                content: user.to_string(),
            }],
            tools: vec![Tool {
                name: tool.name.to_string(),
                description: tool.description.to_string(),
                input_schema: tool.input_schema.clone(),
            }],
            tool_choice: Some(ToolChoice {
                choice_type: "tool".to_string(),
                name: tool.name.to_string(),
            }),
        };

        let url = format!("{}/v1/messages", self.config.base_url.trim_end_matches('/'));
        let response = self
            .client
            .post(url)
            .header("x-api-key", &self.config.api_key)
            .header("anthropic-version", "2023-06-01")
            .header("content-type", "application/json")
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(OracleError::Api { status, body });
        }

        let response: AnthropicResponse = response.json().await?;
        debug!(
            "Oracle {} stop_reason={:?}, {} content blocks",
            self.config.model,
            response.stop_reason,
            response.content.len()
        );

        tool_input(response, tool.name)
    }
}

/// Find the tool_use block for `tool_name`
fn tool_input(response: AnthropicResponse, tool_name: &str) -> Result<Value, OracleError> {
    response
        .content
        .into_iter()
        .find(|c| c.content_type == "tool_use" && c.name.as_deref() == Some(tool_name))
        .map(|c| c.input.unwrap_or(Value::Null))
        .ok_or(OracleError::MissingStructuredOutput)
}

#[async_trait]
impl Oracle for AnthropicClient {
    async fn extract_structured(&self, request: OracleRequest<'_>) -> Result<Value, OracleError> {
        self.send_with_tool(request.system, request.document, request.tool)
            .await
    }

    fn name(&self) -> &str {
        &self.config.model
    }
}

#[derive(Debug, Serialize)]
struct AnthropicToolRequest {
    model: String,
    max_tokens: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    system: Option<String>,
    messages: Vec<Message>,
    tools: Vec<Tool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tool_choice: Option<ToolChoice>,
}

#[derive(Debug, Serialize)]
struct Message {
    role: String,
    content: String,
}

#[derive(Debug, Serialize)]
struct Tool {
    name: String,
    description: String,
    input_schema: Value,
}

#[derive(Debug, Serialize)]
struct ToolChoice {
    #[serde(rename = "type")]
    choice_type: String,
    name: String,
}

#[derive(Debug, Deserialize)]
struct AnthropicResponse {
    content: Vec<ContentBlock>,
    #[serde(default)]
    stop_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ContentBlock {
    #[serde(rename = "type")]
    content_type: String,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    input: Option<Value>,
}
