//! OpenAI-compatible chat-completions transport
//!
//! Works with any endpoint that speaks the `/chat/completions` dialect with
//! function tools (OpenAI, OpenRouter, vLLM, Ollama, ...).

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::{debug, info, warn};
use warden_application::{CompletionRequest, CompletionTransport, TransportError};
use warden_domain::core::string::truncate;
use warden_domain::{CompletionResponse, Message, TokenUsage, ToolCall, ToolSchema};

use super::retry::{RetryPolicy, RetryableFailure, server_wait};
use crate::config::FileTransportConfig;

const COMPLETIONS_PATH: &str = "/chat/completions";
const MAX_ERROR_BODY: usize = 500;

/// Chat-completions client with retry on 429, 503 and timeouts
#[derive(Clone)]
pub struct OpenAiTransport {
    client: reqwest::Client,
    url: String,
    api_key: String,
    policy: RetryPolicy,
}

impl std::fmt::Debug for OpenAiTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenAiTransport")
            .field("url", &self.url)
            .field("policy", &self.policy)
            .finish_non_exhaustive()
    }
}

impl OpenAiTransport {
    pub fn new(
        base_url: &str,
        api_key: impl Into<String>,
        timeout: std::time::Duration,
        policy: RetryPolicy,
    ) -> Result<Self, TransportError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| TransportError::Connection(e.to_string()))?;

        Ok(Self {
            client,
            url: format!("{}{}", base_url.trim_end_matches('/'), COMPLETIONS_PATH),
            api_key: api_key.into(),
            policy,
        })
    }

    /// Build from config, reading the API key from `api_key_env`.
    pub fn from_config(config: &FileTransportConfig) -> Result<Self, TransportError> {
        let api_key = std::env::var(&config.api_key_env)
            .ok()
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| TransportError::MissingApiKey(config.api_key_env.clone()))?;

        Self::new(
            &config.base_url,
            api_key,
            config.timeout(),
            RetryPolicy::from_config(config),
        )
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    async fn attempt(&self, body: &Value) -> Result<CompletionResponse, AttemptError> {
        let response = self
            .client
            .post(&self.url)
            .bearer_auth(&self.api_key)
            .json(body)
            .send()
            .await
            .map_err(AttemptError::from_reqwest)?;

        let status = response.status();
        let retry_after = response
            .headers()
            .get(reqwest::header::RETRY_AFTER)
            .and_then(|h| h.to_str().ok())
            .map(str::to_string);
        let text = response.text().await.map_err(AttemptError::from_reqwest)?;

        if status.is_success() {
            return parse_response(&text).map_err(AttemptError::Fatal);
        }

        match status {
            StatusCode::TOO_MANY_REQUESTS => {
                Err(AttemptError::Retry(RetryableFailure::RateLimited))
            }
            StatusCode::SERVICE_UNAVAILABLE => {
                Err(AttemptError::Retry(RetryableFailure::Unavailable {
                    server_wait: server_wait(&text, retry_after.as_deref()),
                }))
            }
            _ => Err(AttemptError::Fatal(TransportError::Http {
                status: status.as_u16(),
                message: truncate(&text, MAX_ERROR_BODY),
            })),
        }
    }
}

#[async_trait]
impl CompletionTransport for OpenAiTransport {
    async fn complete(
        &self,
        request: CompletionRequest,
    ) -> Result<CompletionResponse, TransportError> {
        let body = request_body(&request);

        info!(
            model = %request.model,
            messages = request.messages.len(),
            tools = request.tools.len(),
            "Sending completion request"
        );

        let mut attempt = 0;
        loop {
            match self.attempt(&body).await {
                Ok(response) => {
                    debug!(
                        model = %response.model,
                        tool_calls = response.tool_calls.len(),
                        "Received completion"
                    );
                    return Ok(response);
                }
                Err(AttemptError::Fatal(e)) => return Err(e),
                Err(AttemptError::Retry(failure)) => {
                    if !self.policy.should_retry(attempt) {
                        return Err(failure.exhausted(attempt + 1));
                    }
                    let delay = self.policy.delay(&failure, attempt);
                    warn!(
                        attempt = attempt + 1,
                        max_attempts = self.policy.max_attempts,
                        delay_ms = delay.as_millis() as u64,
                        failure = ?failure,
                        "Completion attempt failed, retrying"
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
            }
        }
    }
}

enum AttemptError {
    Retry(RetryableFailure),
    Fatal(TransportError),
}

impl AttemptError {
    fn from_reqwest(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            Self::Retry(RetryableFailure::Timeout)
        } else {
            Self::Fatal(TransportError::Connection(e.to_string()))
        }
    }
}

// ==================== Wire format ====================

fn wire_message(message: &Message) -> Value {
    let mut wire = json!({
        "role": message.role,
        "content": message.content,
    });

    if !message.tool_calls.is_empty() {
        wire["tool_calls"] = message
            .tool_calls
            .iter()
            .map(|call| {
                json!({
                    "id": call.id,
                    "type": "function",
                    "function": {"name": call.name, "arguments": call.arguments},
                })
            })
            .collect();
    }
    if let Some(id) = &message.tool_call_id {
        wire["tool_call_id"] = json!(id);
    }
    if let Some(name) = &message.name {
        wire["name"] = json!(name);
    }

    wire
}

fn wire_tool(schema: &ToolSchema) -> Value {
    json!({
        "type": "function",
        "function": {
            "name": schema.name,
            "description": schema.description,
            "parameters": schema.parameters,
        },
    })
}

/// JSON body for one request. `tools` and `tool_choice` are omitted when no
/// tools are offered, whatever the requested choice.
pub fn request_body(request: &CompletionRequest) -> Value {
    let mut body = json!({
        "model": request.model,
        "messages": request.messages.iter().map(wire_message).collect::<Vec<_>>(),
        "max_tokens": request.max_tokens,
    });

    if !request.tools.is_empty() {
        body["tools"] = request.tools.iter().map(wire_tool).collect();
        body["tool_choice"] = json!(request.tool_choice);
    }

    body
}

#[derive(Deserialize)]
struct WireResponse {
    #[serde(default)]
    model: String,
    #[serde(default)]
    choices: Vec<WireChoice>,
    usage: Option<WireUsage>,
}

#[derive(Deserialize)]
struct WireChoice {
    message: Option<WireMessage>,
}

#[derive(Deserialize)]
struct WireMessage {
    content: Option<String>,
    // Some proxies send `"tool_calls": null` on plain answers
    #[serde(default)]
    tool_calls: Option<Vec<WireToolCall>>,
}

#[derive(Deserialize)]
struct WireToolCall {
    #[serde(default)]
    id: String,
    function: WireFunction,
}

#[derive(Deserialize)]
struct WireFunction {
    name: String,
    #[serde(default)]
    arguments: Value,
}

#[derive(Deserialize)]
struct WireUsage {
    #[serde(default)]
    prompt_tokens: u64,
    #[serde(default)]
    completion_tokens: u64,
}

/// Parse a successful response body.
pub fn parse_response(body: &str) -> Result<CompletionResponse, TransportError> {
    let wire: WireResponse = serde_json::from_str(body)
        .map_err(|e| TransportError::InvalidResponse(format!("malformed JSON: {}", e)))?;

    let message = wire
        .choices
        .into_iter()
        .next()
        .and_then(|choice| choice.message)
        .ok_or_else(|| {
            TransportError::InvalidResponse("missing choices[0].message".to_string())
        })?;

    let tool_calls = message
        .tool_calls
        .unwrap_or_default()
        .into_iter()
        .enumerate()
        .map(|(i, call)| {
            let arguments = match call.function.arguments {
                Value::String(raw) => raw,
                Value::Null => String::new(),
                other => other.to_string(),
            };
            let id = if call.id.is_empty() {
                format!("call_{}", i)
            } else {
                call.id
            };
            ToolCall::new(id, call.function.name, arguments)
        })
        .collect();

    let mut response =
        CompletionResponse::from_tool_calls(message.content.unwrap_or_default(), tool_calls)
            .with_model(wire.model);
    response.usage = wire
        .usage
        .map(|u| TokenUsage::new(u.prompt_tokens, u.completion_tokens));

    Ok(response)
}
