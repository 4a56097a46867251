//! Completion transport port
//!
//! Defines the interface for querying a chat-completion endpoint that
//! supports tool calling.

use async_trait::async_trait;
use serde::Serialize;
use thiserror::Error;
use warden_domain::{CompletionResponse, Message, ToolSchema};

/// Errors that can occur while talking to the completion endpoint
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TransportError {
    #[error("Connection error: {0}")]
    Connection(String),

    #[error("Rate limited by completion endpoint after {attempts} attempts")]
    RateLimited { attempts: u32 },

    #[error("Completion endpoint unavailable after {attempts} attempts")]
    Unavailable { attempts: u32 },

    #[error("Request failed with status {status}: {message}")]
    Http { status: u16, message: String },

    #[error("Timeout after {attempts} attempts")]
    Timeout { attempts: u32 },

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Missing API key: environment variable {0} is not set")]
    MissingApiKey(String),

    #[error("Other error: {0}")]
    Other(String),
}

/// How the model may use the offered tools.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ToolChoice {
    #[default]
    Auto,
    None,
    Required,
}

/// One completion request.
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionRequest {
    pub model: String,
    pub messages: Vec<Message>,
    pub tools: Vec<ToolSchema>,
    pub tool_choice: ToolChoice,
    pub max_tokens: u32,
}

impl CompletionRequest {
    pub fn new(model: impl Into<String>, messages: Vec<Message>) -> Self {
        Self {
            model: model.into(),
            messages,
            tools: Vec::new(),
            tool_choice: ToolChoice::Auto,
            max_tokens: 500,
        }
    }

    pub fn with_tools(mut self, tools: Vec<ToolSchema>) -> Self {
        self.tools = tools;
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }
}

/// Gateway to a chat-completion endpoint
///
/// This port defines how the agent loop queries the model.
/// Implementations (adapters) live in the infrastructure layer and own
/// their retry policy and request timeout.
#[async_trait]
pub trait CompletionTransport: Send + Sync {
    async fn complete(
        &self,
        request: CompletionRequest,
    ) -> Result<CompletionResponse, TransportError>;
}
