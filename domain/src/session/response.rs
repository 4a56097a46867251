//! Completion response types.
//!
//! A completion either carries text (a final-answer candidate) or a list of
//! tool calls, optionally with reasoning text alongside.

use serde::{Deserialize, Serialize};

use crate::tool::entities::ToolCall;

/// Token counts reported by the completion endpoint.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenUsage {
    #[serde(default)]
    pub prompt_tokens: u64,
    #[serde(default)]
    pub completion_tokens: u64,
}

impl TokenUsage {
    pub fn new(prompt_tokens: u64, completion_tokens: u64) -> Self {
        Self {
            prompt_tokens,
            completion_tokens,
        }
    }

    pub fn total(&self) -> u64 {
        self.prompt_tokens + self.completion_tokens
    }
}

/// One model turn.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CompletionResponse {
    pub text: String,
    #[serde(default)]
    pub tool_calls: Vec<ToolCall>,
    /// Absent when the endpoint did not report usage.
    #[serde(default)]
    pub usage: Option<TokenUsage>,
    /// Model that actually served the request.
    #[serde(default)]
    pub model: String,
}

impl CompletionResponse {
    pub fn from_text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Default::default()
        }
    }

    pub fn from_tool_calls(text: impl Into<String>, tool_calls: Vec<ToolCall>) -> Self {
        Self {
            text: text.into(),
            tool_calls,
            ..Default::default()
        }
    }

    pub fn with_usage(mut self, prompt_tokens: u64, completion_tokens: u64) -> Self {
        self.usage = Some(TokenUsage::new(prompt_tokens, completion_tokens));
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn has_tool_calls(&self) -> bool {
        !self.tool_calls.is_empty()
    }

    /// Usage with missing counts read as zero.
    pub fn usage_or_zero(&self) -> TokenUsage {
        self.usage.unwrap_or_default()
    }
}
