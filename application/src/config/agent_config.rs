//! Agent run configuration.
//!
//! [`AgentConfig`] groups the static parameters of one agent: which model it
//! queries, how many steps it may take, which tools it sees, and which
//! permission scopes it holds.

use serde::{Deserialize, Serialize};
use warden_domain::LoopDetectorConfig;

/// Per-agent loop control parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentConfig {
    /// Name used in traces and logs.
    pub agent_name: String,
    pub model: String,
    /// Step ceiling. Zero ends every run immediately with `MaxSteps`.
    pub max_steps: usize,
    /// `max_tokens` sent with every completion request.
    pub max_tokens: u32,
    pub system_prompt: Option<String>,
    /// Permission scopes passed to every tool call.
    pub granted_permissions: Vec<String>,
    /// Tool categories offered to the model. `None` offers every tool.
    pub tool_categories: Option<Vec<String>>,
    pub loop_detection: LoopDetectorConfig,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            agent_name: "agent".to_string(),
            model: "gpt-4o".to_string(),
            max_steps: 10,
            max_tokens: 500,
            system_prompt: None,
            granted_permissions: Vec::new(),
            tool_categories: None,
            loop_detection: LoopDetectorConfig::default(),
        }
    }
}

impl AgentConfig {
    // ==================== Builder Methods ====================

    pub fn with_agent_name(mut self, name: impl Into<String>) -> Self {
        self.agent_name = name.into();
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_max_steps(mut self, max: usize) -> Self {
        self.max_steps = max;
        self
    }

    pub fn with_max_tokens(mut self, max: u32) -> Self {
        self.max_tokens = max;
        self
    }

    pub fn with_system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.system_prompt = Some(prompt.into());
        self
    }

    pub fn with_granted_permissions<I, S>(mut self, scopes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.granted_permissions = scopes.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_tool_categories<I, S>(mut self, categories: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tool_categories = Some(categories.into_iter().map(Into::into).collect());
        self
    }

    pub fn with_loop_detection(mut self, config: LoopDetectorConfig) -> Self {
        self.loop_detection = config;
        self
    }
}
