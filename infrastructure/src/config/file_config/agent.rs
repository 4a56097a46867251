//! Agent configuration from TOML (`[agent]` section)

use serde::{Deserialize, Serialize};
use warden_application::AgentConfig;
use warden_domain::LoopDetectorConfig;

use crate::config::validation::{ConfigIssue, ConfigValidationError};

/// Raw agent configuration from TOML
///
/// # Example
///
/// ```toml
/// [agent]
/// model = "gpt-4o"
/// max_steps = 10
/// max_tokens = 500
/// agent_name = "agent"
/// granted_permissions = ["filesystem:read"]
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileAgentConfig {
    /// Model id sent to the completion endpoint
    pub model: String,
    /// Step ceiling per run
    pub max_steps: usize,
    /// `max_tokens` per completion
    pub max_tokens: u32,
    /// Name used in traces and logs
    pub agent_name: String,
    pub system_prompt: Option<String>,
    /// Permission scopes granted to the agent
    pub granted_permissions: Vec<String>,
}

impl Default for FileAgentConfig {
    fn default() -> Self {
        let defaults = AgentConfig::default();
        Self {
            model: defaults.model,
            max_steps: defaults.max_steps,
            max_tokens: defaults.max_tokens,
            agent_name: defaults.agent_name,
            system_prompt: None,
            granted_permissions: Vec::new(),
        }
    }
}

impl FileAgentConfig {
    /// Replace unusable values with defaults, reporting each replacement.
    pub fn sanitize(&mut self) -> Vec<ConfigIssue> {
        let defaults = Self::default();
        let mut issues = Vec::new();

        if self.model.trim().is_empty() {
            issues.push(ConfigIssue::replaced(ConfigValidationError::Empty {
                field: "agent.model",
            }));
            self.model = defaults.model;
        }
        if self.agent_name.trim().is_empty() {
            issues.push(ConfigIssue::replaced(ConfigValidationError::Empty {
                field: "agent.agent_name",
            }));
            self.agent_name = defaults.agent_name;
        }
        if self.max_tokens == 0 {
            issues.push(ConfigIssue::replaced(ConfigValidationError::BelowMinimum {
                field: "agent.max_tokens",
                min: 1.0,
                value: 0.0,
            }));
            self.max_tokens = defaults.max_tokens;
        }
        if self.max_steps == 0 {
            issues.push(ConfigIssue::warning(ConfigValidationError::Suspicious {
                field: "agent.max_steps",
                value: "0".to_string(),
                consequence: "every run ends immediately without querying the model",
            }));
        }

        issues
    }

    pub fn to_agent_config(&self, loop_detection: &LoopDetectorConfig) -> AgentConfig {
        let mut config = AgentConfig::default()
            .with_agent_name(&self.agent_name)
            .with_model(&self.model)
            .with_max_steps(self.max_steps)
            .with_max_tokens(self.max_tokens)
            .with_granted_permissions(self.granted_permissions.iter().cloned())
            .with_loop_detection(loop_detection.clone());
        if let Some(prompt) = &self.system_prompt {
            config = config.with_system_prompt(prompt);
        }
        config
    }
}
