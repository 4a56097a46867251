//! Raw TOML configuration data types
//!
//! These structs mirror the config file layout. Each section carries its
//! own defaults, so a partial file deserializes cleanly.

mod agent;
mod logging;
mod pricing;
mod tools;
mod transport;

pub use agent::FileAgentConfig;
pub use logging::FileLoggingConfig;
pub use pricing::{FileModelPrice, FilePricingConfig};
pub use tools::FileToolsConfig;
pub use transport::FileTransportConfig;

use serde::{Deserialize, Serialize};
use warden_application::AgentConfig;
use warden_domain::LoopDetectorConfig;

use super::validation::{ConfigIssue, ConfigValidationError};

/// Complete file configuration (raw TOML structure)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    pub agent: FileAgentConfig,
    /// Completion endpoint settings
    pub transport: FileTransportConfig,
    pub tools: FileToolsConfig,
    /// Loop and stagnation thresholds
    pub loop_detection: LoopDetectorConfig,
    pub pricing: FilePricingConfig,
    pub logging: FileLoggingConfig,
}

impl FileConfig {
    /// Check every section, replacing unusable values with their defaults.
    ///
    /// Returns all detected issues; an empty list means the file was used
    /// exactly as written.
    pub fn validate(&mut self) -> Vec<ConfigIssue> {
        let mut issues = Vec::new();
        issues.extend(self.agent.sanitize());
        issues.extend(self.transport.sanitize());
        issues.extend(self.tools.sanitize());
        issues.extend(sanitize_loop_detection(&mut self.loop_detection));
        issues.extend(self.pricing.sanitize());
        issues
    }

    pub fn to_agent_config(&self) -> AgentConfig {
        self.agent.to_agent_config(&self.loop_detection)
    }
}

fn sanitize_loop_detection(config: &mut LoopDetectorConfig) -> Vec<ConfigIssue> {
    let defaults = LoopDetectorConfig::default();
    let mut issues = Vec::new();

    if config.repeat_threshold < 2 {
        issues.push(ConfigIssue::replaced(ConfigValidationError::BelowMinimum {
            field: "loop_detection.repeat_threshold",
            min: 2.0,
            value: config.repeat_threshold as f64,
        }));
        config.repeat_threshold = defaults.repeat_threshold;
    }
    if config.window_threshold < 2 {
        issues.push(ConfigIssue::replaced(ConfigValidationError::BelowMinimum {
            field: "loop_detection.window_threshold",
            min: 2.0,
            value: config.window_threshold as f64,
        }));
        config.window_threshold = defaults.window_threshold;
    }
    if config.window_size < config.window_threshold {
        issues.push(ConfigIssue::replaced(ConfigValidationError::BelowMinimum {
            field: "loop_detection.window_size",
            min: config.window_threshold as f64,
            value: config.window_size as f64,
        }));
        config.window_size = defaults.window_size.max(config.window_threshold);
    }
    let similarity = config.similarity_threshold;
    if !(similarity > 0.0 && similarity <= 1.0) {
        issues.push(ConfigIssue::replaced(ConfigValidationError::OutOfRange {
            field: "loop_detection.similarity_threshold",
            min: 0.0,
            max: 1.0,
            value: similarity,
        }));
        config.similarity_threshold = defaults.similarity_threshold;
    }

    issues
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_full_config() {
        let toml_str = r#"
[agent]
model = "meta-llama/llama-3-70b-instruct"
max_steps = 6
granted_permissions = ["filesystem:read"]

[transport]
max_retries = 5

[tools]
workspace_root = "/srv/data"

[tools.rate_limits]
add = 2

[loop_detection]
repeat_threshold = 4

[pricing.models."gpt-4o"]
input_per_mtok = 2.5
output_per_mtok = 10.0

[logging]
trace_file = "trace.jsonl"
"#;

        let config: FileConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.agent.model, "meta-llama/llama-3-70b-instruct");
        assert_eq!(config.agent.max_steps, 6);
        assert_eq!(config.transport.max_retries, 5);
        assert_eq!(config.tools.rate_limit_for("add"), 2);
        assert_eq!(config.loop_detection.repeat_threshold, 4);
        assert_eq!(config.loop_detection.window_size, 10);
        assert_eq!(config.pricing.models.len(), 1);
        assert!(config.logging.trace_file.is_some());
    }

    #[test]
    fn test_deserialize_partial_config() {
        let config: FileConfig = toml::from_str("[agent]\nmax_tokens = 256\n").unwrap();
        assert_eq!(config.agent.max_tokens, 256);
        assert_eq!(config.agent.model, "gpt-4o");
        assert_eq!(config.transport, FileTransportConfig::default());
    }

    #[test]
    fn test_validate_valid_config() {
        let mut config = FileConfig::default();
        assert!(config.validate().is_empty());
    }

    #[test]
    fn test_invalid_thresholds_fall_back() {
        let mut config = FileConfig::default();
        config.loop_detection.repeat_threshold = 1;
        config.loop_detection.similarity_threshold = 1.5;

        let issues = config.validate();

        assert_eq!(issues.len(), 2);
        assert_eq!(config.loop_detection, LoopDetectorConfig::default());
    }

    #[test]
    fn test_window_smaller_than_threshold() {
        let mut config = FileConfig::default();
        config.loop_detection.window_size = 3;
        config.loop_detection.window_threshold = 4;

        let issues = config.validate();

        assert_eq!(issues.len(), 1);
        assert_eq!(config.loop_detection.window_size, 10);
    }

    #[test]
    fn test_zero_max_steps_reported() {
        let mut config = FileConfig::default();
        config.agent.max_steps = 0;
        let issues = config.validate();
        assert_eq!(issues.len(), 1);
        assert!(issues[0].message().contains("agent.max_steps"));
    }

    #[test]
    fn test_to_agent_config_carries_loop_detection() {
        let mut config = FileConfig::default();
        config.loop_detection.repeat_threshold = 5;
        assert_eq!(config.to_agent_config().loop_detection.repeat_threshold, 5);
    }
}
