//! Completion transport configuration from TOML (`[transport]` section)

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::config::validation::{ConfigIssue, ConfigValidationError};

/// Raw transport configuration from TOML
///
/// # Example
///
/// ```toml
/// [transport]
/// base_url = "https://openrouter.ai/api/v1"
/// api_key_env = "OPENROUTER_API_KEY"
/// timeout_secs = 60
/// max_retries = 3
/// retry_delay_ms = 5000
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileTransportConfig {
    /// OpenAI-compatible API root (without `/chat/completions`)
    pub base_url: String,
    /// Environment variable holding the API key
    pub api_key_env: String,
    /// Per-request timeout
    pub timeout_secs: u64,
    /// Total attempts per completion, including the first
    pub max_retries: u32,
    /// Base delay for backoff
    pub retry_delay_ms: u64,
}

impl Default for FileTransportConfig {
    fn default() -> Self {
        Self {
            base_url: "https://openrouter.ai/api/v1".to_string(),
            api_key_env: "OPENROUTER_API_KEY".to_string(),
            timeout_secs: 60,
            max_retries: 3,
            retry_delay_ms: 5000,
        }
    }
}

impl FileTransportConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn retry_delay(&self) -> Duration {
        Duration::from_millis(self.retry_delay_ms)
    }

    pub fn sanitize(&mut self) -> Vec<ConfigIssue> {
        let defaults = Self::default();
        let mut issues = Vec::new();

        if self.base_url.trim().is_empty() {
            issues.push(ConfigIssue::replaced(ConfigValidationError::Empty {
                field: "transport.base_url",
            }));
            self.base_url = defaults.base_url;
        }
        if self.api_key_env.trim().is_empty() {
            issues.push(ConfigIssue::replaced(ConfigValidationError::Empty {
                field: "transport.api_key_env",
            }));
            self.api_key_env = defaults.api_key_env;
        }
        if self.timeout_secs == 0 {
            issues.push(ConfigIssue::replaced(ConfigValidationError::BelowMinimum {
                field: "transport.timeout_secs",
                min: 1.0,
                value: 0.0,
            }));
            self.timeout_secs = defaults.timeout_secs;
        }
        if self.max_retries == 0 {
            issues.push(ConfigIssue::replaced(ConfigValidationError::BelowMinimum {
                field: "transport.max_retries",
                min: 1.0,
                value: 0.0,
            }));
            self.max_retries = defaults.max_retries;
        }

        issues
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = FileTransportConfig::default();
        assert_eq!(config.timeout(), Duration::from_secs(60));
        assert_eq!(config.retry_delay(), Duration::from_millis(5000));
        assert_eq!(config.max_retries, 3);
    }

    #[test]
    fn test_sanitize_zero_values() {
        let mut config = FileTransportConfig {
            timeout_secs: 0,
            max_retries: 0,
            ..Default::default()
        };
        assert_eq!(config.sanitize().len(), 2);
        assert_eq!(config.timeout_secs, 60);
        assert_eq!(config.max_retries, 3);
    }
}
