//! Tools configuration from TOML (`[tools]` section)
//!
//! ```toml
//! [tools]
//! workspace_root = "."
//! default_rate_limit = 60
//!
//! [tools.rate_limits]
//! list_files = 30
//! add = 2
//! ```

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;

use crate::config::validation::{ConfigIssue, ConfigValidationError};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileToolsConfig {
    /// Root directory filesystem tools are confined to
    pub workspace_root: PathBuf,
    /// Calls per minute for tools without an explicit limit
    pub default_rate_limit: u32,
    /// Per-tool calls per minute (tool name -> limit)
    pub rate_limits: HashMap<String, u32>,
}

impl Default for FileToolsConfig {
    fn default() -> Self {
        Self {
            workspace_root: PathBuf::from("."),
            default_rate_limit: 60,
            rate_limits: HashMap::new(),
        }
    }
}

impl FileToolsConfig {
    /// Per-minute limit for a tool, falling back to `default_rate_limit`.
    pub fn rate_limit_for(&self, tool_name: &str) -> u32 {
        self.rate_limits
            .get(tool_name)
            .copied()
            .unwrap_or(self.default_rate_limit)
    }

    pub fn sanitize(&mut self) -> Vec<ConfigIssue> {
        let mut issues = Vec::new();

        if self.workspace_root.as_os_str().is_empty() {
            issues.push(ConfigIssue::replaced(ConfigValidationError::Empty {
                field: "tools.workspace_root",
            }));
            self.workspace_root = PathBuf::from(".");
        }
        if self.default_rate_limit == 0 {
            issues.push(ConfigIssue::warning(ConfigValidationError::Suspicious {
                field: "tools.default_rate_limit",
                value: "0".to_string(),
                consequence: "tools without an explicit limit can never be called",
            }));
        }

        let mut disabled: Vec<&String> = self
            .rate_limits
            .iter()
            .filter(|(_, limit)| **limit == 0)
            .map(|(name, _)| name)
            .collect();
        disabled.sort();
        for name in disabled {
            issues.push(ConfigIssue::warning(ConfigValidationError::Suspicious {
                field: "tools.rate_limits",
                value: format!("0 for '{}'", name),
                consequence: "the tool can never be called",
            }));
        }

        issues
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rate_limit_for() {
        let config: FileToolsConfig = toml::from_str(
            r#"
default_rate_limit = 10

[rate_limits]
add = 2
"#,
        )
        .unwrap();
        assert_eq!(config.rate_limit_for("add"), 2);
        assert_eq!(config.rate_limit_for("list_files"), 10);
        assert_eq!(config.workspace_root, PathBuf::from("."));
    }

    #[test]
    fn test_zero_limits_are_warned() {
        let mut config = FileToolsConfig::default();
        config.rate_limits.insert("add".to_string(), 0);
        let issues = config.sanitize();
        assert_eq!(issues.len(), 1);
        assert_eq!(config.rate_limit_for("add"), 0);
    }
}
