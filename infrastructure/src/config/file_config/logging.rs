//! Logging configuration from TOML (`[logging]` section)

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// ```toml
/// [logging]
/// trace_file = "~/.local/share/agent-warden/trace.jsonl"
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileLoggingConfig {
    /// JSONL file receiving trace events; disabled when unset
    pub trace_file: Option<PathBuf>,
}

impl FileLoggingConfig {
    /// The trace file with a leading `~/` expanded to the home directory.
    pub fn trace_path(&self) -> Option<PathBuf> {
        let path = self.trace_file.as_ref()?;
        if let Ok(rest) = path.strip_prefix("~")
            && let Some(home) = dirs::home_dir()
        {
            return Some(home.join(rest));
        }
        Some(path.clone())
    }
}
