//! Configuration file loading for agent-warden
//!
//! This module handles file I/O and merging of configuration from multiple sources.
//! The priority order (highest to lowest):
//!
//! 1. `--config <path>` specified file
//! 2. Project root: `./warden.toml` or `./.warden.toml`
//! 3. Global: `$XDG_CONFIG_HOME/agent-warden/config.toml`
//! 4. `WARDEN_*` environment variables
//! 5. Default values

mod file_config;
mod loader;
mod validation;

pub use file_config::{
    FileAgentConfig, FileConfig, FileLoggingConfig, FileModelPrice, FilePricingConfig,
    FileToolsConfig, FileTransportConfig,
};
pub use loader::ConfigLoader;
pub use validation::{ConfigIssue, ConfigValidationError, Severity};
