//! Infrastructure layer for agent-warden
//!
//! This crate contains adapters that implement the ports defined
//! in the application layer: the governed tool registry and its tools,
//! the HTTP completion transport, configuration file loading and the
//! JSONL trace sink.

pub mod config;
pub mod logging;
pub mod security;
pub mod tools;
pub mod transport;

// Re-export commonly used types
pub use config::{
    ConfigIssue, ConfigLoader, ConfigValidationError, FileAgentConfig, FileConfig,
    FileLoggingConfig, FilePricingConfig, FileToolsConfig, FileTransportConfig, Severity,
};
pub use logging::JsonlTraceSink;
pub use security::{PathGuard, PathGuardError};
pub use tools::{AddTool, CalculatorTool, ListFilesTool, ToolRegistry, builtin_registry};
pub use transport::{OpenAiTransport, RetryPolicy};
