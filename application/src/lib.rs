//! Application layer for agent-warden
//!
//! This crate contains use cases, port definitions, and application configuration.
//! It depends only on the domain layer.

pub mod config;
pub mod ports;
pub mod use_cases;

// Re-export commonly used types
pub use config::{AgentConfig, SpecialistProfile, default_pipeline};
pub use ports::{
    completion::{CompletionRequest, CompletionTransport, ToolChoice, TransportError},
    tool_executor::ToolExecutorPort,
    trace_sink::{NoTraceSink, TraceEvent, TraceSink},
};
pub use use_cases::run_agent::{AgentLoop, MAX_STEPS_MESSAGE, RunAgentError, RunAgentOutput};
pub use use_cases::run_pipeline::{RunPipelineOutput, RunPipelineUseCase};
