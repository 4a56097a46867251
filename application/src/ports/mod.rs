//! Ports (interfaces) for external dependencies

pub mod completion;
pub mod tool_executor;
pub mod trace_sink;
