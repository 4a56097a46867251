//! Tool domain module
//!
//! Defines the abstractions behind the agent's **tool system**: how a model
//! is offered capabilities, how it asks for them, and what comes back.
//!
//! ```text
//! ┌────────────────┐   ┌──────────────┐   ┌──────────────┐
//! │ ToolDefinition │──▶│ ToolCall     │──▶│ ToolResult   │
//! │ (+ ToolSchema) │   │ (from model) │   │ (wire shape) │
//! └────────────────┘   └──────────────┘   └──────────────┘
//! ```
//!
//! # Key Types
//!
//! - [`Tool`]: capability interface held by the registry as a trait object
//! - [`ToolDefinition`]: name, description, parameters, permission scopes
//! - [`ToolSchema`]: JSON-Schema descriptor sent to the completion endpoint
//! - [`ToolCall`]: a model-emitted invocation with raw argument text
//! - [`ToolResult`]: `{success, result, error}`, never an exception
//! - [`ToolError`]: governance, validation, security and execution failures
//!
//! # Architecture
//!
//! - **Domain** (this module): pure definitions, no I/O
//! - **Application** (`ToolExecutorPort`): port used by the agent loop
//! - **Infrastructure** (`ToolRegistry`): rate limits, permissions, dispatch

pub mod entities;
pub mod traits;
pub mod value_objects;

pub use entities::{ToolArguments, ToolCall, ToolDefinition, ToolParameter, ToolSchema};
pub use traits::{DefaultToolValidator, Tool, ToolValidator};
pub use value_objects::{ToolError, ToolErrorKind, ToolResult};
