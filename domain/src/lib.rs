//! Domain layer for agent-warden
//!
//! This crate contains the core business logic, entities, and value objects.
//! It has no dependencies on infrastructure or presentation concerns.
//!
//! # Core Concepts
//!
//! ## Governance
//!
//! Every tool call passes through the same gate before anything runs:
//!
//! - **Permission scopes**: the caller must hold every scope the tool declares
//! - **Token bucket**: each tool has its own per-minute budget with burst tolerance
//!
//! ## Safety
//!
//! - **Loop detection**: repeated identical tool calls or stagnating outputs
//!   end the run with an explanation instead of burning the step budget
//!
//! ## Observability
//!
//! - **Execution traces**: ordered, timestamped steps per run
//! - **Cost ledger**: token counts and USD cost per completion, per query

pub mod agent;
pub mod core;
pub mod governance;
pub mod observability;
pub mod session;
pub mod tool;

// Re-export commonly used types
pub use agent::{
    entities::{AgentPhase, AgentStep, Termination, ToolCallRecord},
    loop_detector::{LoopCheck, LoopDetector, LoopDetectorConfig},
};
pub use core::clock::{Clock, ManualClock, SystemClock};
pub use governance::{RateLimiter, missing_permissions};
pub use observability::{
    cost::{CostLedger, CostLedgerError, QueryCost, StepCost},
    pricing::{DEFAULT_FALLBACK_PER_TOKEN_USD, ModelPrice, PriceLookup, PriceTable, format_cost},
    tracer::{ExecutionTracer, Trace, TraceId, TraceOutcome, TraceStatus},
};
pub use session::{
    entities::{Conversation, Message, Role},
    response::{CompletionResponse, TokenUsage},
};
pub use tool::{
    entities::{ToolArguments, ToolCall, ToolDefinition, ToolParameter, ToolSchema},
    traits::{DefaultToolValidator, Tool, ToolValidator},
    value_objects::{ToolError, ToolErrorKind, ToolResult},
};
