//! Agent domain module
//!
//! Contains the state machine phases, step records, and loop detection
//! used by the reasoning/acting loop.

pub mod entities;
pub mod loop_detector;

pub use entities::{AgentPhase, AgentStep, Termination, ToolCallRecord};
pub use loop_detector::{LoopCheck, LoopDetector, LoopDetectorConfig};
