//! Type definitions for the RunAgent use case.

use serde::Serialize;
use thiserror::Error;
use warden_domain::{QueryCost, Termination, TraceId};

use crate::ports::completion::TransportError;

/// Answer returned when the step ceiling is reached.
pub const MAX_STEPS_MESSAGE: &str = "Max steps reached without final answer.";

/// Faults that end a run with `Terminated(Error)`.
///
/// These never escape [`AgentLoop::run`](super::AgentLoop::run); they are
/// rendered into the run's answer and trace.
#[derive(Error, Debug)]
pub enum RunAgentError {
    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),

    #[error(transparent)]
    Ledger(#[from] warden_domain::CostLedgerError),
}

/// Outcome of one run. Always produced, whatever happened during the run.
#[derive(Debug, Clone, Serialize)]
pub struct RunAgentOutput {
    pub agent_name: String,
    pub query: String,
    pub answer: String,
    pub termination: Termination,
    /// Steps started before termination.
    pub steps: usize,
    pub trace_id: TraceId,
    /// Whether the answer is a loop or stagnation message.
    pub loop_detected: bool,
    /// Fault description when `termination` is `Error`.
    pub error: Option<String>,
    /// This run's closed cost record.
    pub cost: Option<QueryCost>,
    pub duration_ms: u64,
}

impl RunAgentOutput {
    /// True when the model produced its own final answer.
    pub fn is_answer(&self) -> bool {
        self.termination == Termination::Answer && !self.loop_detected
    }
}

/// How the step loop ended, before the run is closed out.
pub(super) enum Finish {
    Answer(String),
    MaxSteps,
}

/// Mutable counters shared between the step loop and run close-out.
#[derive(Debug, Default)]
pub(super) struct RunProgress {
    pub steps: usize,
    pub loop_detected: bool,
}
