//! Structured execution tracing.
//!
//! [`ExecutionTracer`] keeps one [`Trace`] per run. It is internally
//! synchronized so a single tracer can be shared (`Arc`) by every agent of a
//! pipeline. Misuse (unknown ids, logging to an ended trace, ending twice) is
//! logged and ignored rather than reported as an error.

use std::collections::HashMap;
use std::sync::Mutex;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::agent::entities::AgentStep;

/// Identifier of one trace (UUID v4).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TraceId(String);

impl TraceId {
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for TraceId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TraceStatus {
    Running,
    Completed,
    Error,
}

impl TraceStatus {
    pub fn as_str(&self) -> &str {
        match self {
            TraceStatus::Running => "running",
            TraceStatus::Completed => "completed",
            TraceStatus::Error => "error",
        }
    }
}

/// How a run ended, as reported to [`ExecutionTracer::end_trace`].
#[derive(Debug, Clone, PartialEq)]
pub enum TraceOutcome {
    Completed { output: String },
    Error { output: String, error: String },
}

impl TraceOutcome {
    pub fn status(&self) -> TraceStatus {
        match self {
            TraceOutcome::Completed { .. } => TraceStatus::Completed,
            TraceOutcome::Error { .. } => TraceStatus::Error,
        }
    }
}

/// Ordered record of one run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trace {
    pub id: TraceId,
    pub agent_name: String,
    pub query: String,
    pub model: String,
    pub started_at: DateTime<Utc>,
    pub ended_at: Option<DateTime<Utc>>,
    pub status: TraceStatus,
    pub steps: Vec<AgentStep>,
    pub final_output: Option<String>,
    pub error: Option<String>,
}

impl Trace {
    fn new(agent_name: &str, query: &str, model: &str) -> Self {
        Self {
            id: TraceId::generate(),
            agent_name: agent_name.to_string(),
            query: query.to_string(),
            model: model.to_string(),
            started_at: Utc::now(),
            ended_at: None,
            status: TraceStatus::Running,
            steps: Vec::new(),
            final_output: None,
            error: None,
        }
    }

    pub fn is_ended(&self) -> bool {
        self.status != TraceStatus::Running
    }

    /// Wall-clock duration, if the trace has ended.
    pub fn duration_ms(&self) -> Option<i64> {
        self.ended_at
            .map(|end| (end - self.started_at).num_milliseconds().max(0))
    }

    pub fn tool_call_count(&self) -> usize {
        self.steps.iter().map(|s| s.tool_calls.len()).sum()
    }
}

#[derive(Debug, Default)]
struct TracerState {
    traces: HashMap<TraceId, Trace>,
    order: Vec<TraceId>,
}

#[derive(Debug, Default)]
pub struct ExecutionTracer {
    state: Mutex<TracerState>,
}

impl ExecutionTracer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Open a trace for a new run and return its id.
    pub fn start_trace(&self, agent_name: &str, query: &str, model: &str) -> TraceId {
        let trace = Trace::new(agent_name, query, model);
        let id = trace.id.clone();
        debug!(trace_id = %id, agent = agent_name, "Trace started");

        let mut state = self.lock();
        state.order.push(id.clone());
        state.traces.insert(id.clone(), trace);
        id
    }

    /// Append a step. Returns whether the step was recorded.
    pub fn log_step(&self, id: &TraceId, step: AgentStep) -> bool {
        let mut state = self.lock();
        let Some(trace) = state.traces.get_mut(id) else {
            warn!(trace_id = %id, "Ignoring step for unknown trace");
            return false;
        };
        if trace.is_ended() {
            warn!(trace_id = %id, step = step.step_number, "Ignoring step for ended trace");
            return false;
        }
        if let Some(last) = trace.steps.last()
            && step.step_number <= last.step_number
        {
            warn!(
                trace_id = %id,
                step = step.step_number,
                last = last.step_number,
                "Ignoring out-of-order step"
            );
            return false;
        }
        trace.steps.push(step);
        true
    }

    /// Set the terminal state. Only the first call for a trace has effect.
    pub fn end_trace(&self, id: &TraceId, outcome: TraceOutcome) -> bool {
        let mut state = self.lock();
        let Some(trace) = state.traces.get_mut(id) else {
            warn!(trace_id = %id, "Ignoring end of unknown trace");
            return false;
        };
        if trace.is_ended() {
            warn!(trace_id = %id, "Trace already ended");
            return false;
        }

        trace.status = outcome.status();
        trace.ended_at = Some(Utc::now());
        match outcome {
            TraceOutcome::Completed { output } => trace.final_output = Some(output),
            TraceOutcome::Error { output, error } => {
                trace.final_output = Some(output);
                trace.error = Some(error);
            }
        }
        debug!(trace_id = %id, status = trace.status.as_str(), "Trace ended");
        true
    }

    pub fn get(&self, id: &TraceId) -> Option<Trace> {
        self.lock().traces.get(id).cloned()
    }

    /// All traces in start order.
    pub fn traces(&self) -> Vec<Trace> {
        let state = self.lock();
        state
            .order
            .iter()
            .filter_map(|id| state.traces.get(id).cloned())
            .collect()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, TracerState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn test_trace_lifecycle() {
        let tracer = ExecutionTracer::new();
        let id = tracer.start_trace("agent", "what?", "gpt-4o");
        assert!(tracer.log_step(&id, AgentStep::new(1, "thinking")));
        assert!(tracer.log_step(&id, AgentStep::new(2, "answer")));
        assert!(tracer.end_trace(
            &id,
            TraceOutcome::Completed {
                output: "42".to_string()
            }
        ));

        let trace = tracer.get(&id).unwrap();
        assert_eq!(trace.status, TraceStatus::Completed);
        assert_eq!(trace.steps.len(), 2);
        assert_eq!(trace.final_output.as_deref(), Some("42"));
        assert!(trace.duration_ms().is_some());
    }

    #[test]
    fn test_end_is_set_once() {
        let tracer = ExecutionTracer::new();
        let id = tracer.start_trace("agent", "q", "m");
        tracer.end_trace(
            &id,
            TraceOutcome::Error {
                output: "Agent failed: boom".to_string(),
                error: "boom".to_string(),
            },
        );
        assert!(!tracer.end_trace(
            &id,
            TraceOutcome::Completed {
                output: "late".to_string()
            }
        ));

        let trace = tracer.get(&id).unwrap();
        assert_eq!(trace.status, TraceStatus::Error);
        assert_eq!(trace.error.as_deref(), Some("boom"));
    }

    #[test]
    fn test_unknown_and_ended_traces_are_ignored() {
        let tracer = ExecutionTracer::new();
        assert!(
            !tracer.log_step(&TraceId::generate(), AgentStep::new(1, ""))
        );

        let id = tracer.start_trace("agent", "q", "m");
        tracer.end_trace(&id, TraceOutcome::Completed { output: String::new() });
        assert!(!tracer.log_step(&id, AgentStep::new(1, "")));
        assert!(tracer.get(&id).unwrap().steps.is_empty());
    }

    #[test]
    fn test_steps_must_increase() {
        let tracer = ExecutionTracer::new();
        let id = tracer.start_trace("agent", "q", "m");
        assert!(tracer.log_step(&id, AgentStep::new(1, "")));
        assert!(!tracer.log_step(&id, AgentStep::new(1, "")));
        assert_eq!(tracer.get(&id).unwrap().steps.len(), 1);
    }

    #[test]
    fn test_trace_ids_are_unique_uuids() {
        let a = TraceId::generate();
        let b = TraceId::generate();
        assert_ne!(a, b);
        assert!(Uuid::parse_str(a.as_str()).is_ok());
    }

    #[test]
    fn test_shared_tracer_keeps_start_order() {
        let tracer = Arc::new(ExecutionTracer::new());
        let first = tracer.start_trace("researcher", "q1", "m");
        let second = tracer.start_trace("writer", "q2", "m");
        let ids: Vec<TraceId> = tracer.traces().into_iter().map(|t| t.id).collect();
        assert_eq!(ids, vec![first, second]);
    }
}
