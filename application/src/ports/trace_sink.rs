//! Port for structured trace output.
//!
//! Defines the [`TraceSink`] trait for streaming execution-trace events
//! (run start, each step, run end) to a machine-readable log.
//!
//! This is separate from `tracing`-based operation logs: tracing handles
//! human-readable diagnostic messages, while this port captures the run
//! transcript as structured records (JSONL).

use serde_json::Value;

/// A structured trace event.
///
/// Each event has a type string and a JSON payload. Adapters add their own
/// timestamp when writing.
#[derive(Debug, Clone, PartialEq)]
pub struct TraceEvent {
    /// Event type identifier (`trace_started`, `step_logged`, `trace_ended`).
    pub event_type: &'static str,
    pub payload: Value,
}

impl TraceEvent {
    pub fn new(event_type: &'static str, payload: Value) -> Self {
        Self {
            event_type,
            payload,
        }
    }
}

/// Port for recording trace events.
///
/// `record` is synchronous and non-fallible: sink failures must never
/// affect the run.
pub trait TraceSink: Send + Sync {
    fn record(&self, event: TraceEvent);
}

/// No-op implementation for tests and when trace output is disabled.
pub struct NoTraceSink;

impl TraceSink for NoTraceSink {
    fn record(&self, _event: TraceEvent) {}
}
