//! Logging infrastructure: structured trace output.
//!
//! Provides [`JsonlTraceSink`], a JSONL file writer that implements
//! the [`TraceSink`](warden_application::TraceSink) port.

mod jsonl_sink;

pub use jsonl_sink::JsonlTraceSink;
