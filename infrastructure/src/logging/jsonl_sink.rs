//! JSONL file writer for trace events.
//!
//! Each [`TraceEvent`] becomes one JSON object per line: the payload's fields
//! plus `type` and an RFC-3339 `timestamp`. Lines are appended, so several
//! runs can share one file.

use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use serde_json::{Map, Value};
use tracing::warn;
use warden_application::ports::trace_sink::{TraceEvent, TraceSink};

/// Trace sink that appends one JSON object per line.
///
/// Thread-safe via `Mutex<BufWriter<File>>`. Flushes after every line and on `Drop`.
pub struct JsonlTraceSink {
    writer: Mutex<BufWriter<File>>,
    path: PathBuf,
}

impl JsonlTraceSink {
    /// Open `path` for appending, creating it and its parent directories.
    ///
    /// Returns `None` (after a warning) when the file cannot be opened; the
    /// caller then runs without a trace file.
    pub fn open(path: impl AsRef<Path>) -> Option<Self> {
        let path = path.as_ref();

        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
            && let Err(e) = std::fs::create_dir_all(parent)
        {
            warn!(
                dir = %parent.display(),
                error = %e,
                "Could not create trace directory"
            );
            return None;
        }

        let file = match OpenOptions::new().create(true).append(true).open(path) {
            Ok(f) => f,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Could not open trace file");
                return None;
            }
        };

        Some(Self {
            writer: Mutex::new(BufWriter::new(file)),
            path: path.to_path_buf(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

fn to_record(event: TraceEvent) -> Value {
    let timestamp = chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Millis, true);

    let mut record = match event.payload {
        Value::Object(map) => map,
        other => {
            let mut map = Map::new();
            map.insert("data".to_string(), other);
            map
        }
    };
    record.insert(
        "type".to_string(),
        Value::String(event.event_type.to_string()),
    );
    record.insert("timestamp".to_string(), Value::String(timestamp));
    Value::Object(record)
}

impl TraceSink for JsonlTraceSink {
    fn record(&self, event: TraceEvent) {
        let Ok(line) = serde_json::to_string(&to_record(event)) else {
            return;
        };

        let mut writer = self.writer.lock().unwrap_or_else(|e| e.into_inner());
        if let Err(e) = writeln!(writer, "{}", line).and_then(|_| writer.flush()) {
            warn!(path = %self.path.display(), error = %e, "Failed to write trace event");
        }
    }
}

impl Drop for JsonlTraceSink {
    fn drop(&mut self) {
        if let Ok(mut writer) = self.writer.lock() {
            let _ = writer.flush();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::fs;

    fn read_lines(path: &Path) -> Vec<Value> {
        fs::read_to_string(path)
            .unwrap()
            .lines()
            .map(|line| serde_json::from_str(line).unwrap())
            .collect()
    }

    #[test]
    fn test_writes_one_object_per_event() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("traces").join("run.jsonl");
        let sink = JsonlTraceSink::open(&path).unwrap();

        sink.record(TraceEvent::new(
            "trace_started",
            json!({"trace_id": "t-1", "agent_name": "researcher", "query": "hi"}),
        ));
        sink.record(TraceEvent::new(
            "step_logged",
            json!({"trace_id": "t-1", "step_number": 1, "tool_calls": []}),
        ));
        drop(sink);

        let records = read_lines(&path);
        assert_eq!(records.len(), 2);
        assert_eq!(records[0]["type"], "trace_started");
        assert_eq!(records[0]["agent_name"], "researcher");
        assert_eq!(records[1]["type"], "step_logged");
        assert_eq!(records[1]["step_number"], 1);

        for record in &records {
            let timestamp = record["timestamp"].as_str().unwrap();
            assert!(chrono::DateTime::parse_from_rfc3339(timestamp).is_ok());
        }
    }

    #[test]
    fn test_non_object_payload_is_wrapped() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("run.jsonl");
        let sink = JsonlTraceSink::open(&path).unwrap();

        sink.record(TraceEvent::new("trace_ended", json!("completed")));
        drop(sink);

        let records = read_lines(&path);
        assert_eq!(records[0]["type"], "trace_ended");
        assert_eq!(records[0]["data"], "completed");
    }

    #[test]
    fn test_appends_across_sinks() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("run.jsonl");

        for i in 0..2 {
            let sink = JsonlTraceSink::open(&path).unwrap();
            sink.record(TraceEvent::new("trace_started", json!({"run": i})));
        }

        let records = read_lines(&path);
        assert_eq!(records.len(), 2);
        assert_eq!(records[1]["run"], 1);
    }

    #[test]
    fn test_unopenable_path_returns_none() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("file");
        fs::write(&blocker, "").unwrap();

        assert!(JsonlTraceSink::open(blocker.join("run.jsonl")).is_none());
    }
}
