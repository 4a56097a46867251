//! Agent run entities: phases, termination reasons, and step records.

use serde::{Deserialize, Serialize};

/// Why a run stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Termination {
    /// The model produced a final answer (or a loop trip substituted one).
    Answer,
    /// The step ceiling was reached without an answer.
    MaxSteps,
    /// An unexpected fault ended the run.
    Error,
}

impl Termination {
    pub fn as_str(&self) -> &str {
        match self {
            Termination::Answer => "answer",
            Termination::MaxSteps => "max_steps",
            Termination::Error => "error",
        }
    }
}

impl std::fmt::Display for Termination {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Phase of the reasoning/acting state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "phase", content = "reason")]
pub enum AgentPhase {
    Idle,
    /// Waiting on the completion transport.
    Reasoning,
    /// Executing the tool calls of the current step.
    ToolDispatch,
    Terminated(Termination),
}

impl AgentPhase {
    pub fn as_str(&self) -> &str {
        match self {
            AgentPhase::Idle => "idle",
            AgentPhase::Reasoning => "reasoning",
            AgentPhase::ToolDispatch => "tool_dispatch",
            AgentPhase::Terminated(_) => "terminated",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, AgentPhase::Terminated(_))
    }

    /// Whether moving from `self` to `next` is a legal transition.
    pub fn can_transition_to(&self, next: &AgentPhase) -> bool {
        use AgentPhase::*;
        matches!(
            (self, next),
            (Idle, Reasoning)
                | (Idle, Terminated(_))
                | (Reasoning, ToolDispatch)
                | (Reasoning, Terminated(_))
                | (ToolDispatch, Reasoning)
                | (ToolDispatch, Terminated(_))
        )
    }
}

/// One tool invocation within a step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolCallRecord {
    pub tool_name: String,
    pub call_id: String,
    /// Parsed arguments, or the raw text as a JSON string when unparseable.
    pub arguments: serde_json::Value,
    /// Observation text appended to the conversation.
    pub output: String,
    pub success: bool,
    pub duration_ms: u64,
}

impl ToolCallRecord {
    /// Arguments as recorded: parsed JSON when possible, raw text otherwise.
    pub fn arguments_from_raw(raw: &str) -> serde_json::Value {
        serde_json::from_str(raw)
            .unwrap_or_else(|_| serde_json::Value::String(raw.to_string()))
    }
}

/// One completed step of a run. Immutable once appended to a trace.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentStep {
    /// 1-based, strictly increasing within a run.
    pub step_number: usize,
    pub reasoning: String,
    pub tool_calls: Vec<ToolCallRecord>,
    pub duration_ms: u64,
}

impl AgentStep {
    pub fn new(step_number: usize, reasoning: impl Into<String>) -> Self {
        Self {
            step_number,
            reasoning: reasoning.into(),
            tool_calls: Vec::new(),
            duration_ms: 0,
        }
    }

    pub fn with_tool_call(mut self, record: ToolCallRecord) -> Self {
        self.tool_calls.push(record);
        self
    }

    pub fn with_duration_ms(mut self, duration_ms: u64) -> Self {
        self.duration_ms = duration_ms;
        self
    }

    pub fn has_tool_calls(&self) -> bool {
        !self.tool_calls.is_empty()
    }
}
