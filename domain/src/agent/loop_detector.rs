//! Loop and stagnation detection.
//!
//! [`LoopDetector`] watches two streams during a run:
//!
//! - tool invocations, as `(tool_name, normalized_arguments)` pairs
//! - output texts (intermediate reasoning and final-answer candidates)
//!
//! It is deterministic and holds no clock: the same sequence of inputs always
//! produces the same verdicts. Call [`LoopDetector::reset`] at the start of
//! every run.

use std::collections::{BTreeSet, VecDeque};

use serde::{Deserialize, Serialize};

use crate::core::string::normalize_whitespace;

/// Thresholds for [`LoopDetector`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoopDetectorConfig {
    /// Identical consecutive calls that trip the detector.
    pub repeat_threshold: usize,
    /// Number of recent calls kept for the window check.
    pub window_size: usize,
    /// Occurrences of one call within the window that trip the detector.
    pub window_threshold: usize,
    /// Word-set Jaccard similarity at which two outputs count as the same.
    pub similarity_threshold: f64,
}

impl Default for LoopDetectorConfig {
    fn default() -> Self {
        Self {
            repeat_threshold: 3,
            window_size: 10,
            window_threshold: 5,
            similarity_threshold: 0.9,
        }
    }
}

/// Verdict of a single detector check.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct LoopCheck {
    pub is_looping: bool,
    /// User-facing explanation, present only when `is_looping` is true.
    pub message: Option<String>,
}

impl LoopCheck {
    pub fn clear() -> Self {
        Self::default()
    }

    pub fn tripped(message: impl Into<String>) -> Self {
        Self {
            is_looping: true,
            message: Some(message.into()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct CallSignature {
    tool: String,
    args: String,
}

/// Stateful matcher over tool calls and outputs within one run.
#[derive(Debug, Clone)]
pub struct LoopDetector {
    config: LoopDetectorConfig,
    recent_calls: VecDeque<CallSignature>,
    streak: usize,
    last_output: Option<String>,
}

impl Default for LoopDetector {
    fn default() -> Self {
        Self::new(LoopDetectorConfig::default())
    }
}

impl LoopDetector {
    pub fn new(config: LoopDetectorConfig) -> Self {
        Self {
            config,
            recent_calls: VecDeque::new(),
            streak: 0,
            last_output: None,
        }
    }

    pub fn config(&self) -> &LoopDetectorConfig {
        &self.config
    }

    /// Forget all history.
    pub fn reset(&mut self) {
        self.recent_calls.clear();
        self.streak = 0;
        self.last_output = None;
    }

    /// Record a tool invocation and report whether it completes a loop.
    ///
    /// `arguments` is the raw argument text emitted by the model. JSON input
    /// is compared after key sorting, anything else after trimming.
    pub fn check_tool_call(&mut self, tool_name: &str, arguments: &str) -> LoopCheck {
        let signature = CallSignature {
            tool: tool_name.to_string(),
            args: normalize_arguments(arguments),
        };

        let continues_streak = self.recent_calls.back() == Some(&signature);
        self.streak = if continues_streak { self.streak + 1 } else { 1 };

        self.recent_calls.push_back(signature.clone());
        while self.recent_calls.len() > self.config.window_size.max(1) {
            self.recent_calls.pop_front();
        }

        if self.streak >= self.config.repeat_threshold.max(1) {
            return LoopCheck::tripped(format!(
                "Loop detected: tool '{}' was called {} times in a row with the same arguments. \
                 Stopping to avoid an endless cycle.",
                tool_name,
                self.streak
            ));
        }

        let occurrences = self
            .recent_calls
            .iter()
            .filter(|c| **c == signature)
            .count();
        if occurrences >= self.config.window_threshold.max(1) {
            return LoopCheck::tripped(format!(
                "Loop detected: tool '{}' was called {} times with the same arguments in the last {} calls. \
                 Stopping to avoid an endless cycle.",
                tool_name,
                occurrences,
                self.recent_calls.len()
            ));
        }

        LoopCheck::clear()
    }

    /// Check a final-answer candidate against the previous recorded output.
    ///
    /// The candidate is recorded afterwards either way. Empty candidates
    /// never trip and are not recorded.
    pub fn check_output_stagnation(&mut self, candidate: &str) -> LoopCheck {
        let normalized = normalize_whitespace(candidate);
        if normalized.is_empty() {
            return LoopCheck::clear();
        }

        let verdict = match &self.last_output {
            Some(previous) if *previous == normalized => LoopCheck::tripped(
                "Stagnation detected: the agent repeated its previous output without making progress.",
            ),
            Some(previous)
                if jaccard_similarity(previous, &normalized) >= self.config.similarity_threshold =>
            {
                LoopCheck::tripped(
                    "Stagnation detected: the agent produced nearly the same output as before without making progress.",
                )
            }
            _ => LoopCheck::clear(),
        };

        self.last_output = Some(normalized);
        verdict
    }

    /// Record intermediate output without checking it.
    pub fn record_output(&mut self, text: &str) {
        let normalized = normalize_whitespace(text);
        if !normalized.is_empty() {
            self.last_output = Some(normalized);
        }
    }
}

/// Canonical form of a tool-call argument string.
///
/// `serde_json::Map` keeps keys ordered, so re-serializing a parsed value
/// yields sorted keys at every nesting level.
pub fn normalize_arguments(arguments: &str) -> String {
    match serde_json::from_str::<serde_json::Value>(arguments) {
        Ok(value) => value.to_string(),
        Err(_) => arguments.trim().to_string(),
    }
}

fn jaccard_similarity(a: &str, b: &str) -> f64 {
    let left: BTreeSet<&str> = a.split_whitespace().collect();
    let right: BTreeSet<&str> = b.split_whitespace().collect();

    let union = left.union(&right).count();
    if union == 0 {
        return 1.0;
    }
    left.intersection(&right).count() as f64 / union as f64
}
