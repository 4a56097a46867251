//! Tool domain value objects: the result shape and the error taxonomy.
//!
//! Every registry-mediated call produces a [`ToolResult`]. Its serialized
//! form is the boundary contract shared with the model and with other
//! implementations, and is exactly:
//!
//! ```text
//! {"success": bool, "result": <value or null>, "error": <string or null>}
//! ```
//!
//! Failures are never raised across the registry: a [`ToolError`] is folded
//! into a failed [`ToolResult`] whose `error` is the error's display text.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error that occurred while governing or executing a tool call.
///
/// | Variant | Origin | Retried? |
/// |---------|--------|----------|
/// | `NotFound` | registry lookup | no |
/// | `AccessDenied` | permission check | no |
/// | `RateLimited` | token bucket | no (quota refills over time) |
/// | `InvalidArguments` | schema validation | model may correct |
/// | `ArgumentParse` | malformed JSON from the model | model may correct |
/// | `PathEscape` | path guard | never |
/// | `Execution` | the tool itself | no |
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ToolError {
    #[error("tool '{name}' not found")]
    NotFound { name: String },

    #[error("access denied for tool '{tool}': missing permissions [{}]", .missing.join(", "))]
    AccessDenied { tool: String, missing: Vec<String> },

    #[error("rate limit exceeded for tool '{tool}'")]
    RateLimited { tool: String },

    #[error("invalid arguments for tool '{tool}': {reason}")]
    InvalidArguments { tool: String, reason: String },

    #[error("could not parse arguments for tool '{tool}': {reason}")]
    ArgumentParse { tool: String, reason: String },

    #[error("security error: path '{requested}' escapes the allowed root")]
    PathEscape { requested: String },

    #[error("{0}")]
    Execution(String),
}

/// Coarse classification of a [`ToolError`], kept alongside failed results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ToolErrorKind {
    NotFound,
    AccessDenied,
    RateLimited,
    InvalidArguments,
    ArgumentParse,
    PathEscape,
    Execution,
}

impl ToolError {
    pub fn not_found(name: impl Into<String>) -> Self {
        Self::NotFound { name: name.into() }
    }

    pub fn rate_limited(tool: impl Into<String>) -> Self {
        Self::RateLimited { tool: tool.into() }
    }

    pub fn access_denied(tool: impl Into<String>, missing: Vec<String>) -> Self {
        Self::AccessDenied {
            tool: tool.into(),
            missing,
        }
    }

    pub fn invalid_arguments(tool: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidArguments {
            tool: tool.into(),
            reason: reason.into(),
        }
    }

    pub fn execution(message: impl Into<String>) -> Self {
        Self::Execution(message.into())
    }

    pub fn kind(&self) -> ToolErrorKind {
        match self {
            Self::NotFound { .. } => ToolErrorKind::NotFound,
            Self::AccessDenied { .. } => ToolErrorKind::AccessDenied,
            Self::RateLimited { .. } => ToolErrorKind::RateLimited,
            Self::InvalidArguments { .. } => ToolErrorKind::InvalidArguments,
            Self::ArgumentParse { .. } => ToolErrorKind::ArgumentParse,
            Self::PathEscape { .. } => ToolErrorKind::PathEscape,
            Self::Execution(_) => ToolErrorKind::Execution,
        }
    }

    /// Governance rejections happen before the tool body runs.
    pub fn is_governance(&self) -> bool {
        matches!(
            self,
            Self::NotFound { .. } | Self::AccessDenied { .. } | Self::RateLimited { .. }
        )
    }
}

/// Result of a tool call in the boundary shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolResult {
    /// Whether the call succeeded
    pub success: bool,
    /// Tool output (null on failure)
    pub result: Option<serde_json::Value>,
    /// Error message (null on success)
    pub error: Option<String>,
    /// Classification of the failure; not part of the wire shape
    #[serde(skip)]
    kind: Option<ToolErrorKind>,
}

impl ToolResult {
    /// Create a successful result
    pub fn success(result: impl Into<serde_json::Value>) -> Self {
        Self {
            success: true,
            result: Some(result.into()),
            error: None,
            kind: None,
        }
    }

    /// Create a failed result from a tool error
    pub fn failure(error: &ToolError) -> Self {
        Self {
            success: false,
            result: None,
            error: Some(error.to_string()),
            kind: Some(error.kind()),
        }
    }

    pub fn is_success(&self) -> bool {
        self.success
    }

    pub fn error_kind(&self) -> Option<ToolErrorKind> {
        self.kind
    }

    /// Render the result as the text observation fed back to the model.
    pub fn to_observation(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| match &self.error {
            Some(error) => format!("error: {error}"),
            None => "error: unserializable tool result".to_string(),
        })
    }
}

impl From<Result<serde_json::Value, ToolError>> for ToolResult {
    fn from(outcome: Result<serde_json::Value, ToolError>) -> Self {
        match outcome {
            Ok(value) => Self::success(value),
            Err(e) => Self::failure(&e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_success_wire_shape() {
        let result = ToolResult::success(3);
        let wire = serde_json::to_value(&result).unwrap();
        assert_eq!(wire, json!({"success": true, "result": 3, "error": null}));
    }

    #[test]
    fn test_failure_wire_shape() {
        let result = ToolResult::failure(&ToolError::rate_limited("add"));
        let wire = serde_json::to_value(&result).unwrap();
        assert_eq!(
            wire,
            json!({"success": false, "result": null, "error": "rate limit exceeded for tool 'add'"})
        );
        assert_eq!(result.error_kind(), Some(ToolErrorKind::RateLimited));
    }

    #[test]
    fn test_access_denied_lists_missing_scopes() {
        let err = ToolError::access_denied(
            "list_files",
            vec!["filesystem:read".to_string(), "net:fetch".to_string()],
        );
        assert_eq!(
            err.to_string(),
            "access denied for tool 'list_files': missing permissions [filesystem:read, net:fetch]"
        );
        assert!(err.is_governance());
    }

    #[test]
    fn test_observation_is_wire_json() {
        let observation = ToolResult::success(json!(["a.txt"])).to_observation();
        assert_eq!(
            observation,
            r#"{"success":true,"result":["a.txt"],"error":null}"#
        );
    }

    #[test]
    fn test_from_outcome() {
        let ok: ToolResult = Ok(json!(1.5)).into();
        assert!(ok.is_success());

        let err: ToolResult = Err(ToolError::execution("Division by zero is not allowed.")).into();
        assert!(!err.is_success());
        assert_eq!(
            err.error.as_deref(),
            Some("Division by zero is not allowed.")
        );
        assert_eq!(err.error_kind(), Some(ToolErrorKind::Execution));
    }
}
