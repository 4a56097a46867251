//! Tool domain entities

use serde::{Deserialize, Serialize};

use super::value_objects::ToolError;

/// Arguments passed to a tool: a JSON object keyed by parameter name.
pub type ToolArguments = serde_json::Map<String, serde_json::Value>;

/// Definition of a tool that can be offered to the model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolDefinition {
    /// Unique name of the tool (e.g., "list_files")
    pub name: String,
    /// Human-readable description shown to the model
    pub description: String,
    /// Parameter specifications
    pub parameters: Vec<ToolParameter>,
    /// Permission scopes a caller must hold (e.g., "filesystem:read")
    #[serde(default)]
    pub permissions: Vec<String>,
    /// Grouping tag used to hand a tool subset to a specialist agent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
}

/// Parameter specification for a tool
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolParameter {
    /// Parameter name
    pub name: String,
    /// Parameter description
    pub description: String,
    /// Whether this parameter is required
    pub required: bool,
    /// Parameter type hint (e.g., "string", "path", "number")
    pub param_type: String,
    /// Allowed values, when the parameter is an enumeration
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enum_values: Option<Vec<String>>,
}

impl ToolDefinition {
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            parameters: Vec::new(),
            permissions: Vec::new(),
            category: None,
        }
    }

    pub fn with_parameter(mut self, param: ToolParameter) -> Self {
        self.parameters.push(param);
        self
    }

    pub fn with_permission(mut self, scope: impl Into<String>) -> Self {
        self.permissions.push(scope.into());
        self
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    pub fn parameter(&self, name: &str) -> Option<&ToolParameter> {
        self.parameters.iter().find(|p| p.name == name)
    }

    pub fn requires_permissions(&self) -> bool {
        !self.permissions.is_empty()
    }

    pub fn in_category(&self, category: &str) -> bool {
        self.category.as_deref() == Some(category)
    }
}

impl ToolParameter {
    pub fn new(name: impl Into<String>, description: impl Into<String>, required: bool) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            required,
            param_type: "string".to_string(),
            enum_values: None,
        }
    }

    pub fn with_type(mut self, param_type: impl Into<String>) -> Self {
        self.param_type = param_type.into();
        self
    }

    pub fn with_enum<I, S>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.enum_values = Some(values.into_iter().map(Into::into).collect());
        self
    }
}

/// Schema descriptor handed to the completion endpoint, one per tool.
///
/// `parameters` is a JSON-Schema object:
/// `{"type": "object", "properties": {..}, "required": [..]}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolSchema {
    pub name: String,
    pub description: String,
    pub parameters: serde_json::Value,
}

impl ToolSchema {
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        parameters: serde_json::Value,
    ) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            parameters,
        }
    }
}

/// A tool invocation requested by the model.
///
/// `arguments` is kept as the raw text the model emitted; it is only parsed
/// at dispatch time so malformed JSON can be fed back as an observation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolCall {
    /// Provider-assigned ID used to correlate the `tool` reply message
    pub id: String,
    /// Name of the tool to call
    pub name: String,
    /// Raw JSON argument text
    pub arguments: String,
}

impl ToolCall {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        arguments: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            arguments: arguments.into(),
        }
    }

    /// Parse the raw argument text into a JSON object.
    ///
    /// Empty text is treated as `{}`; anything that is not a JSON object is
    /// rejected.
    pub fn parse_arguments(&self) -> Result<ToolArguments, ToolError> {
        let raw = self.arguments.trim();
        if raw.is_empty() {
            return Ok(ToolArguments::new());
        }

        match serde_json::from_str::<serde_json::Value>(raw) {
            Ok(serde_json::Value::Object(map)) => Ok(map),
            Ok(other) => Err(ToolError::ArgumentParse {
                tool: self.name.clone(),
                reason: format!("expected a JSON object, got {other}"),
            }),
            Err(e) => Err(ToolError::ArgumentParse {
                tool: self.name.clone(),
                reason: e.to_string(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tool_definition() {
        let tool = ToolDefinition::new("list_files", "List files")
            .with_parameter(
                ToolParameter::new("path", "Directory", true).with_type("path"),
            )
            .with_permission("filesystem:read")
            .with_category("research");

        assert_eq!(tool.name, "list_files");
        assert!(tool.requires_permissions());
        assert!(tool.in_category("research"));
        assert!(!tool.in_category("writing"));
        assert_eq!(
            tool.parameter("path").map(|p| p.param_type.as_str()),
            Some("path")
        );
        assert!(tool.parameter("missing").is_none());
    }

    #[test]
    fn test_parameter_enum() {
        let param = ToolParameter::new("operation", "Op", true).with_enum(["add", "pow"]);
        assert_eq!(
            param.enum_values,
            Some(vec!["add".to_string(), "pow".to_string()])
        );
    }

    #[test]
    fn test_parse_arguments_object() {
        let call = ToolCall::new("call_1", "add", r#"{"a": 1, "b": 2}"#);
        let args = call.parse_arguments().unwrap();
        assert_eq!(args["a"], 1);
        assert_eq!(args["b"], 2);
    }

    #[test]
    fn test_parse_arguments_empty_is_empty_object() {
        let call = ToolCall::new("call_1", "list_files", "  ");
        assert!(call.parse_arguments().unwrap().is_empty());
    }

    #[test]
    fn test_parse_arguments_malformed() {
        let call = ToolCall::new("call_1", "add", "{a: 1");
        let err = call.parse_arguments().unwrap_err();
        assert!(matches!(err, ToolError::ArgumentParse { .. }));
        assert!(err.to_string().contains("add"));
    }

    #[test]
    fn test_parse_arguments_non_object() {
        let call = ToolCall::new("call_1", "add", "[1, 2]");
        let err = call.parse_arguments().unwrap_err();
        assert!(err.to_string().contains("expected a JSON object"));
    }
}
