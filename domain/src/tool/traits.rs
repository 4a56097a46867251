//! Tool domain traits
//!
//! [`Tool`] is the capability interface every concrete tool implements; the
//! registry only ever holds tools behind it. [`ToolValidator`] is a pure
//! check of call arguments against a [`ToolDefinition`].

use async_trait::async_trait;

use super::entities::{ToolArguments, ToolDefinition};
use super::value_objects::ToolError;

/// A named, schema-described capability the model may invoke.
///
/// Implementations return `Err` for expected failures (bad input, I/O
/// errors, security rejections). The registry converts both errors and
/// panics into a failed [`ToolResult`](super::value_objects::ToolResult).
#[async_trait]
pub trait Tool: Send + Sync {
    /// Name, description, parameters, permissions and category
    fn definition(&self) -> &ToolDefinition;

    fn name(&self) -> &str {
        &self.definition().name
    }

    /// Permission scopes the caller must hold
    fn permissions(&self) -> &[String] {
        &self.definition().permissions
    }

    /// Run the tool with already-validated arguments
    async fn execute(&self, args: &ToolArguments) -> Result<serde_json::Value, ToolError>;
}

/// Validator for tool arguments
///
/// This is a pure domain trait that validates arguments
/// against their definitions without any I/O operations.
pub trait ToolValidator {
    /// Validate arguments against a tool definition
    fn validate(&self, args: &ToolArguments, definition: &ToolDefinition) -> Result<(), String>;
}

/// Default implementation of ToolValidator
///
/// Checks required parameters, rejects unknown ones, and enforces the
/// declared JSON type and enum membership of each provided value.
#[derive(Debug, Clone, Default)]
pub struct DefaultToolValidator;

impl ToolValidator for DefaultToolValidator {
    fn validate(&self, args: &ToolArguments, definition: &ToolDefinition) -> Result<(), String> {
        for param in &definition.parameters {
            if param.required && !args.contains_key(&param.name) {
                return Err(format!(
                    "Missing required parameter '{}' for tool '{}'",
                    param.name, definition.name
                ));
            }
        }

        for (arg_name, value) in args {
            let Some(param) = definition.parameter(arg_name) else {
                return Err(format!(
                    "Unknown parameter '{}' for tool '{}'",
                    arg_name, definition.name
                ));
            };

            if !type_matches(&param.param_type, value) {
                return Err(format!(
                    "Parameter '{}' must be of type {}",
                    arg_name, param.param_type
                ));
            }

            if let Some(allowed) = &param.enum_values {
                let matches = value
                    .as_str()
                    .is_some_and(|v| allowed.iter().any(|a| a == v));
                if !matches {
                    return Err(format!(
                        "Parameter '{}' must be one of: {}",
                        arg_name,
                        allowed.join(", ")
                    ));
                }
            }
        }

        Ok(())
    }
}

fn type_matches(param_type: &str, value: &serde_json::Value) -> bool {
    match param_type {
        "number" => value.is_number(),
        "integer" => value.is_i64() || value.is_u64(),
        "boolean" => value.is_boolean(),
        "array" => value.is_array(),
        "object" => value.is_object(),
        // "string", "path" and unknown hints
        _ => value.is_string(),
    }
}
