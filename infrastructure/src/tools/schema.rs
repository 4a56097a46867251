//! JSON Schema tool converter.
//!
//! Turns a [`ToolDefinition`] into the [`ToolSchema`] descriptor sent to the
//! completion endpoint.

use serde_json::{Map, Value, json};
use warden_domain::{ToolDefinition, ToolSchema};

/// Map a parameter type hint to a JSON Schema type.
///
/// - `"string"`, `"path"` → `"string"`
/// - `"number"`, `"integer"`, `"boolean"`, `"array"`, `"object"` → as is
/// - anything else → `"string"`
fn json_type(param_type: &str) -> &'static str {
    match param_type {
        "number" => "number",
        "integer" => "integer",
        "boolean" => "boolean",
        "array" => "array",
        "object" => "object",
        _ => "string",
    }
}

/// Build the `{"type": "object", "properties": .., "required": ..}` object.
pub fn parameters_schema(tool: &ToolDefinition) -> Value {
    let mut properties = Map::new();
    let mut required = Vec::new();

    for param in &tool.parameters {
        let mut prop = Map::new();
        prop.insert("type".to_string(), json!(json_type(&param.param_type)));
        prop.insert("description".to_string(), json!(param.description));
        if let Some(values) = &param.enum_values {
            prop.insert("enum".to_string(), json!(values));
        }
        properties.insert(param.name.clone(), Value::Object(prop));

        if param.required {
            required.push(json!(param.name));
        }
    }

    json!({
        "type": "object",
        "properties": properties,
        "required": required,
    })
}

pub fn tool_to_schema(tool: &ToolDefinition) -> ToolSchema {
    ToolSchema::new(&tool.name, &tool.description, parameters_schema(tool))
}
