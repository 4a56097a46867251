//! Arithmetic tools: execute_calculation, add

use async_trait::async_trait;
use serde_json::{Number, Value};
use warden_domain::{Tool, ToolArguments, ToolDefinition, ToolError, ToolParameter};

/// Tool name constants
pub const EXECUTE_CALCULATION: &str = "execute_calculation";
pub const ADD: &str = "add";

const ANALYSIS: &str = "analysis";
const OPERATIONS: [&str; 5] = ["add", "subtract", "multiply", "divide", "pow"];

/// Basic arithmetic over two operands
pub struct CalculatorTool {
    definition: ToolDefinition,
}

impl CalculatorTool {
    pub fn new() -> Self {
        let definition = ToolDefinition::new(
            EXECUTE_CALCULATION,
            "Executes basic arithmetic operations (add, subtract, multiply, divide, pow).",
        )
        .with_parameter(
            ToolParameter::new("operation", "The operation to perform.", true)
                .with_enum(OPERATIONS),
        )
        .with_parameter(
            ToolParameter::new("operand_a", "The first operand.", true).with_type("number"),
        )
        .with_parameter(
            ToolParameter::new("operand_b", "The second operand.", true).with_type("number"),
        )
        .with_category(ANALYSIS);

        Self { definition }
    }
}

impl Default for CalculatorTool {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Tool for CalculatorTool {
    fn definition(&self) -> &ToolDefinition {
        &self.definition
    }

    async fn execute(&self, args: &ToolArguments) -> Result<Value, ToolError> {
        let operation = args
            .get("operation")
            .and_then(Value::as_str)
            .ok_or_else(|| {
                ToolError::invalid_arguments(EXECUTE_CALCULATION, "missing operation")
            })?;
        let a = operand(args, "operand_a")?;
        let b = operand(args, "operand_b")?;

        if let (Some(x), Some(y)) = (a.as_i64(), b.as_i64()) {
            let exact = match operation {
                "add" => x.checked_add(y),
                "subtract" => x.checked_sub(y),
                "multiply" => x.checked_mul(y),
                _ => None,
            };
            if let Some(value) = exact {
                return Ok(Value::from(value));
            }
        }

        let (x, y) = (as_f64(a), as_f64(b));
        let result = match operation {
            "add" => x + y,
            "subtract" => x - y,
            "multiply" => x * y,
            "divide" => {
                if y == 0.0 {
                    return Err(ToolError::execution("Division by zero is not allowed."));
                }
                x / y
            }
            "pow" => x.powf(y),
            other => {
                return Err(ToolError::execution(format!(
                    "Unsupported operation: {}",
                    other
                )));
            }
        };

        finite(result)
    }
}

/// Integer addition of two numbers; the result is an integer when both
/// inputs are integers.
pub struct AddTool {
    definition: ToolDefinition,
}

impl AddTool {
    pub fn new() -> Self {
        let definition = ToolDefinition::new(ADD, "Adds two numbers and returns the sum.")
            .with_parameter(
                ToolParameter::new("a", "The first number.", true).with_type("number"),
            )
            .with_parameter(
                ToolParameter::new("b", "The second number.", true).with_type("number"),
            )
            .with_category(ANALYSIS);

        Self { definition }
    }
}

impl Default for AddTool {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Tool for AddTool {
    fn definition(&self) -> &ToolDefinition {
        &self.definition
    }

    async fn execute(&self, args: &ToolArguments) -> Result<Value, ToolError> {
        let a = operand(args, "a")?;
        let b = operand(args, "b")?;

        if let (Some(x), Some(y)) = (a.as_i64(), b.as_i64())
            && let Some(sum) = x.checked_add(y)
        {
            return Ok(Value::from(sum));
        }
        finite(as_f64(a) + as_f64(b))
    }
}

fn operand<'a>(args: &'a ToolArguments, name: &str) -> Result<&'a Number, ToolError> {
    match args.get(name) {
        Some(Value::Number(n)) => Ok(n),
        _ => Err(ToolError::execution(format!("'{}' must be a number", name))),
    }
}

fn as_f64(n: &Number) -> f64 {
    n.as_f64().unwrap_or(f64::NAN)
}

fn finite(value: f64) -> Result<Value, ToolError> {
    Number::from_f64(value)
        .map(Value::Number)
        .ok_or_else(|| ToolError::execution(format!("Result is not a finite number: {}", value)))
}
