//! Tool Registry
//!
//! The [`ToolRegistry`] owns every tool available to agents, each paired with
//! its own token-bucket [`RateLimiter`], and implements [`ToolExecutorPort`].
//!
//! # Usage
//!
//! ```ignore
//! use warden_infrastructure::tools::{AddTool, ToolRegistry};
//!
//! let registry = ToolRegistry::new().with_tool(Arc::new(AddTool::new()), 60);
//!
//! let args = json!({"a": 1, "b": 2}).as_object().cloned().unwrap();
//! let result = registry.execute("add", &args).await;
//! assert_eq!(result.result, Some(json!(3)));
//! ```
//!
//! # Execution Order
//!
//! `execute_secure` checks, in order, and stops at the first failure:
//!
//! 1. the tool exists
//! 2. the caller holds every required permission (no token is spent on denial)
//! 3. a rate-limit token is available
//! 4. the arguments match the tool's parameters
//! 5. the tool body runs; errors and panics become failed results

use std::any::Any;
use std::collections::HashMap;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use async_trait::async_trait;
use futures::FutureExt;
use tracing::{debug, info, warn};
use warden_application::ports::tool_executor::ToolExecutorPort;
use warden_domain::{
    Clock, DefaultToolValidator, RateLimiter, SystemClock, Tool, ToolArguments, ToolError,
    ToolResult, ToolSchema, ToolValidator, missing_permissions,
};

use super::schema::tool_to_schema;

struct RegisteredTool {
    tool: Arc<dyn Tool>,
    limiter: RateLimiter,
}

/// Registry of governed tools
///
/// Iteration order is registration order. Registering a name twice replaces
/// the tool and its limiter but keeps the original position.
pub struct ToolRegistry {
    entries: HashMap<String, RegisteredTool>,
    order: Vec<String>,
    validator: DefaultToolValidator,
    clock: Arc<dyn Clock>,
}

impl ToolRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self::with_clock(Arc::new(SystemClock))
    }

    /// Empty registry whose rate limiters read time from `clock`
    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        Self {
            entries: HashMap::new(),
            order: Vec::new(),
            validator: DefaultToolValidator,
            clock,
        }
    }

    /// Register a tool allowed `calls_per_minute` calls per minute
    pub fn register(&mut self, tool: Arc<dyn Tool>, calls_per_minute: u32) {
        let name = tool.name().to_string();
        let limiter = RateLimiter::with_clock(f64::from(calls_per_minute), self.clock.clone());

        let replaced = self
            .entries
            .insert(name.clone(), RegisteredTool { tool, limiter })
            .is_some();
        if !replaced {
            self.order.push(name.clone());
        }

        info!(
            tool = %name,
            rate_limit = calls_per_minute,
            replaced,
            "Registered tool"
        );
    }

    /// Builder form of [`register`](Self::register)
    pub fn with_tool(mut self, tool: Arc<dyn Tool>, calls_per_minute: u32) -> Self {
        self.register(tool, calls_per_minute);
        self
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn Tool>> {
        self.entries.get(name).map(|entry| entry.tool.clone())
    }

    /// Tool names in registration order
    pub fn names(&self) -> Vec<&str> {
        self.order.iter().map(String::as_str).collect()
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Tokens currently left in a tool's bucket
    pub fn available_tokens(&self, name: &str) -> Option<f64> {
        self.entries
            .get(name)
            .map(|entry| entry.limiter.available())
    }

    fn tools_in_order(&self) -> impl Iterator<Item = &Arc<dyn Tool>> {
        self.order
            .iter()
            .filter_map(|name| self.entries.get(name))
            .map(|entry| &entry.tool)
    }

    async fn run(&self, entry: &RegisteredTool, name: &str, args: &ToolArguments) -> ToolResult {
        if !entry.limiter.try_acquire() {
            warn!(tool = %name, "Rate limit exceeded");
            return ToolResult::failure(&ToolError::rate_limited(name));
        }

        if let Err(reason) = self.validator.validate(args, entry.tool.definition()) {
            debug!(tool = %name, %reason, "Rejected tool arguments");
            return ToolResult::failure(&ToolError::invalid_arguments(name, reason));
        }

        let outcome = AssertUnwindSafe(entry.tool.execute(args))
            .catch_unwind()
            .await;

        match outcome {
            Ok(Ok(value)) => {
                debug!(tool = %name, "Tool succeeded");
                ToolResult::success(value)
            }
            Ok(Err(e)) => {
                debug!(tool = %name, error = %e, "Tool failed");
                ToolResult::failure(&e)
            }
            Err(payload) => {
                let message = panic_message(payload.as_ref());
                warn!(tool = %name, panic = %message, "Tool panicked");
                ToolResult::failure(&ToolError::execution(format!(
                    "tool '{}' panicked: {}",
                    name, message
                )))
            }
        }
    }
}

impl Default for ToolRegistry {
    fn default() -> Self {
        Self::new()
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}

#[async_trait]
impl ToolExecutorPort for ToolRegistry {
    fn schemas(&self) -> Vec<ToolSchema> {
        self.tools_in_order()
            .map(|tool| tool_to_schema(tool.definition()))
            .collect()
    }

    fn schemas_for_categories(&self, categories: &[String]) -> Vec<ToolSchema> {
        self.tools_in_order()
            .filter(|tool| {
                categories
                    .iter()
                    .any(|category| tool.definition().in_category(category))
            })
            .map(|tool| tool_to_schema(tool.definition()))
            .collect()
    }

    fn has_tool(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    async fn execute(&self, name: &str, args: &ToolArguments) -> ToolResult {
        let Some(entry) = self.entries.get(name) else {
            warn!(tool = %name, "Unknown tool requested");
            return ToolResult::failure(&ToolError::not_found(name));
        };
        self.run(entry, name, args).await
    }

    async fn execute_secure(
        &self,
        name: &str,
        args: &ToolArguments,
        granted: &[String],
    ) -> ToolResult {
        let Some(entry) = self.entries.get(name) else {
            warn!(tool = %name, "Unknown tool requested");
            return ToolResult::failure(&ToolError::not_found(name));
        };

        let missing = missing_permissions(entry.tool.permissions(), granted);
        if !missing.is_empty() {
            warn!(tool = %name, missing = ?missing, "Access denied");
            return ToolResult::failure(&ToolError::access_denied(name, missing));
        }

        self.run(entry, name, args).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::AddTool;
    use serde_json::{Value, json};
    use std::time::Duration;
    use warden_domain::{ManualClock, ToolDefinition, ToolErrorKind, ToolParameter};

    fn args(value: Value) -> ToolArguments {
        value.as_object().cloned().unwrap()
    }

    struct GuardedTool {
        definition: ToolDefinition,
    }

    impl GuardedTool {
        fn new() -> Self {
            Self {
                definition: ToolDefinition::new("read_secret", "Read a secret")
                    .with_permission("secrets:read")
                    .with_category("research"),
            }
        }
    }

    #[async_trait]
    impl Tool for GuardedTool {
        fn definition(&self) -> &ToolDefinition {
            &self.definition
        }

        async fn execute(&self, _args: &ToolArguments) -> Result<Value, ToolError> {
            Ok(json!("hunter2"))
        }
    }

    struct PanickingTool {
        definition: ToolDefinition,
    }

    #[async_trait]
    impl Tool for PanickingTool {
        fn definition(&self) -> &ToolDefinition {
            &self.definition
        }

        async fn execute(&self, _args: &ToolArguments) -> Result<Value, ToolError> {
            panic!("boom");
        }
    }

    #[tokio::test]
    async fn test_add_rate_limited_end_to_end() {
        let clock = Arc::new(ManualClock::new());
        let registry = ToolRegistry::with_clock(clock.clone())
            .with_tool(Arc::new(AddTool::new()), 2);
        let call = args(json!({"a": 1, "b": 2}));

        let first = registry.execute("add", &call).await;
        let second = registry.execute("add", &call).await;
        let third = registry.execute("add", &call).await;

        assert!(first.is_success());
        assert_eq!(first.result, Some(json!(3)));
        assert_eq!(second.result, Some(json!(3)));
        assert!(!third.is_success());
        assert_eq!(third.error_kind(), Some(ToolErrorKind::RateLimited));
        assert!(third.error.as_deref().unwrap().contains("rate limit"));
    }

    #[tokio::test]
    async fn test_tokens_refill_over_time() {
        let clock = Arc::new(ManualClock::new());
        let registry = ToolRegistry::with_clock(clock.clone())
            .with_tool(Arc::new(AddTool::new()), 2);
        let call = args(json!({"a": 1, "b": 1}));

        registry.execute("add", &call).await;
        registry.execute("add", &call).await;
        assert!(!registry.execute("add", &call).await.is_success());

        clock.advance(Duration::from_secs(30));
        assert!(registry.execute("add", &call).await.is_success());
    }

    #[tokio::test]
    async fn test_unknown_tool() {
        let registry = ToolRegistry::new();
        let result = registry.execute("nope", &ToolArguments::new()).await;
        assert_eq!(result.error_kind(), Some(ToolErrorKind::NotFound));

        let secure = registry
            .execute_secure("nope", &ToolArguments::new(), &[])
            .await;
        assert_eq!(secure.error_kind(), Some(ToolErrorKind::NotFound));
    }

    #[tokio::test]
    async fn test_access_denied_does_not_consume_token() {
        let clock = Arc::new(ManualClock::new());
        let registry =
            ToolRegistry::with_clock(clock).with_tool(Arc::new(GuardedTool::new()), 5);
        let before = registry.available_tokens("read_secret").unwrap();

        let denied = registry
            .execute_secure("read_secret", &ToolArguments::new(), &[])
            .await;

        assert_eq!(denied.error_kind(), Some(ToolErrorKind::AccessDenied));
        assert!(denied.error.as_deref().unwrap().contains("secrets:read"));
        assert_eq!(registry.available_tokens("read_secret").unwrap(), before);

        let granted = registry
            .execute_secure(
                "read_secret",
                &ToolArguments::new(),
                &["secrets:read".to_string()],
            )
            .await;
        assert!(granted.is_success());
        assert!(registry.available_tokens("read_secret").unwrap() < before);
    }

    #[tokio::test]
    async fn test_execute_skips_permission_check() {
        let registry = ToolRegistry::new().with_tool(Arc::new(GuardedTool::new()), 5);
        let result = registry.execute("read_secret", &ToolArguments::new()).await;
        assert!(result.is_success());
    }

    #[tokio::test]
    async fn test_panic_becomes_failure() {
        let tool = PanickingTool {
            definition: ToolDefinition::new("explode", "Always panics"),
        };
        let registry = ToolRegistry::new().with_tool(Arc::new(tool), 5);

        let result = registry.execute("explode", &ToolArguments::new()).await;

        assert_eq!(result.error_kind(), Some(ToolErrorKind::Execution));
        assert!(result.error.as_deref().unwrap().contains("boom"));
    }

    #[tokio::test]
    async fn test_invalid_arguments_are_reported() {
        let registry = ToolRegistry::new().with_tool(Arc::new(AddTool::new()), 5);

        let missing = registry.execute("add", &args(json!({"a": 1}))).await;
        assert_eq!(missing.error_kind(), Some(ToolErrorKind::InvalidArguments));

        let wrong_type = registry
            .execute("add", &args(json!({"a": "one", "b": 2})))
            .await;
        assert_eq!(
            wrong_type.error_kind(),
            Some(ToolErrorKind::InvalidArguments)
        );
    }

    #[test]
    fn test_registration_order_and_replacement() {
        let mut registry = ToolRegistry::new();
        registry.register(Arc::new(GuardedTool::new()), 5);
        registry.register(Arc::new(AddTool::new()), 5);
        registry.register(Arc::new(GuardedTool::new()), 1);

        assert_eq!(registry.names(), vec!["read_secret", "add"]);
        assert_eq!(registry.len(), 2);
        assert_eq!(registry.available_tokens("read_secret"), Some(1.0));

        let schemas = registry.schemas();
        assert_eq!(schemas[0].name, "read_secret");
        assert_eq!(schemas[1].name, "add");
    }

    #[test]
    fn test_schemas_for_categories() {
        let echo = ToolDefinition::new("echo", "Echo")
            .with_parameter(ToolParameter::new("text", "Text", true));
        let registry = ToolRegistry::new()
            .with_tool(Arc::new(GuardedTool::new()), 5)
            .with_tool(Arc::new(AddTool::new()), 5)
            .with_tool(Arc::new(PanickingTool { definition: echo }), 5);

        let research = registry.schemas_for_categories(&["research".to_string()]);
        assert_eq!(research.len(), 1);
        assert_eq!(research[0].name, "read_secret");

        let analysis = registry.schemas_for_categories(&["analysis".to_string()]);
        assert_eq!(analysis[0].name, "add");

        assert!(registry.schemas_for_categories(&[]).is_empty());
        assert!(registry.has_tool("echo"));
        assert!(registry.get("echo").is_some());
    }
}
