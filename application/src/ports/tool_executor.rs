//! Tool Executor port
//!
//! Defines the interface the agent loop uses to list and invoke tools.

use async_trait::async_trait;
use warden_domain::{ToolArguments, ToolResult, ToolSchema};

/// Port for governed tool execution
///
/// Implementations enforce permissions and rate limits and never fail:
/// every problem comes back as a failed [`ToolResult`].
/// Implementations (adapters) live in the infrastructure layer.
#[async_trait]
pub trait ToolExecutorPort: Send + Sync {
    /// Schemas of all tools, in registration order
    fn schemas(&self) -> Vec<ToolSchema>;

    /// Schemas of tools whose category is one of `categories`
    fn schemas_for_categories(&self, categories: &[String]) -> Vec<ToolSchema>;

    /// Check if a tool is available
    fn has_tool(&self, name: &str) -> bool;

    /// Rate-limited execution without a permission check
    async fn execute(&self, name: &str, args: &ToolArguments) -> ToolResult;

    /// Permission check, then rate-limited execution
    async fn execute_secure(
        &self,
        name: &str,
        args: &ToolArguments,
        granted: &[String],
    ) -> ToolResult;
}
