//! Tool implementations and the governed registry
//!
//! - [`ToolRegistry`]: permission checks, rate limits, validation, dispatch
//! - [`CalculatorTool`], [`AddTool`]: arithmetic (category `analysis`)
//! - [`ListFilesTool`]: sandboxed directory listing (category `research`)

pub mod calculator;
pub mod file;
pub mod registry;
pub mod schema;

use std::sync::Arc;

pub use calculator::{AddTool, CalculatorTool};
pub use file::{FILESYSTEM_READ, ListFilesTool};
pub use registry::ToolRegistry;
pub use schema::{parameters_schema, tool_to_schema};

use crate::config::FileToolsConfig;
use crate::security::{PathGuard, PathGuardError};
use warden_domain::Tool;

/// Registry holding every built-in tool, rate-limited per `config`.
///
/// Fails only when the workspace root cannot be resolved.
pub fn builtin_registry(config: &FileToolsConfig) -> Result<ToolRegistry, PathGuardError> {
    let guard = PathGuard::new(&config.workspace_root)?;

    let tools: Vec<Arc<dyn Tool>> = vec![
        Arc::new(CalculatorTool::new()),
        Arc::new(AddTool::new()),
        Arc::new(ListFilesTool::with_guard(guard)),
    ];

    let mut registry = ToolRegistry::new();
    for tool in tools {
        let limit = config.rate_limit_for(tool.name());
        registry.register(tool, limit);
    }
    Ok(registry)
}

#[cfg(test)]
mod tests {
    use super::*;
    use warden_application::ports::tool_executor::ToolExecutorPort;

    #[test]
    fn test_builtin_registry() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = FileToolsConfig {
            workspace_root: dir.path().to_path_buf(),
            ..Default::default()
        };
        config.rate_limits.insert("add".to_string(), 2);

        let registry = builtin_registry(&config).unwrap();

        assert_eq!(
            registry.names(),
            vec!["execute_calculation", "add", "list_files"]
        );
        assert_eq!(registry.available_tokens("add"), Some(2.0));
        assert_eq!(registry.available_tokens("list_files"), Some(60.0));
        assert_eq!(registry.schemas().len(), 3);
    }

    #[test]
    fn test_missing_root_fails() {
        let dir = tempfile::tempdir().unwrap();
        let config = FileToolsConfig {
            workspace_root: dir.path().join("missing"),
            ..Default::default()
        };
        assert!(matches!(
            builtin_registry(&config),
            Err(PathGuardError::InvalidRoot { .. })
        ));
    }
}
