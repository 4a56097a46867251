//! Filesystem tools: list_files

use async_trait::async_trait;
use serde_json::Value;
use std::fs;
use std::path::Path;
use tracing::debug;
use warden_domain::{Tool, ToolArguments, ToolDefinition, ToolError, ToolParameter};

use crate::security::{PathGuard, PathGuardError};

/// Tool name constants
pub const LIST_FILES: &str = "list_files";

/// Permission scope required by read-only filesystem tools
pub const FILESYSTEM_READ: &str = "filesystem:read";

/// Lists directory entries below a fixed workspace root
pub struct ListFilesTool {
    definition: ToolDefinition,
    guard: PathGuard,
}

impl ListFilesTool {
    pub fn new(root: impl AsRef<Path>) -> Result<Self, PathGuardError> {
        Ok(Self::with_guard(PathGuard::new(root)?))
    }

    pub fn with_guard(guard: PathGuard) -> Self {
        let definition = ToolDefinition::new(
            LIST_FILES,
            "Lists files in a specific directory. Requires filesystem:read permission.",
        )
        .with_parameter(
            ToolParameter::new(
                "path",
                "The directory path to list files from, relative to the workspace root.",
                false,
            )
            .with_type("path"),
        )
        .with_permission(FILESYSTEM_READ)
        .with_category("research");

        Self { definition, guard }
    }

    pub fn root(&self) -> &Path {
        self.guard.root()
    }
}

#[async_trait]
impl Tool for ListFilesTool {
    fn definition(&self) -> &ToolDefinition {
        &self.definition
    }

    async fn execute(&self, args: &ToolArguments) -> Result<Value, ToolError> {
        let requested = args.get("path").and_then(Value::as_str).unwrap_or(".");
        let dir = self.guard.resolve(requested)?;
        debug!(path = %dir.display(), "Listing directory");

        if !dir.is_dir() {
            return Err(ToolError::execution(format!(
                "'{}' is not a directory",
                requested
            )));
        }

        let entries = fs::read_dir(&dir)
            .map_err(|e| ToolError::execution(format!("Failed to list '{}': {}", requested, e)))?;

        let mut names = Vec::new();
        for entry in entries {
            let entry = entry
                .map_err(|e| ToolError::execution(format!("Failed to read entry: {}", e)))?;
            names.push(entry.file_name().to_string_lossy().into_owned());
        }
        names.sort();

        Ok(Value::from(names))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;
    use warden_domain::ToolErrorKind;

    fn workspace() -> TempDir {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("b.txt"), "b").unwrap();
        fs::write(dir.path().join("a.txt"), "a").unwrap();
        fs::create_dir(dir.path().join("docs")).unwrap();
        fs::write(dir.path().join("docs").join("guide.md"), "#")
            .unwrap();
        dir
    }

    fn args(value: Value) -> ToolArguments {
        value.as_object().cloned().unwrap()
    }

    #[tokio::test]
    async fn test_lists_root_by_default() {
        let dir = workspace();
        let tool = ListFilesTool::new(dir.path()).unwrap();

        let listed = tool.execute(&ToolArguments::new()).await.unwrap();

        assert_eq!(listed, json!(["a.txt", "b.txt", "docs"]));
    }

    #[tokio::test]
    async fn test_lists_subdirectory() {
        let dir = workspace();
        let tool = ListFilesTool::new(dir.path()).unwrap();

        let listed = tool.execute(&args(json!({"path": "docs"}))).await.unwrap();

        assert_eq!(listed, json!(["guide.md"]));
    }

    #[tokio::test]
    async fn test_traversal_is_rejected() {
        let dir = workspace();
        let tool = ListFilesTool::new(dir.path()).unwrap();

        let err = tool
            .execute(&args(json!({"path": "../.."})))
            .await
            .unwrap_err();

        assert_eq!(err.kind(), ToolErrorKind::PathEscape);
    }

    #[tokio::test]
    async fn test_file_is_not_a_directory() {
        let dir = workspace();
        let tool = ListFilesTool::new(dir.path()).unwrap();

        let err = tool
            .execute(&args(json!({"path": "a.txt"})))
            .await
            .unwrap_err();

        assert!(err.to_string().contains("not a directory"));
    }

    #[test]
    fn test_definition() {
        let dir = workspace();
        let tool = ListFilesTool::new(dir.path()).unwrap();
        assert_eq!(tool.permissions(), &[FILESYSTEM_READ.to_string()]);
        assert!(tool.definition().in_category("research"));
        assert!(!tool.definition().parameters[0].required);
    }
}
