//! Path sanitization for filesystem tools.
//!
//! [`PathGuard`] resolves model-supplied paths against an allowed root and
//! rejects anything that lands outside it, after `..` and symlink
//! resolution. Containment is checked component-wise, so `/srv/root-other`
//! is not inside `/srv/root`.

use std::fs;
use std::path::{Component, Path, PathBuf};

use thiserror::Error;
use warden_domain::ToolError;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum PathGuardError {
    #[error("security error: path '{requested}' escapes the allowed root")]
    Escape { requested: String },

    #[error("invalid root '{root}': {reason}")]
    InvalidRoot { root: String, reason: String },
}

impl From<PathGuardError> for ToolError {
    fn from(e: PathGuardError) -> Self {
        match e {
            PathGuardError::Escape { requested } => ToolError::PathEscape { requested },
            other => ToolError::execution(other.to_string()),
        }
    }
}

/// Guard bound to one canonical root directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathGuard {
    root: PathBuf,
}

impl PathGuard {
    /// Canonicalize `root`. It must exist.
    pub fn new(root: impl AsRef<Path>) -> Result<Self, PathGuardError> {
        let root = root.as_ref();
        let canonical = fs::canonicalize(root).map_err(|e| PathGuardError::InvalidRoot {
            root: root.display().to_string(),
            reason: e.to_string(),
        })?;
        Ok(Self { root: canonical })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Resolve `requested` to an absolute path inside the root.
    ///
    /// Empty input and `.` resolve to the root itself. The target does not
    /// need to exist: the deepest existing ancestor is canonicalized and the
    /// rest is appended, with any `..` in that remainder rejected.
    pub fn resolve(&self, requested: &str) -> Result<PathBuf, PathGuardError> {
        let trimmed = requested.trim();
        if trimmed.is_empty() || trimmed == "." {
            return Ok(self.root.clone());
        }

        let escape = || PathGuardError::Escape {
            requested: requested.to_string(),
        };

        let requested_path = Path::new(trimmed);
        let candidate = if requested_path.is_absolute() {
            requested_path.to_path_buf()
        } else {
            self.root.join(requested_path)
        };

        let (existing, canonical) = candidate
            .ancestors()
            .find_map(|ancestor| fs::canonicalize(ancestor).ok().map(|c| (ancestor, c)))
            .ok_or_else(escape)?;

        let mut resolved = canonical;
        let tail = candidate.strip_prefix(existing).map_err(|_| escape())?;
        for component in tail.components() {
            match component {
                Component::Normal(part) => resolved.push(part),
                Component::CurDir => {}
                Component::ParentDir | Component::RootDir | Component::Prefix(_) => {
                    return Err(escape());
                }
            }
        }

        if resolved.starts_with(&self.root) {
            Ok(resolved)
        } else {
            Err(escape())
        }
    }
}

/// One-shot form of [`PathGuard::resolve`].
pub fn resolve(root: impl AsRef<Path>, requested: &str) -> Result<PathBuf, PathGuardError> {
    PathGuard::new(root)?.resolve(requested)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn setup() -> (TempDir, PathGuard) {
        let dir = TempDir::new().unwrap();
        fs::create_dir(dir.path().join("reports")).unwrap();
        fs::write(dir.path().join("reports/q1.txt"), "q1").unwrap();
        let guard = PathGuard::new(dir.path()).unwrap();
        (dir, guard)
    }

    #[test]
    fn test_dot_and_empty_resolve_to_root() {
        let (_dir, guard) = setup();
        assert_eq!(guard.resolve(".").unwrap(), guard.root());
        assert_eq!(guard.resolve("").unwrap(), guard.root());
        assert_eq!(guard.resolve("  ").unwrap(), guard.root());
    }

    #[test]
    fn test_existing_file_inside_root() {
        let (_dir, guard) = setup();
        let resolved = guard.resolve("reports/q1.txt").unwrap();
        assert_eq!(resolved, guard.root().join("reports").join("q1.txt"));
    }

    #[test]
    fn test_inner_dotdot_that_stays_inside_is_allowed() {
        let (_dir, guard) = setup();
        let resolved = guard.resolve("reports/../reports/q1.txt").unwrap();
        assert_eq!(resolved, guard.root().join("reports").join("q1.txt"));
    }

    #[test]
    fn test_parent_traversal_is_rejected() {
        let (_dir, guard) = setup();
        for attempt in ["..", "../", "../../etc/passwd", "reports/../../x"] {
            let err = guard.resolve(attempt).unwrap_err();
            assert_eq!(
                err,
                PathGuardError::Escape {
                    requested: attempt.to_string()
                },
                "{attempt} should escape"
            );
        }
    }

    #[test]
    fn test_dotdot_in_nonexistent_tail_is_rejected() {
        let (_dir, guard) = setup();
        assert!(guard.resolve("missing/../../../etc").is_err());
        assert!(guard.resolve("missing/../reports").is_err());
    }

    #[test]
    fn test_nonexistent_target_inside_root() {
        let (_dir, guard) = setup();
        let resolved = guard.resolve("new/dir/file.txt").unwrap();
        assert_eq!(
            resolved,
            guard.root().join("new").join("dir").join("file.txt")
        );
    }

    #[test]
    fn test_absolute_paths() {
        let (_dir, guard) = setup();
        let inside = guard.root().join("reports");
        assert_eq!(guard.resolve(inside.to_str().unwrap()).unwrap(), inside);

        let outside = TempDir::new().unwrap();
        assert!(guard.resolve(outside.path().to_str().unwrap()).is_err());
    }

    #[test]
    fn test_sibling_with_common_prefix_is_outside() {
        let parent = TempDir::new().unwrap();
        fs::create_dir(parent.path().join("root")).unwrap();
        fs::create_dir(parent.path().join("root-other")).unwrap();
        let guard = PathGuard::new(parent.path().join("root")).unwrap();

        let sibling = guard.root().with_file_name("root-other");
        assert!(guard.resolve(sibling.to_str().unwrap()).is_err());
    }

    #[cfg(unix)]
    #[test]
    fn test_symlink_escape_is_rejected() {
        let (dir, guard) = setup();
        let outside = TempDir::new().unwrap();
        std::os::unix::fs::symlink(outside.path(), dir.path().join("link"))
            .unwrap();

        assert!(guard.resolve("link").is_err());
        assert!(guard.resolve("link/anything").is_err());
    }

    #[test]
    fn test_missing_root_is_invalid() {
        let dir = TempDir::new().unwrap();
        let err = PathGuard::new(dir.path().join("nope")).unwrap_err();
        assert!(matches!(err, PathGuardError::InvalidRoot { .. }));
    }

    #[test]
    fn test_escape_converts_to_tool_error() {
        let (_dir, guard) = setup();
        let err: ToolError = guard.resolve("../x").unwrap_err().into();
        assert!(matches!(err, ToolError::PathEscape { .. }));
        assert!(err.to_string().starts_with("security error"));
    }
}
