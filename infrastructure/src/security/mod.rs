//! Filesystem security guards.

pub mod path_guard;

pub use path_guard::{PathGuard, PathGuardError};
