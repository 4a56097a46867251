//! Governance primitives applied around every tool call.
//!
//! - [`RateLimiter`]: per-tool token bucket
//! - [`missing_permissions`]: permission-scope set difference

pub mod permission;
pub mod rate_limiter;

pub use permission::missing_permissions;
pub use rate_limiter::RateLimiter;
