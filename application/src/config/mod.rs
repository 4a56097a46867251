//! Application-level configuration.
//!
//! This module provides configuration types that control how use cases behave:
//!
//! - [`AgentConfig`]: per-agent loop control (model, steps, tools, permissions)
//! - [`SpecialistProfile`]: fixed researcher / analyst / writer profiles

pub mod agent_config;
pub mod specialists;

pub use agent_config::AgentConfig;
pub use specialists::{ANALYST, RESEARCHER, SpecialistProfile, WRITER, default_pipeline};
