//! Conversation domain.
//!
//! - [`entities::Message`]: a single message within a run's conversation
//! - [`entities::Conversation`]: append-only message history of one run
//! - [`response::CompletionResponse`]: one model turn (text or tool calls)

pub mod entities;
pub mod response;

pub use entities::{Conversation, Message, Role};
pub use response::{CompletionResponse, TokenUsage};
