//! Completion transport adapters

pub mod openai;
pub mod retry;

pub use openai::OpenAiTransport;
pub use retry::{RetryPolicy, RetryableFailure};
