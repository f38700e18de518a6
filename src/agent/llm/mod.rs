//! LLM provider abstraction layer.
//!
//! A trait-based seam over the local model server, so the decomposer and the
//! vision analyzer can be driven by a scripted provider in tests.

mod ollama;
mod provider;
mod types;

pub use ollama::OllamaProvider;
pub use provider::{CompletionOptions, LlmError, LlmProvider};
pub use types::{CompletionResponse, FinishReason, Message, MessageRole};

#[cfg(test)]
pub(crate) use provider::testing;
