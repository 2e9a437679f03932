//! LLM integration for the chat widget backend
//!
//! A thin client for an OpenAI-compatible chat completions endpoint, plus
//! the prompt builder that turns a tenant profile and retrieved snippets
//! into the system prompt.

pub mod backend;
pub mod prompt;

pub use backend::{CompletionBackend, CompletionConfig};
pub use prompt::build_system_prompt;

use thiserror::Error;

/// LLM errors
#[derive(Error, Debug)]
pub enum LlmError {
    #[error("API error: {0}")]
    Api(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Configuration error: {0}")]
    Configuration(String),
}

impl From<reqwest::Error> for LlmError {
    fn from(err: reqwest::Error) -> Self {
        LlmError::Network(err.to_string())
    }
}

impl From<LlmError> for chat_widget_core::Error {
    fn from(err: LlmError) -> Self {
        chat_widget_core::Error::Completion(err.to_string())
    }
}
