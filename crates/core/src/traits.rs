//! Collaborator traits for pluggable backends
//!
//! The chat engine talks to its external collaborators exclusively through
//! these traits so that implementations can be swapped without code changes
//! and tests can run against fakes.

use async_trait::async_trait;

use crate::conversation::Turn;
use crate::error::Result;

/// One retrieved knowledge snippet
#[derive(Debug, Clone)]
pub struct Snippet {
    /// Snippet text
    pub text: String,
    /// Relevance score from the vector store
    pub score: f32,
}

/// Retrieval collaborator: per-tenant vector search over the knowledge base.
///
/// Implementations must namespace by tenant; one tenant's documents never
/// leak into another's results.
#[async_trait]
pub trait Retriever: Send + Sync {
    async fn search(&self, tenant_id: &str, query: &str, top_k: usize) -> Result<Vec<Snippet>>;
}

/// Completion collaborator: generates the assistant reply.
///
/// Treated as a black box; transient-failure handling is the backend's
/// concern, not the caller's.
#[async_trait]
pub trait LanguageModel: Send + Sync {
    async fn complete(&self, system_prompt: &str, turns: &[Turn]) -> Result<String>;
}
