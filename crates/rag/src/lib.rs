//! Retrieval for the chat widget backend
//!
//! Dense vector search over per-tenant knowledge via Qdrant. The internals
//! of indexing and embedding quality are the hosted service's concern; this
//! crate is the thin, tenant-namespaced client the chat engine calls.

pub mod embeddings;
pub mod retriever;

pub use embeddings::{EmbeddingConfig, QueryEmbedder};
pub use retriever::{KnowledgeRetriever, RetrieverConfig};

use thiserror::Error;

/// RAG errors
#[derive(Error, Debug)]
pub enum RagError {
    #[error("Connection error: {0}")]
    Connection(String),

    #[error("Search error: {0}")]
    Search(String),

    #[error("Vector store error: {0}")]
    VectorStore(String),
}

impl From<RagError> for chat_widget_core::Error {
    fn from(err: RagError) -> Self {
        chat_widget_core::Error::Retrieval(err.to_string())
    }
}
