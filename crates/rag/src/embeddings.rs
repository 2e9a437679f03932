//! Query embeddings
//!
//! Hash-based embedding matching the scheme the ingestion side uses when
//! indexing tenant documents. No model download, deterministic, cheap.

/// Embedding configuration
#[derive(Debug, Clone)]
pub struct EmbeddingConfig {
    /// Embedding dimension; must match the Qdrant collection
    pub embedding_dim: usize,
    /// Normalize to unit length
    pub normalize: bool,
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            embedding_dim: 384,
            normalize: true,
        }
    }
}

/// Deterministic query embedder
pub struct QueryEmbedder {
    config: EmbeddingConfig,
}

impl QueryEmbedder {
    pub fn new(config: EmbeddingConfig) -> Self {
        Self { config }
    }

    /// Embed a query string
    pub fn embed(&self, text: &str) -> Vec<f32> {
        let mut embedding = vec![0.0f32; self.config.embedding_dim];

        for (i, c) in text.to_lowercase().chars().enumerate() {
            let idx = (c as usize + i) % self.config.embedding_dim;
            embedding[idx] += 1.0;
        }

        if self.config.normalize {
            let norm: f32 = embedding.iter().map(|x| x * x).sum::<f32>().sqrt();
            if norm > 0.0 {
                for v in &mut embedding {
                    *v /= norm;
                }
            }
        }

        embedding
    }

    pub fn dim(&self) -> usize {
        self.config.embedding_dim
    }
}
