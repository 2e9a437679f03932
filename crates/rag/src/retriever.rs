//! Tenant-scoped knowledge retriever
//!
//! Wraps a Qdrant collection shared by all tenants. Every search carries a
//! mandatory tenant_id payload filter; one tenant's documents never appear
//! in another tenant's results.

use async_trait::async_trait;
use qdrant_client::qdrant::{value::Kind, Condition, Filter, SearchPointsBuilder};
use qdrant_client::Qdrant;

use chat_widget_core::{Result, Retriever, Snippet};

use crate::embeddings::{EmbeddingConfig, QueryEmbedder};
use crate::RagError;

/// Retriever configuration
#[derive(Debug, Clone)]
pub struct RetrieverConfig {
    /// Qdrant endpoint
    pub endpoint: String,
    /// Collection name
    pub collection: String,
    /// Optional Qdrant API key
    pub api_key: Option<String>,
    /// Embedding config; dimension must match the collection
    pub embedding: EmbeddingConfig,
}

impl Default for RetrieverConfig {
    fn default() -> Self {
        Self {
            endpoint: "http://127.0.0.1:6334".to_string(),
            collection: "tenant_knowledge".to_string(),
            api_key: None,
            embedding: EmbeddingConfig::default(),
        }
    }
}

/// Qdrant-backed retriever
pub struct KnowledgeRetriever {
    client: Qdrant,
    config: RetrieverConfig,
    embedder: QueryEmbedder,
}

impl KnowledgeRetriever {
    /// Connect to Qdrant
    pub async fn connect(config: RetrieverConfig) -> std::result::Result<Self, RagError> {
        let mut builder = Qdrant::from_url(&config.endpoint);

        if let Some(ref api_key) = config.api_key {
            builder = builder.api_key(api_key.clone());
            tracing::info!("Qdrant connection using API key authentication");
        }

        let client = builder
            .build()
            .map_err(|e| RagError::Connection(e.to_string()))?;

        let embedder = QueryEmbedder::new(config.embedding.clone());

        Ok(Self {
            client,
            config,
            embedder,
        })
    }
}

#[async_trait]
impl Retriever for KnowledgeRetriever {
    async fn search(&self, tenant_id: &str, query: &str, top_k: usize) -> Result<Vec<Snippet>> {
        let embedding = self.embedder.embed(query);

        let search = SearchPointsBuilder::new(&self.config.collection, embedding, top_k as u64)
            .filter(Filter::must([Condition::matches(
                "tenant_id",
                tenant_id.to_string(),
            )]))
            .with_payload(true);

        let results = self
            .client
            .search_points(search)
            .await
            .map_err(|e| RagError::Search(e.to_string()))?;

        let snippets: Vec<Snippet> = results
            .result
            .into_iter()
            .filter_map(|point| {
                let text = point.payload.get("text").and_then(|v| match &v.kind {
                    Some(Kind::StringValue(s)) => Some(s.clone()),
                    _ => None,
                })?;
                Some(Snippet {
                    text,
                    score: point.score,
                })
            })
            .collect();

        tracing::debug!(
            tenant_id,
            count = snippets.len(),
            "Knowledge search complete"
        );

        Ok(snippets)
    }
}
