//! Append-only turn analytics
//!
//! One record per processed chat turn, written regardless of lead-capture
//! outcome. Write failures must never affect the chat response; the caller
//! logs and continues.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::client::ScyllaClient;
use crate::error::PersistenceError;

/// Analytics record for one processed turn
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TurnRecord {
    pub record_id: Uuid,
    pub tenant_id: String,
    /// Freshly generated per record; deliberately not the caller's
    /// conversation id, so analytics cannot be joined back to lead rows.
    pub conversation_ref: Uuid,
    pub user_message: String,
    pub assistant_reply: String,
    pub snippet_count: usize,
    pub token_count: usize,
    pub created_at: DateTime<Utc>,
}

impl TurnRecord {
    pub fn new(
        tenant_id: &str,
        user_message: &str,
        assistant_reply: &str,
        snippet_count: usize,
        token_count: usize,
    ) -> Self {
        Self {
            record_id: Uuid::new_v4(),
            tenant_id: tenant_id.to_string(),
            conversation_ref: Uuid::new_v4(),
            user_message: user_message.to_string(),
            assistant_reply: assistant_reply.to_string(),
            snippet_count,
            token_count,
            created_at: Utc::now(),
        }
    }
}

/// Analytics store trait
#[async_trait]
pub trait AnalyticsStore: Send + Sync {
    async fn append(&self, record: &TurnRecord) -> Result<(), PersistenceError>;
}

/// ScyllaDB implementation of the analytics store
#[derive(Clone)]
pub struct ScyllaAnalyticsStore {
    client: ScyllaClient,
}

impl ScyllaAnalyticsStore {
    pub fn new(client: ScyllaClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl AnalyticsStore for ScyllaAnalyticsStore {
    async fn append(&self, record: &TurnRecord) -> Result<(), PersistenceError> {
        let query = format!(
            "INSERT INTO {}.turn_analytics (
                tenant_id, created_at, record_id, conversation_ref,
                user_message, assistant_reply, snippet_count, token_count
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
            self.client.keyspace()
        );

        self.client
            .session()
            .query_unpaged(
                query,
                (
                    &record.tenant_id,
                    record.created_at.timestamp_millis(),
                    record.record_id,
                    record.conversation_ref,
                    &record.user_message,
                    &record.assistant_reply,
                    record.snippet_count as i32,
                    record.token_count as i32,
                ),
            )
            .await?;

        tracing::debug!(
            tenant_id = %record.tenant_id,
            record_id = %record.record_id,
            snippets = record.snippet_count,
            "Turn analytics recorded"
        );

        Ok(())
    }
}

/// In-memory analytics store for tests and persistence-disabled deployments
#[derive(Default)]
pub struct InMemoryAnalyticsStore {
    records: RwLock<Vec<TurnRecord>>,
}

impl InMemoryAnalyticsStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn records(&self) -> Vec<TurnRecord> {
        self.records.read().clone()
    }

    pub fn len(&self) -> usize {
        self.records.read().len()
    }
}

#[async_trait]
impl AnalyticsStore for InMemoryAnalyticsStore {
    async fn append(&self, record: &TurnRecord) -> Result<(), PersistenceError> {
        self.records.write().push(record.clone());
        Ok(())
    }
}
