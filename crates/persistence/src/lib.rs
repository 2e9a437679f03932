//! ScyllaDB persistence layer for the chat widget backend
//!
//! Provides persistent storage for:
//! - Leads (one row per tenant/conversation pair, merged across turns)
//! - Turn analytics (append-only)
//!
//! Every store has an in-memory implementation used in tests and when
//! persistence is disabled in settings.

pub mod analytics;
pub mod client;
pub mod error;
pub mod leads;
pub mod notify;
pub mod schema;

pub use analytics::{AnalyticsStore, InMemoryAnalyticsStore, ScyllaAnalyticsStore, TurnRecord};
pub use client::{ScyllaClient, ScyllaConfig};
pub use error::PersistenceError;
pub use leads::{ContactField, InMemoryLeadStore, InsertOutcome, Lead, LeadStore, ScyllaLeadStore};
pub use notify::{LeadNotifier, NoopLeadNotifier};

/// Initialize the ScyllaDB-backed persistence layer
pub async fn init(config: ScyllaConfig) -> Result<PersistenceLayer, PersistenceError> {
    let client = ScyllaClient::connect(config).await?;
    client.ensure_schema().await?;

    Ok(PersistenceLayer {
        leads: ScyllaLeadStore::new(client.clone()),
        analytics: ScyllaAnalyticsStore::new(client),
    })
}

/// Combined persistence layer with all stores
pub struct PersistenceLayer {
    pub leads: ScyllaLeadStore,
    pub analytics: ScyllaAnalyticsStore,
}
