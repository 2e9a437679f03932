//! ScyllaDB schema creation

use scylla::Session;

use crate::error::PersistenceError;

/// Create the keyspace if it doesn't exist
pub async fn create_keyspace(
    session: &Session,
    keyspace: &str,
    replication_factor: u8,
) -> Result<(), PersistenceError> {
    let query = format!(
        "CREATE KEYSPACE IF NOT EXISTS {} WITH replication = {{'class': 'SimpleStrategy', 'replication_factor': {}}}",
        keyspace, replication_factor
    );

    session
        .query_unpaged(query, &[])
        .await
        .map_err(|e| PersistenceError::SchemaError(format!("Failed to create keyspace: {}", e)))?;

    Ok(())
}

/// Create all required tables
pub async fn create_tables(session: &Session, keyspace: &str) -> Result<(), PersistenceError> {
    // Leads table. The partition/clustering key enforces the one-lead-per-
    // (tenant, conversation) invariant at the storage layer; inserts go
    // through IF NOT EXISTS so concurrent first-captures cannot both apply.
    let leads_table = format!(
        r#"
        CREATE TABLE IF NOT EXISTS {}.leads (
            tenant_id TEXT,
            conversation_id TEXT,
            lead_id UUID,
            email TEXT,
            phone TEXT,
            name TEXT,
            lead_score FLOAT,
            captured_at TIMESTAMP,
            conversation_summary TEXT,
            notification_sent BOOLEAN,
            PRIMARY KEY ((tenant_id), conversation_id)
        )
    "#,
        keyspace
    );

    session
        .query_unpaged(leads_table, &[])
        .await
        .map_err(|e| PersistenceError::SchemaError(format!("Failed to create leads table: {}", e)))?;

    // Append-only turn analytics
    let analytics_table = format!(
        r#"
        CREATE TABLE IF NOT EXISTS {}.turn_analytics (
            tenant_id TEXT,
            created_at TIMESTAMP,
            record_id UUID,
            conversation_ref UUID,
            user_message TEXT,
            assistant_reply TEXT,
            snippet_count INT,
            token_count INT,
            PRIMARY KEY ((tenant_id), created_at, record_id)
        ) WITH CLUSTERING ORDER BY (created_at DESC, record_id DESC)
    "#,
        keyspace
    );

    session
        .query_unpaged(analytics_table, &[])
        .await
        .map_err(|e| {
            PersistenceError::SchemaError(format!("Failed to create turn_analytics table: {}", e))
        })?;

    tracing::info!("All tables created successfully");
    Ok(())
}
