//! ScyllaDB session management
//!
//! All queries in this crate go through a shared [`ScyllaClient`] and
//! qualify table names with its keyspace. Connection parameters come from
//! the caller (the server builds them from its settings layer); this crate
//! reads no environment of its own.

use std::sync::Arc;

use scylla::{Session, SessionBuilder};

use crate::error::PersistenceError;
use crate::schema;

/// Connection parameters for the lead and analytics stores
#[derive(Debug, Clone)]
pub struct ScyllaConfig {
    pub hosts: Vec<String>,
    pub keyspace: String,
    pub replication_factor: u8,
}

impl ScyllaConfig {
    pub fn new(
        hosts: Vec<String>,
        keyspace: impl Into<String>,
        replication_factor: u8,
    ) -> Self {
        Self {
            hosts,
            keyspace: keyspace.into(),
            replication_factor,
        }
    }
}

/// Shared session handle, cheap to clone
#[derive(Clone)]
pub struct ScyllaClient {
    session: Arc<Session>,
    config: ScyllaConfig,
}

impl ScyllaClient {
    /// Connect to the cluster. Does not create schema; call
    /// [`ensure_schema`](Self::ensure_schema) before issuing queries.
    pub async fn connect(config: ScyllaConfig) -> Result<Self, PersistenceError> {
        tracing::info!(hosts = ?config.hosts, keyspace = %config.keyspace, "Connecting to ScyllaDB");

        let session = SessionBuilder::new()
            .known_nodes(&config.hosts)
            .build()
            .await?;

        Ok(Self {
            session: Arc::new(session),
            config,
        })
    }

    /// Create the keyspace and tables if they do not exist
    pub async fn ensure_schema(&self) -> Result<(), PersistenceError> {
        schema::create_keyspace(
            &self.session,
            &self.config.keyspace,
            self.config.replication_factor,
        )
        .await?;
        schema::create_tables(&self.session, &self.config.keyspace).await?;
        tracing::info!(keyspace = %self.config.keyspace, "Schema ensured");
        Ok(())
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn keyspace(&self) -> &str {
        &self.config.keyspace
    }
}
