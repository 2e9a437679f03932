//! Lead persistence
//!
//! A lead is the contact information captured incidentally during one
//! conversation. The central invariant is at most one lead row per
//! (tenant_id, conversation_id) pair: the table keys on that pair and all
//! inserts are conditional, so repeated captures for the same conversation
//! merge into the existing row instead of creating duplicates.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use scylla::frame::response::result::CqlValue;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use chat_widget_core::CandidateLead;

use crate::error::PersistenceError;
use crate::client::ScyllaClient;

/// Persisted lead record
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Lead {
    pub lead_id: Uuid,
    pub tenant_id: String,
    pub conversation_id: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub name: Option<String>,
    /// Reserved; populated once lead scoring ships
    pub lead_score: Option<f32>,
    pub captured_at: DateTime<Utc>,
    /// Opaque transcript snapshot at time of first capture
    pub conversation_summary: String,
    /// Guards the downstream notification from firing more than once
    pub notification_sent: bool,
}

impl Lead {
    /// Build a fresh lead row from an extraction candidate
    pub fn from_candidate(candidate: &CandidateLead, tenant_id: &str, conversation_id: &str) -> Self {
        Self {
            lead_id: Uuid::new_v4(),
            tenant_id: tenant_id.to_string(),
            conversation_id: conversation_id.to_string(),
            email: candidate.email.clone(),
            phone: candidate.phone.clone(),
            name: candidate.name.clone(),
            lead_score: candidate.score,
            captured_at: candidate.captured_at,
            conversation_summary: candidate.conversation_summary(),
            notification_sent: false,
        }
    }
}

/// Contact fields that can be merged into an existing lead
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContactField {
    Email,
    Phone,
    Name,
}

impl ContactField {
    pub fn column(&self) -> &'static str {
        match self {
            ContactField::Email => "email",
            ContactField::Phone => "phone",
            ContactField::Name => "name",
        }
    }
}

/// Outcome of a conditional insert
#[derive(Debug, Clone)]
pub enum InsertOutcome {
    /// The row was created by this call
    Inserted,
    /// A lead already existed for this (tenant, conversation) pair
    Exists(Lead),
}

/// Lead store trait
#[async_trait]
pub trait LeadStore: Send + Sync {
    /// Insert the lead unless one already exists for its (tenant,
    /// conversation) pair. Never overwrites.
    async fn insert_if_absent(&self, lead: &Lead) -> Result<InsertOutcome, PersistenceError>;

    async fn get(
        &self,
        tenant_id: &str,
        conversation_id: &str,
    ) -> Result<Option<Lead>, PersistenceError>;

    /// Set one contact field on an existing lead. Callers are responsible
    /// for only staging fields that are currently unset.
    async fn update_contact(
        &self,
        tenant_id: &str,
        conversation_id: &str,
        field: ContactField,
        value: &str,
    ) -> Result<(), PersistenceError>;

    async fn set_notification_sent(
        &self,
        tenant_id: &str,
        conversation_id: &str,
    ) -> Result<(), PersistenceError>;
}

/// ScyllaDB implementation of the lead store
#[derive(Clone)]
pub struct ScyllaLeadStore {
    client: ScyllaClient,
}

impl ScyllaLeadStore {
    pub fn new(client: ScyllaClient) -> Self {
        Self { client }
    }

    fn row_to_lead(
        &self,
        row: scylla::frame::response::result::Row,
    ) -> Result<Lead, PersistenceError> {
        let (
            tenant_id,
            conversation_id,
            lead_id,
            email,
            phone,
            name,
            lead_score,
            captured_at,
            conversation_summary,
            notification_sent,
        ): (
            String,
            String,
            Uuid,
            Option<String>,
            Option<String>,
            Option<String>,
            Option<f32>,
            i64,
            String,
            bool,
        ) = row
            .into_typed()
            .map_err(|e| PersistenceError::InvalidData(e.to_string()))?;

        Ok(Lead {
            lead_id,
            tenant_id,
            conversation_id,
            email,
            phone,
            name,
            lead_score,
            captured_at: DateTime::from_timestamp_millis(captured_at).unwrap_or_else(Utc::now),
            conversation_summary,
            notification_sent,
        })
    }
}

#[async_trait]
impl LeadStore for ScyllaLeadStore {
    async fn insert_if_absent(&self, lead: &Lead) -> Result<InsertOutcome, PersistenceError> {
        let query = format!(
            "INSERT INTO {}.leads (
                tenant_id, conversation_id, lead_id, email, phone, name,
                lead_score, captured_at, conversation_summary, notification_sent
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?) IF NOT EXISTS",
            self.client.keyspace()
        );

        let result = self
            .client
            .session()
            .query_unpaged(
                query,
                (
                    &lead.tenant_id,
                    &lead.conversation_id,
                    lead.lead_id,
                    &lead.email,
                    &lead.phone,
                    &lead.name,
                    lead.lead_score,
                    lead.captured_at.timestamp_millis(),
                    &lead.conversation_summary,
                    lead.notification_sent,
                ),
            )
            .await?;

        // LWT result: first column is the [applied] boolean
        let applied = result
            .rows
            .and_then(|rows| rows.into_iter().next())
            .and_then(|row| row.columns.into_iter().next().flatten())
            .map(|v| matches!(v, CqlValue::Boolean(true)))
            .unwrap_or(false);

        if applied {
            tracing::info!(
                lead_id = %lead.lead_id,
                tenant_id = %lead.tenant_id,
                conversation_id = %lead.conversation_id,
                "Lead created in ScyllaDB"
            );
            return Ok(InsertOutcome::Inserted);
        }

        match self.get(&lead.tenant_id, &lead.conversation_id).await? {
            Some(existing) => Ok(InsertOutcome::Exists(existing)),
            // The losing row vanished between the LWT and the read; treat as
            // a transient query failure so the caller retries next turn.
            None => Err(PersistenceError::Query(
                "conditional insert not applied but existing lead not found".to_string(),
            )),
        }
    }

    async fn get(
        &self,
        tenant_id: &str,
        conversation_id: &str,
    ) -> Result<Option<Lead>, PersistenceError> {
        let query = format!(
            "SELECT tenant_id, conversation_id, lead_id, email, phone, name,
                    lead_score, captured_at, conversation_summary, notification_sent
             FROM {}.leads WHERE tenant_id = ? AND conversation_id = ?",
            self.client.keyspace()
        );

        let result = self
            .client
            .session()
            .query_unpaged(query, (tenant_id, conversation_id))
            .await?;

        if let Some(rows) = result.rows {
            if let Some(row) = rows.into_iter().next() {
                return Ok(Some(self.row_to_lead(row)?));
            }
        }

        Ok(None)
    }

    async fn update_contact(
        &self,
        tenant_id: &str,
        conversation_id: &str,
        field: ContactField,
        value: &str,
    ) -> Result<(), PersistenceError> {
        let query = format!(
            "UPDATE {}.leads SET {} = ? WHERE tenant_id = ? AND conversation_id = ?",
            self.client.keyspace(),
            field.column()
        );

        self.client
            .session()
            .query_unpaged(query, (value, tenant_id, conversation_id))
            .await?;

        tracing::info!(
            tenant_id,
            conversation_id,
            field = field.column(),
            "Lead field merged"
        );

        Ok(())
    }

    async fn set_notification_sent(
        &self,
        tenant_id: &str,
        conversation_id: &str,
    ) -> Result<(), PersistenceError> {
        let query = format!(
            "UPDATE {}.leads SET notification_sent = true
             WHERE tenant_id = ? AND conversation_id = ?",
            self.client.keyspace()
        );

        self.client
            .session()
            .query_unpaged(query, (tenant_id, conversation_id))
            .await?;

        Ok(())
    }
}

/// In-memory lead store for tests and persistence-disabled deployments
#[derive(Default)]
pub struct InMemoryLeadStore {
    leads: DashMap<(String, String), Lead>,
}

impl InMemoryLeadStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.leads.len()
    }

    pub fn is_empty(&self) -> bool {
        self.leads.is_empty()
    }
}

#[async_trait]
impl LeadStore for InMemoryLeadStore {
    async fn insert_if_absent(&self, lead: &Lead) -> Result<InsertOutcome, PersistenceError> {
        let key = (lead.tenant_id.clone(), lead.conversation_id.clone());
        match self.leads.entry(key) {
            dashmap::mapref::entry::Entry::Occupied(existing) => {
                Ok(InsertOutcome::Exists(existing.get().clone()))
            }
            dashmap::mapref::entry::Entry::Vacant(slot) => {
                slot.insert(lead.clone());
                Ok(InsertOutcome::Inserted)
            }
        }
    }

    async fn get(
        &self,
        tenant_id: &str,
        conversation_id: &str,
    ) -> Result<Option<Lead>, PersistenceError> {
        Ok(self
            .leads
            .get(&(tenant_id.to_string(), conversation_id.to_string()))
            .map(|l| l.clone()))
    }

    async fn update_contact(
        &self,
        tenant_id: &str,
        conversation_id: &str,
        field: ContactField,
        value: &str,
    ) -> Result<(), PersistenceError> {
        let key = (tenant_id.to_string(), conversation_id.to_string());
        let mut lead = self
            .leads
            .get_mut(&key)
            .ok_or_else(|| PersistenceError::InvalidData("lead not found".to_string()))?;

        match field {
            ContactField::Email => lead.email = Some(value.to_string()),
            ContactField::Phone => lead.phone = Some(value.to_string()),
            ContactField::Name => lead.name = Some(value.to_string()),
        }

        Ok(())
    }

    async fn set_notification_sent(
        &self,
        tenant_id: &str,
        conversation_id: &str,
    ) -> Result<(), PersistenceError> {
        let key = (tenant_id.to_string(), conversation_id.to_string());
        let mut lead = self
            .leads
            .get_mut(&key)
            .ok_or_else(|| PersistenceError::InvalidData("lead not found".to_string()))?;
        lead.notification_sent = true;
        Ok(())
    }
}
