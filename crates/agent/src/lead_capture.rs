//! Lead capture service
//!
//! Sole writer of the leads table. Guarantees at most one lead per
//! (tenant_id, conversation_id), first-write-wins per contact field, and a
//! notification that fires exactly once per lead. Storage errors are logged
//! and swallowed; a dropped candidate is usually re-captured on a later
//! turn of the same conversation.

use std::sync::Arc;

use tracing::{debug, info, warn};

use chat_widget_core::CandidateLead;
use chat_widget_persistence::{
    ContactField, InsertOutcome, Lead, LeadNotifier, LeadStore,
};

/// What the capture attempt did, for logging and tests
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaptureOutcome {
    /// A new lead row was created
    Created,
    /// An existing lead gained at least one new contact field
    Merged,
    /// An existing lead already had everything the candidate offered
    Unchanged,
    /// The candidate carried no information, or storage failed
    Skipped,
}

/// Upserts candidate leads into storage and fires notifications
pub struct LeadCaptureService {
    store: Arc<dyn LeadStore>,
    notifier: Arc<dyn LeadNotifier>,
}

impl LeadCaptureService {
    pub fn new(store: Arc<dyn LeadStore>, notifier: Arc<dyn LeadNotifier>) -> Self {
        Self { store, notifier }
    }

    /// Upsert a candidate lead. Infallible from the caller's perspective.
    pub async fn capture(
        &self,
        candidate: &CandidateLead,
        tenant_id: &str,
        conversation_id: &str,
    ) -> CaptureOutcome {
        if candidate.is_empty() {
            return CaptureOutcome::Skipped;
        }

        let lead = Lead::from_candidate(candidate, tenant_id, conversation_id);

        match self.store.insert_if_absent(&lead).await {
            Ok(InsertOutcome::Inserted) => {
                info!(
                    tenant_id,
                    conversation_id,
                    has_email = lead.email.is_some(),
                    has_phone = lead.phone.is_some(),
                    has_name = lead.name.is_some(),
                    "New lead captured"
                );
                metrics::counter!("leads_created_total").increment(1);
                self.notify_once(&lead).await;
                CaptureOutcome::Created
            }
            Ok(InsertOutcome::Exists(existing)) => {
                self.merge(candidate, &existing).await
            }
            Err(e) => {
                warn!(tenant_id, conversation_id, error = %e, "Lead insert failed, dropping candidate");
                CaptureOutcome::Skipped
            }
        }
    }

    /// Merge candidate fields into an existing lead. A populated field is
    /// never overwritten, whatever later turns claim.
    async fn merge(&self, candidate: &CandidateLead, existing: &Lead) -> CaptureOutcome {
        let mut staged: Vec<(ContactField, &str)> = Vec::new();

        if existing.email.is_none() {
            if let Some(email) = candidate.email.as_deref() {
                staged.push((ContactField::Email, email));
            }
        }
        if existing.phone.is_none() {
            if let Some(phone) = candidate.phone.as_deref() {
                staged.push((ContactField::Phone, phone));
            }
        }
        if existing.name.is_none() {
            if let Some(name) = candidate.name.as_deref() {
                staged.push((ContactField::Name, name));
            }
        }

        if staged.is_empty() {
            debug!(
                tenant_id = %existing.tenant_id,
                conversation_id = %existing.conversation_id,
                "Candidate adds nothing to existing lead"
            );
            return CaptureOutcome::Unchanged;
        }

        let gained_contact_channel = staged
            .iter()
            .any(|(f, _)| matches!(f, ContactField::Email | ContactField::Phone));

        for (field, value) in &staged {
            if let Err(e) = self
                .store
                .update_contact(&existing.tenant_id, &existing.conversation_id, *field, value)
                .await
            {
                warn!(
                    tenant_id = %existing.tenant_id,
                    conversation_id = %existing.conversation_id,
                    field = field.column(),
                    error = %e,
                    "Lead field update failed"
                );
            }
        }

        info!(
            tenant_id = %existing.tenant_id,
            conversation_id = %existing.conversation_id,
            fields = staged.len(),
            "Merged new fields into existing lead"
        );
        metrics::counter!("leads_merged_total").increment(1);

        if gained_contact_channel && !existing.notification_sent {
            let mut updated = existing.clone();
            for (field, value) in &staged {
                match field {
                    ContactField::Email => updated.email = Some((*value).to_string()),
                    ContactField::Phone => updated.phone = Some((*value).to_string()),
                    ContactField::Name => updated.name = Some((*value).to_string()),
                }
            }
            self.notify_once(&updated).await;
        }

        CaptureOutcome::Merged
    }

    /// Fire the notification and latch the sent flag. The flag write is
    /// best-effort like everything else here.
    async fn notify_once(&self, lead: &Lead) {
        self.notifier.notify(lead).await;
        if let Err(e) = self
            .store
            .set_notification_sent(&lead.tenant_id, &lead.conversation_id)
            .await
        {
            warn!(
                tenant_id = %lead.tenant_id,
                conversation_id = %lead.conversation_id,
                error = %e,
                "Failed to record notification flag"
            );
        }
    }
}
