//! Lead notification side effect
//!
//! Invoked by the capture service when a lead first gains a contact
//! channel. Fire-and-forget: implementations swallow their own failures.

use async_trait::async_trait;

use crate::leads::Lead;

/// Notification sink for freshly captured leads
#[async_trait]
pub trait LeadNotifier: Send + Sync {
    async fn notify(&self, lead: &Lead);
}

/// Stub notifier that only logs. Stands in until the email/webhook
/// integration lands.
#[derive(Default)]
pub struct NoopLeadNotifier;

impl NoopLeadNotifier {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl LeadNotifier for NoopLeadNotifier {
    async fn notify(&self, lead: &Lead) {
        tracing::info!(
            lead_id = %lead.lead_id,
            tenant_id = %lead.tenant_id,
            has_email = lead.email.is_some(),
            has_phone = lead.phone.is_some(),
            "Lead notification (stub)"
        );
    }
}
