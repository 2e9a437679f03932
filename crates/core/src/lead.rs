//! Candidate lead record produced by the extraction pipeline
//!
//! A `CandidateLead` is ephemeral: it is assembled once per qualifying chat
//! turn and handed to the lead capture service, never persisted directly.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::conversation::Turn;

/// Contact information extracted from a conversation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CandidateLead {
    /// Extracted email, lower-cased
    pub email: Option<String>,
    /// Extracted phone in US national display form, e.g. "(754) 485-9632"
    pub phone: Option<String>,
    /// Extracted name
    pub name: Option<String>,
    /// When the candidate was assembled
    pub captured_at: DateTime<Utc>,
    /// Reserved for lead scoring; always None until scoring ships
    pub score: Option<f32>,
    /// Transcript snapshot at time of capture
    pub source_conversation: Vec<Turn>,
}

impl CandidateLead {
    /// True if no contact field was extracted
    pub fn is_empty(&self) -> bool {
        self.email.is_none() && self.phone.is_none() && self.name.is_none()
    }

    /// Transcript rendered as "role: content" lines, stored with the
    /// persisted lead as an opaque summary.
    pub fn conversation_summary(&self) -> String {
        self.source_conversation
            .iter()
            .map(|t| format!("{}: {}", t.role, t.content))
            .collect::<Vec<_>>()
            .join("\n")
    }
}
