//! Conversation turn types
//!
//! The turn sequence is owned by the widget client and posted in full on
//! every request; the server keeps no in-process conversation state.

use serde::{Deserialize, Serialize};

/// Role of the speaker in a conversation turn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TurnRole {
    /// Visitor message
    User,
    /// Generated assistant message
    Assistant,
}

impl TurnRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            TurnRole::User => "user",
            TurnRole::Assistant => "assistant",
        }
    }
}

impl std::fmt::Display for TurnRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A single turn in the conversation, immutable once appended
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Turn {
    /// Role of the speaker
    pub role: TurnRole,
    /// Content of the turn
    pub content: String,
}

impl Turn {
    pub fn new(role: TurnRole, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }

    /// Create a user turn
    pub fn user(content: impl Into<String>) -> Self {
        Self::new(TurnRole::User, content)
    }

    /// Create an assistant turn
    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(TurnRole::Assistant, content)
    }

    /// Get word count
    pub fn word_count(&self) -> usize {
        self.content.split_whitespace().count()
    }

    /// Estimate token count (rough: words * 1.3)
    pub fn estimated_tokens(&self) -> usize {
        (self.word_count() as f32 * 1.3) as usize
    }
}

/// Flatten a transcript plus the current message into a single string
/// for whole-conversation pattern extraction.
pub fn flatten_transcript(history: &[Turn], current_message: &str) -> String {
    let mut flat = history
        .iter()
        .map(|t| t.content.as_str())
        .collect::<Vec<_>>()
        .join(" ");
    if !flat.is_empty() {
        flat.push(' ');
    }
    flat.push_str(current_message);
    flat
}
