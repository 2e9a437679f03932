//! Candidate lead assembly
//!
//! Combines the three extractors over the full conversation transcript plus
//! the current message into a single candidate record.

use chrono::Utc;

use chat_widget_core::conversation::flatten_transcript;
use chat_widget_core::{CandidateLead, Turn};

use crate::name::extract_name;
use crate::patterns::{extract_email, extract_phone};

/// Assemble a candidate lead for the current turn.
///
/// Email and phone run over the flattened transcript so contact info
/// volunteered several turns earlier is still caught. Name extraction runs
/// over the latest exchange only, because the assistant-just-asked heuristic
/// is positional. The score field is reserved and stays unset.
pub fn assemble_candidate(current_message: &str, history: &[Turn]) -> CandidateLead {
    let flattened = flatten_transcript(history, current_message);

    let mut transcript = history.to_vec();
    transcript.push(Turn::user(current_message));

    CandidateLead {
        email: extract_email(&flattened),
        phone: extract_phone(&flattened),
        name: extract_name(current_message, history),
        captured_at: Utc::now(),
        score: None,
        source_conversation: transcript,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_assemble_from_single_message() {
        let candidate = assemble_candidate(
            "I'd like to book a consultation, I'm Jane Smith, jane@acme.com, 754-485-9632",
            &[
                Turn::user("Hi"),
                Turn::assistant("Hi! How can I help?"),
            ],
        );

        assert_eq!(candidate.email.as_deref(), Some("jane@acme.com"));
        assert_eq!(candidate.phone.as_deref(), Some("(754) 485-9632"));
        assert_eq!(candidate.name.as_deref(), Some("Jane Smith"));
        assert!(candidate.score.is_none());
        assert_eq!(candidate.source_conversation.len(), 3);
    }

    #[test]
    fn test_contact_info_from_earlier_turns() {
        let history = vec![
            Turn::user("my email is bob@builder.io"),
            Turn::assistant("Got it. Anything else?"),
        ];
        let candidate = assemble_candidate("when can someone call me?", &history);

        assert_eq!(candidate.email.as_deref(), Some("bob@builder.io"));
        assert!(candidate.phone.is_none());
        // Name never runs over the flattened history
        assert!(candidate.name.is_none());
    }

    #[test]
    fn test_empty_candidate() {
        let candidate = assemble_candidate("what are your hours?", &[]);
        assert!(candidate.is_empty());
    }
}
