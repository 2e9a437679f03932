//! Context-sensitive name extraction
//!
//! Unlike the email/phone extractors, name extraction is a two-state
//! heuristic over the latest exchange. A bare name-like reply ("Sarah") is
//! trusted only when the assistant's prior turn asked for a name; an
//! unsolicited mention must both parse and pass a plausibility check.
//!
//! Known asymmetry, kept deliberately pending a product decision: a direct
//! answer to a name question skips the plausibility check entirely, so a
//! non-name reply to "what's your name?" is still accepted verbatim.

use once_cell::sync::Lazy;
use regex::Regex;

use chat_widget_core::{Turn, TurnRole};

/// Phrases the assistant uses when eliciting a name. Case-insensitive
/// substring match against the assistant's prior turn.
const NAME_QUESTION_PHRASES: &[&str] = &[
    "what is your name",
    "what's your name",
    "may i have your name",
    "may i ask who",
    "can i get your name",
    "who am i speaking with",
    "who do i have the pleasure",
    "your name, please",
];

// Words that are never accepted as a name on their own
const NON_NAME_WORDS: &[&str] = &[
    "yes", "no", "yeah", "nope", "ok", "okay", "sure", "please", "thanks", "thank", "hi",
    "hello", "hey", "maybe", "none", "nothing", "help", "stop",
];

// Capitalized-word run: "Jane", "Jane Smith", "Mary J. Watson"
const NAME_WORDS: &str = r"[A-Z][a-zA-Z'’-]*(?:\s+(?:[A-Z]\.|[A-Z][a-zA-Z'’-]*))*";

static LEAD_IN_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(r"(?:\b[Ii]t['’]s|\b[Ii]['’]m|\b[Ii] am)\s+({NAME_WORDS})")).unwrap()
});

static MY_NAME_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(
        r"(?i:my name(?:['’]s| is))\s+({NAME_WORDS})"
    ))
    .unwrap()
});

static COMMA_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(&format!(r"^({NAME_WORDS}),")).unwrap());

static BARE_NAME_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(&format!(r"^{NAME_WORDS}$")).unwrap());

/// Extract a person name from the current message, given the conversation
/// so far.
///
/// If the assistant just asked for a name, the reply is parsed permissively
/// and returned as-is. Otherwise the parse result must also pass
/// [`is_plausible_person_name`].
pub fn extract_name(current_message: &str, history: &[Turn]) -> Option<String> {
    if assistant_just_asked_for_name(current_message, history) {
        return parse_name_from_response(current_message);
    }

    parse_name_from_response(current_message).filter(|name| is_plausible_person_name(name))
}

/// True if the turn immediately preceding the current message is an
/// assistant turn containing a name-eliciting phrase.
///
/// Callers may pass the history either with or without the current user
/// message appended as the final turn; a trailing echo of the current
/// message is skipped before locating the assistant's prior turn.
fn assistant_just_asked_for_name(current_message: &str, history: &[Turn]) -> bool {
    let mut turns = history.iter().rev();
    let mut prior = turns.next();
    if let Some(turn) = prior {
        if turn.role == TurnRole::User && turn.content == current_message {
            prior = turns.next();
        }
    }

    let Some(turn) = prior else {
        return false;
    };
    if turn.role != TurnRole::Assistant {
        return false;
    }

    let lowered = turn.content.to_lowercase();
    NAME_QUESTION_PHRASES
        .iter()
        .any(|phrase| lowered.contains(phrase))
}

/// Permissive name parse over a single message.
///
/// Tries, in order: lead-in phrases ("it's/i'm/i am <Name>"), "my name
/// is/my name's <Name>", "<Name>," comma form, and finally the whole
/// trimmed string being capitalized-word-shaped. The first pattern whose
/// candidate survives the basic validity filter wins.
pub fn parse_name_from_response(text: &str) -> Option<String> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return None;
    }

    for pattern in [&*LEAD_IN_PATTERN, &*MY_NAME_PATTERN, &*COMMA_PATTERN] {
        if let Some(caps) = pattern.captures(trimmed) {
            if let Some(candidate) = caps.get(1).map(|m| m.as_str().trim()) {
                if is_valid_name(candidate) {
                    return Some(candidate.to_string());
                }
            }
        }
    }

    // Last resort: the entire reply is itself a capitalized-word run
    if BARE_NAME_PATTERN.is_match(trimmed) && is_valid_name(trimmed) {
        return Some(trimmed.to_string());
    }

    None
}

/// Basic validity filter shared by all parse patterns: rejects empty
/// strings, overlong candidates, and obviously non-name tokens.
fn is_valid_name(candidate: &str) -> bool {
    if candidate.is_empty() {
        return false;
    }
    let words: Vec<&str> = candidate.split_whitespace().collect();
    if words.is_empty() || words.len() > 4 {
        return false;
    }
    !words.iter().any(|w| {
        let lowered = w.to_lowercase();
        NON_NAME_WORDS.contains(&lowered.trim_matches('.'))
    })
}

/// Person-name plausibility check applied to unsolicited mentions.
///
/// Stricter than [`is_valid_name`]: every word must be a capitalized
/// alphabetic token (middle initials allowed) and must not be a common
/// sentence-starter that happens to be capitalized.
pub fn is_plausible_person_name(candidate: &str) -> bool {
    const SENTENCE_STARTERS: &[&str] = &[
        "the", "this", "that", "these", "those", "what", "when", "where", "which", "who", "why",
        "how", "can", "could", "would", "should", "will", "do", "does", "is", "are", "was", "if",
        "my", "our", "your", "their", "it", "we", "you", "they", "just", "also", "and", "but",
    ];

    let words: Vec<&str> = candidate.split_whitespace().collect();
    if words.is_empty() || words.len() > 4 {
        return false;
    }

    words.iter().all(|word| {
        let word = word.trim_end_matches('.');
        let mut chars = word.chars();
        let Some(first) = chars.next() else {
            return false;
        };
        first.is_ascii_uppercase()
            && chars.all(|c| c.is_ascii_alphabetic() || matches!(c, '\'' | '’' | '-'))
            && !SENTENCE_STARTERS.contains(&word.to_lowercase().as_str())
            && !NON_NAME_WORDS.contains(&word.to_lowercase().as_str())
    })
}
