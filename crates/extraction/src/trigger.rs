//! Capture trigger heuristic
//!
//! Decides whether lead extraction should run for this turn at all, so the
//! extraction pass and the storage round trip are skipped on turns with no
//! plausible booking/contact intent. Intentionally coarse: substring match,
//! no tokenization. False positives cost a wasted extraction pass; false
//! negatives only delay capture to a later turn of the same conversation.

/// Keywords signalling booking or contact intent, matched case-insensitively
/// against the user's latest message and the freshly generated reply.
const CAPTURE_KEYWORDS: &[&str] = &[
    "email",
    "phone",
    "contact",
    "book",
    "schedule",
    "appointment",
    "quote",
    "pricing",
    "price",
    "estimate",
    "consultation",
    "call me",
    "reach me",
    "follow up",
];

/// True if either side of the latest exchange contains a capture keyword.
pub fn should_attempt_capture(user_text: &str, reply_text: &str) -> bool {
    let user = user_text.to_lowercase();
    let reply = reply_text.to_lowercase();
    CAPTURE_KEYWORDS
        .iter()
        .any(|kw| user.contains(kw) || reply.contains(kw))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_keyword() {
        assert!(!should_attempt_capture("what's the weather", "it's sunny"));
    }

    #[test]
    fn test_user_keyword() {
        assert!(should_attempt_capture(
            "can I book an appointment",
            "sure, what time works?"
        ));
    }

    #[test]
    fn test_reply_keyword() {
        assert!(should_attempt_capture(
            "how much does it cost",
            "I can put together a quote for you"
        ));
    }

    #[test]
    fn test_case_insensitive_substring() {
        assert!(should_attempt_capture("EMAIL me the details", ""));
        // Substring semantics are intentional: "booking" contains "book"
        assert!(should_attempt_capture("thinking about booking", "ok"));
    }
}
