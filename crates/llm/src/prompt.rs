//! System prompt assembly
//!
//! Builds the per-tenant system prompt from the tenant profile and any
//! knowledge snippets retrieved for the current message.

use chat_widget_config::TenantProfile;
use chat_widget_core::Snippet;

/// Build the system prompt for a chat turn.
///
/// The prompt combines the tenant's business identity, tone, service list,
/// FAQ entries, and special instructions, followed by a retrieved-context
/// block when the retriever returned snippets.
pub fn build_system_prompt(profile: &TenantProfile, snippets: &[Snippet]) -> String {
    let mut prompt = String::with_capacity(1024);

    prompt.push_str(&format!(
        "You are a helpful assistant for {}, embedded in the website chat widget.\n",
        profile.business_name
    ));
    prompt.push_str(&format!("Your tone is {}.\n", profile.tone));

    if !profile.services.is_empty() {
        prompt.push_str("\nServices offered:\n");
        for service in &profile.services {
            prompt.push_str(&format!("- {}\n", service));
        }
    }

    if !profile.faq.is_empty() {
        prompt.push_str("\nFrequently asked questions:\n");
        for entry in &profile.faq {
            prompt.push_str(&format!("Q: {}\nA: {}\n", entry.question, entry.answer));
        }
    }

    if !profile.special_instructions.is_empty() {
        prompt.push_str(&format!("\n{}\n", profile.special_instructions));
    }

    if !snippets.is_empty() {
        prompt.push_str("\nRelevant knowledge for this conversation:\n");
        for snippet in snippets {
            prompt.push_str(&format!("- {}\n", snippet.text.trim()));
        }
        prompt.push_str("Prefer this knowledge when answering. If it does not cover the question, say so honestly.\n");
    }

    prompt.push_str(
        "\nKeep replies concise and conversational. If the visitor wants to be contacted, \
         ask for their name, email, or phone number.\n",
    );

    prompt
}

#[cfg(test)]
mod tests {
    use super::*;
    use chat_widget_config::FaqEntry;

    fn profile() -> TenantProfile {
        TenantProfile {
            id: "acme".to_string(),
            business_name: "Acme Plumbing".to_string(),
            tone: "friendly and professional".to_string(),
            services: vec!["Drain cleaning".to_string(), "Pipe repair".to_string()],
            faq: vec![FaqEntry {
                question: "Do you work weekends?".to_string(),
                answer: "Yes, Saturdays 9-5.".to_string(),
            }],
            special_instructions: "Never quote exact prices.".to_string(),
        }
    }

    #[test]
    fn test_prompt_includes_profile_sections() {
        let prompt = build_system_prompt(&profile(), &[]);
        assert!(prompt.contains("Acme Plumbing"));
        assert!(prompt.contains("friendly and professional"));
        assert!(prompt.contains("Drain cleaning"));
        assert!(prompt.contains("Do you work weekends?"));
        assert!(prompt.contains("Never quote exact prices."));
        assert!(!prompt.contains("Relevant knowledge"));
    }

    #[test]
    fn test_prompt_includes_snippets() {
        let snippets = vec![Snippet {
            text: "We offer a 10% discount for first-time customers.".to_string(),
            score: 0.92,
        }];
        let prompt = build_system_prompt(&profile(), &snippets);
        assert!(prompt.contains("Relevant knowledge"));
        assert!(prompt.contains("10% discount"));
    }
}
