//! Multi-turn lead capture flow tests
//!
//! Drives the chat engine across whole conversations with in-memory stores
//! and a scripted model, asserting the lead and analytics state after each
//! sequence.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;

use chat_widget_agent::{ChatEngine, ChatEngineConfig, LeadCaptureService};
use chat_widget_config::TenantRegistry;
use chat_widget_core::{LanguageModel, Result, Turn};
use chat_widget_persistence::{
    InMemoryAnalyticsStore, InMemoryLeadStore, Lead, LeadNotifier, LeadStore,
};

struct ScriptedModel {
    reply: String,
}

#[async_trait]
impl LanguageModel for ScriptedModel {
    async fn complete(&self, _system_prompt: &str, _turns: &[Turn]) -> Result<String> {
        Ok(self.reply.clone())
    }
}

#[derive(Default)]
struct CountingNotifier {
    count: AtomicUsize,
}

#[async_trait]
impl LeadNotifier for CountingNotifier {
    async fn notify(&self, _lead: &Lead) {
        self.count.fetch_add(1, Ordering::SeqCst);
    }
}

struct Harness {
    engine: ChatEngine,
    leads: Arc<InMemoryLeadStore>,
    analytics: Arc<InMemoryAnalyticsStore>,
    notifier: Arc<CountingNotifier>,
}

fn harness(reply: &str) -> Harness {
    let leads = Arc::new(InMemoryLeadStore::new());
    let analytics = Arc::new(InMemoryAnalyticsStore::new());
    let notifier = Arc::new(CountingNotifier::default());
    let engine = ChatEngine::new(
        None,
        Arc::new(ScriptedModel {
            reply: reply.to_string(),
        }),
        LeadCaptureService::new(leads.clone(), notifier.clone()),
        analytics.clone(),
        Arc::new(TenantRegistry::new()),
        ChatEngineConfig::default(),
    );
    Harness {
        engine,
        leads,
        analytics,
        notifier,
    }
}

#[tokio::test]
async fn lead_builds_up_across_turns() {
    let h = harness("Got it, thanks! We'll reach out shortly.");

    // Turn 1: email only.
    let mut turns = vec![
        Turn::user("Hi"),
        Turn::assistant("Hi! How can I help?"),
        Turn::user("Can you book me in? My email is jane@acme.com"),
    ];
    h.engine.handle_turn("demo", "conv_1", &turns).await;

    let lead = h.leads.get("demo", "conv_1").await.unwrap().unwrap();
    assert_eq!(lead.email.as_deref(), Some("jane@acme.com"));
    assert_eq!(lead.phone, None);
    assert_eq!(h.notifier.count.load(Ordering::SeqCst), 1);

    // Turn 2: phone arrives later in the same conversation.
    turns.push(Turn::assistant("Got it, thanks! We'll reach out shortly."));
    turns.push(Turn::user("You can also call me at 754-485-9632 to schedule"));
    h.engine.handle_turn("demo", "conv_1", &turns).await;

    let lead = h.leads.get("demo", "conv_1").await.unwrap().unwrap();
    assert_eq!(lead.email.as_deref(), Some("jane@acme.com"));
    assert_eq!(lead.phone.as_deref(), Some("(754) 485-9632"));

    // Still one row, still one notification.
    assert_eq!(h.leads.len(), 1);
    assert_eq!(h.notifier.count.load(Ordering::SeqCst), 1);

    // One analytics record per processed turn.
    assert_eq!(h.analytics.records().len(), 2);
}

#[tokio::test]
async fn later_email_never_overwrites_first() {
    let h = harness("Sure, we can schedule that.");

    let first = vec![Turn::user("book me please, a@x.com")];
    h.engine.handle_turn("demo", "conv_2", &first).await;

    let second = vec![
        Turn::user("book me please, a@x.com"),
        Turn::assistant("Sure, we can schedule that."),
        Turn::user("actually use b@x.com for the appointment"),
    ];
    h.engine.handle_turn("demo", "conv_2", &second).await;

    let lead = h.leads.get("demo", "conv_2").await.unwrap().unwrap();
    assert_eq!(lead.email.as_deref(), Some("a@x.com"));
}

#[tokio::test]
async fn conversations_do_not_share_leads() {
    let h = harness("Happy to help, what time works?");

    h.engine
        .handle_turn(
            "demo",
            "conv_a",
            &[Turn::user("I'd like a quote, I'm at alice@x.com")],
        )
        .await;
    h.engine
        .handle_turn(
            "demo",
            "conv_b",
            &[Turn::user("I'd like a quote, I'm at bob@y.com")],
        )
        .await;

    assert_eq!(h.leads.len(), 2);
    let a = h.leads.get("demo", "conv_a").await.unwrap().unwrap();
    let b = h.leads.get("demo", "conv_b").await.unwrap().unwrap();
    assert_eq!(a.email.as_deref(), Some("alice@x.com"));
    assert_eq!(b.email.as_deref(), Some("bob@y.com"));
}

#[tokio::test]
async fn non_commercial_turns_leave_no_lead() {
    let h = harness("We open at 9am.");

    h.engine
        .handle_turn("demo", "conv_3", &[Turn::user("when do you open tomorrow?")])
        .await;

    assert_eq!(h.leads.len(), 0);
    assert_eq!(h.notifier.count.load(Ordering::SeqCst), 0);
    // Analytics are written regardless of capture outcome.
    assert_eq!(h.analytics.records().len(), 1);
}
