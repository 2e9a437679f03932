//! Chat turn orchestration
//!
//! One `ChatEngine` instance serves all tenants. Each turn runs the same
//! pipeline: retrieve knowledge for the latest user message, assemble the
//! tenant's system prompt, generate a reply, then run the best-effort side
//! channels (lead capture when the trigger fires, analytics always).
//!
//! Only the primary path (retrieval, completion) can fail user-visibly,
//! and then only as the fixed fallback reply. Side-channel failures are
//! logged and swallowed.

use std::sync::Arc;

use tracing::{debug, info, warn};

use chat_widget_config::{TenantProfile, TenantRegistry};
use chat_widget_core::{Error, LanguageModel, Result, Retriever, Snippet, Turn, TurnRole};
use chat_widget_extraction::{assemble_candidate, should_attempt_capture};
use chat_widget_llm::build_system_prompt;
use chat_widget_persistence::{AnalyticsStore, TurnRecord};

use crate::lead_capture::{CaptureOutcome, LeadCaptureService};

/// Reply returned whenever retrieval or completion fails
pub const FALLBACK_REPLY: &str =
    "I'm having trouble responding right now. Please try again in a moment, \
     or contact us directly and we'll be happy to help.";

/// Engine tuning knobs
#[derive(Debug, Clone)]
pub struct ChatEngineConfig {
    /// Snippets requested per retrieval call
    pub top_k: usize,
    /// Text returned on primary-path failure
    pub fallback_reply: String,
}

impl Default for ChatEngineConfig {
    fn default() -> Self {
        Self {
            top_k: 4,
            fallback_reply: FALLBACK_REPLY.to_string(),
        }
    }
}

/// Result of one processed turn
#[derive(Debug, Clone)]
pub struct TurnOutcome {
    pub reply_text: String,
    /// None when the trigger did not fire or the primary path failed
    pub capture: Option<CaptureOutcome>,
}

/// Per-turn pipeline over injected collaborators
pub struct ChatEngine {
    /// None when retrieval is disabled or unreachable at startup; the
    /// engine then prompts without knowledge context.
    retriever: Option<Arc<dyn Retriever>>,
    model: Arc<dyn LanguageModel>,
    capture: LeadCaptureService,
    analytics: Arc<dyn AnalyticsStore>,
    tenants: Arc<TenantRegistry>,
    config: ChatEngineConfig,
}

impl ChatEngine {
    pub fn new(
        retriever: Option<Arc<dyn Retriever>>,
        model: Arc<dyn LanguageModel>,
        capture: LeadCaptureService,
        analytics: Arc<dyn AnalyticsStore>,
        tenants: Arc<TenantRegistry>,
        config: ChatEngineConfig,
    ) -> Self {
        Self {
            retriever,
            model,
            capture,
            analytics,
            tenants,
            config,
        }
    }

    /// Process one chat turn. Infallible: primary-path errors become the
    /// fallback reply, side-channel errors are swallowed.
    pub async fn handle_turn(
        &self,
        tenant_id: &str,
        conversation_id: &str,
        turns: &[Turn],
    ) -> TurnOutcome {
        let (current_message, history) = match split_latest_user_turn(turns) {
            Some(split) => split,
            None => {
                warn!(tenant_id, "Turn sequence has no user message");
                return TurnOutcome {
                    reply_text: self.config.fallback_reply.clone(),
                    capture: None,
                };
            }
        };

        let profile = self.tenants.get(tenant_id);

        match self.generate_reply(&profile, tenant_id, current_message, turns).await {
            Ok((reply, snippet_count)) => {
                let capture = if should_attempt_capture(current_message, &reply) {
                    let candidate = assemble_candidate(current_message, history);
                    Some(
                        self.capture
                            .capture(&candidate, tenant_id, conversation_id)
                            .await,
                    )
                } else {
                    None
                };

                self.record_turn(tenant_id, current_message, &reply, snippet_count, turns)
                    .await;
                metrics::counter!("chat_turns_total").increment(1);

                TurnOutcome {
                    reply_text: reply,
                    capture,
                }
            }
            Err(e) => {
                warn!(tenant_id, conversation_id, error = %e, "Primary path failed, returning fallback reply");
                metrics::counter!("chat_turn_failures_total").increment(1);

                let reply = self.config.fallback_reply.clone();
                self.record_turn(tenant_id, current_message, &reply, 0, turns)
                    .await;

                TurnOutcome {
                    reply_text: reply,
                    capture: None,
                }
            }
        }
    }

    async fn generate_reply(
        &self,
        profile: &TenantProfile,
        tenant_id: &str,
        current_message: &str,
        turns: &[Turn],
    ) -> Result<(String, usize)> {
        let snippets = self.retrieve(tenant_id, current_message).await?;
        debug!(tenant_id, snippets = snippets.len(), "Retrieval complete");

        let system_prompt = build_system_prompt(profile, &snippets);
        let reply = self.model.complete(&system_prompt, turns).await?;

        if reply.trim().is_empty() {
            return Err(Error::Completion("model returned an empty reply".to_string()));
        }

        Ok((reply, snippets.len()))
    }

    async fn retrieve(&self, tenant_id: &str, query: &str) -> Result<Vec<Snippet>> {
        match &self.retriever {
            Some(retriever) => retriever.search(tenant_id, query, self.config.top_k).await,
            None => Ok(Vec::new()),
        }
    }

    async fn record_turn(
        &self,
        tenant_id: &str,
        user_message: &str,
        reply: &str,
        snippet_count: usize,
        turns: &[Turn],
    ) {
        let token_count = turns.iter().map(Turn::estimated_tokens).sum::<usize>()
            + Turn::assistant(reply).estimated_tokens();
        let record = TurnRecord::new(tenant_id, user_message, reply, snippet_count, token_count);

        if let Err(e) = self.analytics.append(&record).await {
            warn!(tenant_id, error = %e, "Analytics write failed");
        } else {
            info!(
                tenant_id,
                record_id = %record.record_id,
                snippet_count,
                token_count,
                "Turn recorded"
            );
        }
    }
}

/// Split the turn sequence at its last user turn: that turn's content is
/// the current message, everything before it is history. Trailing
/// assistant turns after the last user turn are dropped.
fn split_latest_user_turn(turns: &[Turn]) -> Option<(&str, &[Turn])> {
    let idx = turns.iter().rposition(|t| t.role == TurnRole::User)?;
    Some((turns[idx].content.as_str(), &turns[..idx]))
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use chat_widget_persistence::{
        InMemoryAnalyticsStore, InMemoryLeadStore, Lead, LeadNotifier, LeadStore,
    };

    struct FixedModel {
        reply: std::result::Result<String, ()>,
    }

    #[async_trait]
    impl LanguageModel for FixedModel {
        async fn complete(&self, _system_prompt: &str, _turns: &[Turn]) -> Result<String> {
            self.reply
                .clone()
                .map_err(|_| Error::Completion("simulated outage".to_string()))
        }
    }

    struct FixedRetriever {
        snippets: std::result::Result<Vec<Snippet>, ()>,
    }

    #[async_trait]
    impl Retriever for FixedRetriever {
        async fn search(&self, _tenant_id: &str, _query: &str, _top_k: usize) -> Result<Vec<Snippet>> {
            self.snippets
                .clone()
                .map_err(|_| Error::Retrieval("simulated outage".to_string()))
        }
    }

    struct SilentNotifier;

    #[async_trait]
    impl LeadNotifier for SilentNotifier {
        async fn notify(&self, _lead: &Lead) {}
    }

    fn engine(
        model_reply: std::result::Result<&str, ()>,
        retriever: Option<FixedRetriever>,
    ) -> (ChatEngine, Arc<InMemoryLeadStore>, Arc<InMemoryAnalyticsStore>) {
        let leads = Arc::new(InMemoryLeadStore::new());
        let analytics = Arc::new(InMemoryAnalyticsStore::new());
        let capture = LeadCaptureService::new(leads.clone(), Arc::new(SilentNotifier));
        let engine = ChatEngine::new(
            retriever.map(|r| Arc::new(r) as Arc<dyn Retriever>),
            Arc::new(FixedModel {
                reply: model_reply.map(str::to_string),
            }),
            capture,
            analytics.clone(),
            Arc::new(TenantRegistry::new()),
            ChatEngineConfig::default(),
        );
        (engine, leads, analytics)
    }

    #[tokio::test]
    async fn test_reply_without_capture_for_plain_question() {
        let (engine, leads, analytics) = engine(Ok("It is sunny today."), None);

        let outcome = engine
            .handle_turn("demo", "conv_1", &[Turn::user("what's the weather")])
            .await;

        assert_eq!(outcome.reply_text, "It is sunny today.");
        assert!(outcome.capture.is_none());
        assert_eq!(leads.len(), 0);
        assert_eq!(analytics.records().len(), 1);
    }

    #[tokio::test]
    async fn test_end_to_end_lead_capture() {
        let (engine, leads, _analytics) = engine(Ok("Sure, what time works?"), None);

        let turns = vec![
            Turn::user("Hi"),
            Turn::assistant("Hi! How can I help?"),
            Turn::user("I'd like to book a consultation, I'm Jane Smith, jane@acme.com, 754-485-9632"),
        ];
        let outcome = engine.handle_turn("demo", "conv_1", &turns).await;

        assert_eq!(outcome.capture, Some(CaptureOutcome::Created));
        let lead = leads.get("demo", "conv_1").await.unwrap().unwrap();
        assert_eq!(lead.email.as_deref(), Some("jane@acme.com"));
        assert_eq!(lead.phone.as_deref(), Some("(754) 485-9632"));
        assert_eq!(lead.name.as_deref(), Some("Jane Smith"));
        assert!(lead.notification_sent);
    }

    #[tokio::test]
    async fn test_completion_failure_yields_fallback() {
        let (engine, leads, analytics) = engine(Err(()), None);

        let outcome = engine
            .handle_turn("demo", "conv_1", &[Turn::user("can I book an appointment")])
            .await;

        assert_eq!(outcome.reply_text, FALLBACK_REPLY);
        assert!(outcome.capture.is_none());
        // No capture on the failure path, but the turn is still recorded.
        assert_eq!(leads.len(), 0);
        assert_eq!(analytics.records().len(), 1);
    }

    #[tokio::test]
    async fn test_retrieval_failure_yields_fallback() {
        let (engine, _leads, _analytics) = engine(
            Ok("unused"),
            Some(FixedRetriever { snippets: Err(()) }),
        );

        let outcome = engine
            .handle_turn("demo", "conv_1", &[Turn::user("hello")])
            .await;

        assert_eq!(outcome.reply_text, FALLBACK_REPLY);
    }

    #[tokio::test]
    async fn test_snippet_count_recorded() {
        let (engine, _leads, analytics) = engine(
            Ok("We open at 9am."),
            Some(FixedRetriever {
                snippets: Ok(vec![
                    Snippet {
                        text: "Opening hours: 9am-5pm.".to_string(),
                        score: 0.9,
                    },
                    Snippet {
                        text: "Closed on Sundays.".to_string(),
                        score: 0.7,
                    },
                ]),
            }),
        );

        engine
            .handle_turn("demo", "conv_1", &[Turn::user("when do you open")])
            .await;

        let records = analytics.records();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].snippet_count, 2);
    }

    #[tokio::test]
    async fn test_no_user_turn_yields_fallback() {
        let (engine, _leads, analytics) = engine(Ok("unused"), None);

        let outcome = engine
            .handle_turn("demo", "conv_1", &[Turn::assistant("Hello!")])
            .await;

        assert_eq!(outcome.reply_text, FALLBACK_REPLY);
        assert_eq!(analytics.records().len(), 0);
    }

    #[test]
    fn test_split_latest_user_turn() {
        let turns = vec![
            Turn::user("Hi"),
            Turn::assistant("Hello!"),
            Turn::user("I need help"),
        ];
        let (current, history) = split_latest_user_turn(&turns).unwrap();
        assert_eq!(current, "I need help");
        assert_eq!(history.len(), 2);

        assert!(split_latest_user_turn(&[]).is_none());
    }
}
