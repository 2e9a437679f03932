//! HTTP endpoints
//!
//! REST API consumed by the embedded chat widget.

use axum::{
    extract::{Json, State},
    http::{HeaderValue, Method, StatusCode},
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use uuid::Uuid;

use chat_widget_core::Turn;

use crate::metrics::metrics_handler;
use crate::state::AppState;
use crate::ServerError;

/// Create the application router
pub fn create_router(state: AppState) -> Router {
    let cors_layer = build_cors_layer(
        &state.settings.server.cors_origins,
        state.settings.server.cors_enabled,
    );

    Router::new()
        .route("/api/chat", post(chat))
        .route("/health", get(health_check))
        .route("/ready", get(readiness_check))
        .route("/metrics", get(metrics_handler))
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer)
        .with_state(state)
}

/// Build the CORS layer from configured origins.
///
/// The widget is embedded on customer sites, so cross-origin requests are
/// the normal case. With CORS disabled or no valid origins configured the
/// layer is permissive; production deployments list their origins.
fn build_cors_layer(origins: &[String], enabled: bool) -> CorsLayer {
    if !enabled {
        tracing::warn!("CORS restrictions disabled, allowing all origins");
        return CorsLayer::permissive();
    }

    let parsed_origins: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| {
            origin.parse::<HeaderValue>().ok().or_else(|| {
                tracing::warn!("Invalid CORS origin: {}", origin);
                None
            })
        })
        .collect();

    if parsed_origins.is_empty() {
        tracing::warn!("No valid CORS origins configured, allowing all origins");
        return CorsLayer::permissive();
    }

    tracing::info!("CORS configured with {} origins", parsed_origins.len());
    CorsLayer::new()
        .allow_origin(parsed_origins)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers(Any)
}

/// Chat request from the widget
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ChatRequest {
    conversation_turns: Vec<Turn>,
    tenant_id: String,
    conversation_id: Option<String>,
}

/// Chat response to the widget
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ChatResponse {
    reply_text: String,
}

/// Handle one chat turn
async fn chat(
    State(state): State<AppState>,
    Json(request): Json<ChatRequest>,
) -> Result<Json<ChatResponse>, (StatusCode, String)> {
    if request.tenant_id.trim().is_empty() {
        let err = ServerError::InvalidRequest("tenantId is required".to_string());
        return Err((err.into(), "tenantId is required".to_string()));
    }
    if request.conversation_turns.is_empty() {
        let err = ServerError::InvalidRequest("conversationTurns is empty".to_string());
        return Err((err.into(), "conversationTurns is empty".to_string()));
    }

    let conversation_id = request
        .conversation_id
        .filter(|id| !id.trim().is_empty())
        .unwrap_or_else(|| Uuid::new_v4().to_string());

    let outcome = state
        .engine
        .handle_turn(
            &request.tenant_id,
            &conversation_id,
            &request.conversation_turns,
        )
        .await;

    Ok(Json(ChatResponse {
        reply_text: outcome.reply_text,
    }))
}

/// Liveness check
async fn health_check(State(state): State<AppState>) -> (StatusCode, Json<serde_json::Value>) {
    let body = serde_json::json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "tenants": state.tenants.len(),
    });
    (StatusCode::OK, Json(body))
}

/// Readiness check reports which optional subsystems connected at startup
async fn readiness_check(State(state): State<AppState>) -> (StatusCode, Json<serde_json::Value>) {
    let body = serde_json::json!({
        "status": "ready",
        "rag": if state.rag_connected { "connected" } else { "disabled" },
        "persistence": if state.persistence_connected { "connected" } else { "in-memory" },
    });
    (StatusCode::OK, Json(body))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use async_trait::async_trait;
    use axum::body::Body;
    use axum::http::Request;
    use tower::util::ServiceExt;

    use chat_widget_agent::{ChatEngine, ChatEngineConfig, LeadCaptureService};
    use chat_widget_config::{Settings, TenantRegistry};
    use chat_widget_core::{LanguageModel, Result as CoreResult};
    use chat_widget_persistence::{
        InMemoryAnalyticsStore, InMemoryLeadStore, NoopLeadNotifier,
    };

    struct EchoModel;

    #[async_trait]
    impl LanguageModel for EchoModel {
        async fn complete(&self, _system_prompt: &str, turns: &[Turn]) -> CoreResult<String> {
            Ok(format!("echo: {}", turns.last().map(|t| t.content.as_str()).unwrap_or("")))
        }
    }

    fn test_state() -> AppState {
        let engine = ChatEngine::new(
            None,
            Arc::new(EchoModel),
            LeadCaptureService::new(
                Arc::new(InMemoryLeadStore::new()),
                Arc::new(NoopLeadNotifier),
            ),
            Arc::new(InMemoryAnalyticsStore::new()),
            Arc::new(TenantRegistry::new()),
            ChatEngineConfig::default(),
        );
        AppState::new(
            Arc::new(engine),
            Arc::new(TenantRegistry::new()),
            Arc::new(Settings::default()),
            false,
            false,
        )
    }

    #[tokio::test]
    async fn test_health_endpoint() {
        let app = create_router(test_state());
        let response = app
            .oneshot(
                Request::builder()
                    .uri("/health")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_chat_happy_path() {
        let app = create_router(test_state());
        let body = serde_json::json!({
            "conversationTurns": [{"role": "user", "content": "hello"}],
            "tenantId": "demo",
        });
        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api/chat")
                    .header("content-type", "application/json")
                    .body(Body::from(body.to_string()))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let parsed: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(parsed["replyText"], "echo: hello");
    }

    #[tokio::test]
    async fn test_chat_rejects_empty_turns() {
        let app = create_router(test_state());
        let body = serde_json::json!({
            "conversationTurns": [],
            "tenantId": "demo",
        });
        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api/chat")
                    .header("content-type", "application/json")
                    .body(Body::from(body.to_string()))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_chat_rejects_missing_tenant() {
        let app = create_router(test_state());
        let body = serde_json::json!({
            "conversationTurns": [{"role": "user", "content": "hello"}],
            "tenantId": "",
        });
        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api/chat")
                    .header("content-type", "application/json")
                    .body(Body::from(body.to_string()))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
