//! Chat widget backend entry point

use std::net::SocketAddr;
use std::sync::Arc;

use chat_widget_agent::{ChatEngine, ChatEngineConfig, LeadCaptureService};
use chat_widget_config::{load_settings, Settings, TenantRegistry};
use chat_widget_core::{LanguageModel, Retriever};
use chat_widget_llm::{CompletionBackend, CompletionConfig};
use chat_widget_persistence::{
    AnalyticsStore, InMemoryAnalyticsStore, InMemoryLeadStore, LeadStore, NoopLeadNotifier,
    ScyllaConfig,
};
use chat_widget_rag::{EmbeddingConfig, KnowledgeRetriever, RetrieverConfig};
use chat_widget_server::{create_router, init_metrics, AppState};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Priority: env vars > config/{env}.yaml > config/default.yaml > defaults
    let env = std::env::var("CHAT_WIDGET_ENV").ok();
    let settings = match load_settings(env.as_deref()) {
        Ok(settings) => settings,
        Err(e) => {
            // Tracing not yet initialized, use eprintln for early logging
            eprintln!("Warning: failed to load config: {}. Using defaults.", e);
            Settings::default()
        }
    };

    init_tracing();

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        environment = ?settings.environment,
        "Starting chat widget backend"
    );

    let _metrics_handle = init_metrics();
    tracing::info!("Prometheus metrics available at /metrics");

    let tenants = load_tenants(&settings);
    tracing::info!(tenants = tenants.len(), "Tenant profiles loaded");

    // Lead and analytics stores, falling back to in-memory when ScyllaDB is
    // disabled or unreachable.
    let (lead_store, analytics_store, persistence_connected) = init_stores(&settings).await;

    let retriever = init_retriever(&settings).await;
    let rag_connected = retriever.is_some();

    let model: Arc<dyn LanguageModel> =
        Arc::new(CompletionBackend::new(CompletionConfig::from(&settings.llm))?);

    let capture = LeadCaptureService::new(lead_store, Arc::new(NoopLeadNotifier));
    let engine = ChatEngine::new(
        retriever,
        model,
        capture,
        analytics_store,
        tenants.clone(),
        ChatEngineConfig {
            top_k: settings.rag.top_k,
            ..ChatEngineConfig::default()
        },
    );

    let state = AppState::new(
        Arc::new(engine),
        tenants,
        Arc::new(settings.clone()),
        rag_connected,
        persistence_connected,
    );
    let app = create_router(state);

    let addr = SocketAddr::new(settings.server.host.parse()?, settings.server.port);
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server shutdown complete");
    Ok(())
}

fn init_tracing() {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "chat_widget=info,tower_http=info".into());

    tracing_subscriber::fmt().with_env_filter(env_filter).init();
}

fn load_tenants(settings: &Settings) -> Arc<TenantRegistry> {
    match TenantRegistry::load_dir(&settings.tenants_dir) {
        Ok(registry) => Arc::new(registry),
        Err(e) => {
            tracing::warn!(
                dir = %settings.tenants_dir,
                error = %e,
                "Failed to load tenant profiles, starting with demo fallback only"
            );
            Arc::new(TenantRegistry::new())
        }
    }
}

async fn init_stores(
    settings: &Settings,
) -> (Arc<dyn LeadStore>, Arc<dyn AnalyticsStore>, bool) {
    if settings.persistence.enabled {
        let config = ScyllaConfig::new(
            settings.persistence.scylla_hosts.clone(),
            settings.persistence.keyspace.clone(),
            settings.persistence.replication_factor,
        );
        match chat_widget_persistence::init(config).await {
            Ok(layer) => {
                tracing::info!(
                    hosts = ?settings.persistence.scylla_hosts,
                    keyspace = %settings.persistence.keyspace,
                    "ScyllaDB persistence initialized"
                );
                return (Arc::new(layer.leads), Arc::new(layer.analytics), true);
            }
            Err(e) => {
                tracing::error!(
                    error = %e,
                    "Failed to initialize ScyllaDB, falling back to in-memory stores"
                );
            }
        }
    } else {
        tracing::info!("Persistence disabled, using in-memory stores");
    }

    (
        Arc::new(InMemoryLeadStore::new()),
        Arc::new(InMemoryAnalyticsStore::new()),
        false,
    )
}

async fn init_retriever(settings: &Settings) -> Option<Arc<dyn Retriever>> {
    if !settings.rag.enabled {
        tracing::info!("Retrieval disabled, replies will not use knowledge context");
        return None;
    }

    let config = RetrieverConfig {
        endpoint: settings.rag.qdrant_endpoint.clone(),
        collection: settings.rag.qdrant_collection.clone(),
        api_key: std::env::var("QDRANT_API_KEY").ok(),
        embedding: EmbeddingConfig::default(),
    };

    match KnowledgeRetriever::connect(config).await {
        Ok(retriever) => {
            tracing::info!(
                endpoint = %settings.rag.qdrant_endpoint,
                collection = %settings.rag.qdrant_collection,
                "Qdrant retriever initialized"
            );
            Some(Arc::new(retriever))
        }
        Err(e) => {
            tracing::warn!(
                error = %e,
                "Failed to connect to Qdrant, continuing without knowledge context"
            );
            None
        }
    }
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM)
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl+C handler");
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C, shutting down");
        }
        _ = terminate => {
            tracing::info!("Received SIGTERM, shutting down");
        }
    }
}
