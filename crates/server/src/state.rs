//! Shared application state

use std::sync::Arc;

use chat_widget_agent::ChatEngine;
use chat_widget_config::{Settings, TenantRegistry};

/// State shared across all request handlers
#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<ChatEngine>,
    pub tenants: Arc<TenantRegistry>,
    pub settings: Arc<Settings>,
    /// True when the retriever connected at startup
    pub rag_connected: bool,
    /// True when ScyllaDB persistence connected at startup
    pub persistence_connected: bool,
}

impl AppState {
    pub fn new(
        engine: Arc<ChatEngine>,
        tenants: Arc<TenantRegistry>,
        settings: Arc<Settings>,
        rag_connected: bool,
        persistence_connected: bool,
    ) -> Self {
        Self {
            engine,
            tenants,
            settings,
            rag_connected,
            persistence_connected,
        }
    }
}
