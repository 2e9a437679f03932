//! HTTP server for the chat widget backend
//!
//! Exposes the chat endpoint the embedded widget calls, plus health,
//! readiness, and Prometheus metrics endpoints.

pub mod http;
pub mod metrics;
pub mod state;

pub use http::create_router;
pub use metrics::{init_metrics, metrics_handler};
pub use state::AppState;

use thiserror::Error;

/// Server errors. Unknown tenants are not an error at this layer; they
/// fall back to the demo profile in the registry.
#[derive(Error, Debug)]
pub enum ServerError {
    #[error("Invalid request: {0}")]
    InvalidRequest(String),
}

impl From<ServerError> for axum::http::StatusCode {
    fn from(err: ServerError) -> Self {
        match err {
            ServerError::InvalidRequest(_) => axum::http::StatusCode::BAD_REQUEST,
        }
    }
}
