//! Configuration for the chat widget backend
//!
//! Two concerns live here:
//! - [`Settings`]: layered runtime settings (yaml files + env overrides)
//! - [`TenantRegistry`]: read-only per-tenant business profiles consumed by
//!   prompt assembly

pub mod settings;
pub mod tenant;

pub use settings::{
    load_settings, LlmConfig, PersistenceConfig, RagConfig, RuntimeEnvironment, ServerConfig,
    Settings,
};
pub use tenant::{FaqEntry, TenantProfile, TenantRegistry};

use thiserror::Error;

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to load settings: {0}")]
    Load(#[from] config::ConfigError),

    #[error("Invalid setting: {0}")]
    Validation(String),

    #[error("Tenant profile error: {0}")]
    Tenant(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
