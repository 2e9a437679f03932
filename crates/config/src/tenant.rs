//! Tenant business profiles
//!
//! Each customer business (tenant) ships a YAML profile describing the
//! knowledge the prompt builder needs: business name, tone, services, FAQ,
//! and free-text special instructions. Profiles are read-only at runtime;
//! the registry is loaded once at startup.

use std::collections::HashMap;
use std::path::Path;

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

use crate::ConfigError;

/// One FAQ entry in a tenant profile
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FaqEntry {
    pub question: String,
    pub answer: String,
}

/// Per-tenant configuration consumed by prompt assembly
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TenantProfile {
    /// Tenant identifier, matches the widget's tenantId
    pub id: String,
    /// Business display name
    pub business_name: String,
    /// Tone/style instruction, e.g. "friendly and concise"
    #[serde(default = "default_tone")]
    pub tone: String,
    /// Services the business offers
    #[serde(default)]
    pub services: Vec<String>,
    /// Frequently asked questions
    #[serde(default)]
    pub faq: Vec<FaqEntry>,
    /// Free-text special instructions appended to the system prompt
    #[serde(default)]
    pub special_instructions: String,
}

fn default_tone() -> String {
    "friendly and professional".to_string()
}

impl TenantProfile {
    /// Built-in profile used when a tenant has no YAML file yet
    pub fn demo(id: &str) -> Self {
        Self {
            id: id.to_string(),
            business_name: "Demo Business".to_string(),
            tone: default_tone(),
            services: Vec::new(),
            faq: Vec::new(),
            special_instructions: String::new(),
        }
    }
}

/// In-memory registry of tenant profiles, loaded from a directory of YAML
/// files at startup.
pub struct TenantRegistry {
    profiles: RwLock<HashMap<String, TenantProfile>>,
}

impl TenantRegistry {
    pub fn new() -> Self {
        Self {
            profiles: RwLock::new(HashMap::new()),
        }
    }

    /// Load every `*.yaml`/`*.yml` file under `dir` as a tenant profile.
    /// A missing directory is not an error; the registry just stays empty.
    pub fn load_dir(dir: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let registry = Self::new();
        let dir = dir.as_ref();

        if !dir.exists() {
            tracing::warn!(dir = %dir.display(), "Tenant profile directory missing, starting empty");
            return Ok(registry);
        }

        for entry in std::fs::read_dir(dir)? {
            let path = entry?.path();
            let is_yaml = path
                .extension()
                .and_then(|e| e.to_str())
                .map(|e| e == "yaml" || e == "yml")
                .unwrap_or(false);
            if !is_yaml {
                continue;
            }

            let raw = std::fs::read_to_string(&path)?;
            let profile: TenantProfile = serde_yaml::from_str(&raw)
                .map_err(|e| ConfigError::Tenant(format!("{}: {}", path.display(), e)))?;

            tracing::info!(tenant_id = %profile.id, file = %path.display(), "Loaded tenant profile");
            registry.insert(profile);
        }

        Ok(registry)
    }

    pub fn insert(&self, profile: TenantProfile) {
        self.profiles.write().insert(profile.id.clone(), profile);
    }

    /// Look up a tenant profile, falling back to the demo profile so an
    /// unknown tenantId still gets a working (if generic) assistant.
    pub fn get(&self, tenant_id: &str) -> TenantProfile {
        self.profiles
            .read()
            .get(tenant_id)
            .cloned()
            .unwrap_or_else(|| {
                tracing::debug!(tenant_id, "No profile found, using demo profile");
                TenantProfile::demo(tenant_id)
            })
    }

    pub fn len(&self) -> usize {
        self.profiles.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.profiles.read().is_empty()
    }
}

impl Default for TenantRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registry_fallback() {
        let registry = TenantRegistry::new();
        let profile = registry.get("unknown");
        assert_eq!(profile.id, "unknown");
        assert_eq!(profile.business_name, "Demo Business");
    }

    #[test]
    fn test_load_dir() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("acme.yaml"),
            r#"
id: acme
business_name: Acme Plumbing
tone: warm and direct
services:
  - drain cleaning
  - water heaters
faq:
  - question: Do you work weekends?
    answer: Yes, Saturdays 9-5.
"#,
        )
        .unwrap();
        std::fs::write(dir.path().join("notes.txt"), "ignored").unwrap();

        let registry = TenantRegistry::load_dir(dir.path()).unwrap();
        assert_eq!(registry.len(), 1);

        let profile = registry.get("acme");
        assert_eq!(profile.business_name, "Acme Plumbing");
        assert_eq!(profile.services.len(), 2);
        assert_eq!(profile.faq[0].answer, "Yes, Saturdays 9-5.");
    }

    #[test]
    fn test_missing_dir_is_empty() {
        let registry = TenantRegistry::load_dir("/nonexistent/tenants").unwrap();
        assert!(registry.is_empty());
    }
}
