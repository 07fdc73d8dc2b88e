// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Gateway configuration (§6.3) — the six recognized option groups, loaded
//! from YAML with `GATEWAY_*` environment overrides, grounded on the
//! teacher's `NodeConfigManifest` discovery/override pattern.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct GatewayConfig {
    #[serde(default = "default_public_origin")]
    pub public_origin: String,
    #[serde(default)]
    pub identity_provider: IdentityProviderConfig,
    #[serde(default)]
    pub resource_store: ResourceStoreConfig,
    #[serde(default)]
    pub session_store: SessionStoreConfig,
    #[serde(default)]
    pub orchestrator: OrchestratorConfig,
    #[serde(default)]
    pub container_registry: ContainerRegistryConfig,
    #[serde(default = "default_toolgateway_workload_name")]
    pub tool_gateway_workload_name: String,
    #[serde(default)]
    pub development: DevelopmentConfig,
    #[serde(default)]
    pub observability: ObservabilityConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct IdentityProviderConfig {
    #[serde(default)]
    pub issuer: String,
    #[serde(default)]
    pub audience: String,
    #[serde(default)]
    pub tenant_id: String,
    #[serde(default)]
    pub client_id: String,
    /// RSA public key (PEM), the signing key the token validator checks
    /// tokens against. Required outside `development.mode`.
    #[serde(default)]
    pub public_key_pem: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum ResourceStoreConfig {
    InMemory,
    #[serde(rename_all = "camelCase")]
    DistributedCache { connection_string: String },
    #[serde(rename_all = "camelCase")]
    DocumentDb { connection_string: String },
}

impl Default for ResourceStoreConfig {
    fn default() -> Self {
        ResourceStoreConfig::InMemory
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum SessionStoreConfig {
    InMemory,
    #[serde(rename_all = "camelCase")]
    DistributedCache { connection_string: String, #[serde(default = "default_session_ttl")] ttl_seconds: u64 },
}

impl Default for SessionStoreConfig {
    fn default() -> Self {
        SessionStoreConfig::InMemory
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrchestratorConfig {
    #[serde(default = "default_namespace")]
    pub namespace: String,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self { namespace: default_namespace() }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ContainerRegistryConfig {
    #[serde(default)]
    pub endpoint: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct DevelopmentConfig {
    #[serde(default)]
    pub mode: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct ObservabilityConfig {
    #[serde(default)]
    pub metrics: MetricsConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricsConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self { enabled: true }
    }
}

fn default_true() -> bool {
    true
}

fn default_public_origin() -> String {
    "http://localhost:8080".to_string()
}

fn default_toolgateway_workload_name() -> String {
    "toolgateway".to_string()
}

fn default_namespace() -> String {
    "adapter".to_string()
}

fn default_session_ttl() -> u64 {
    3600
}

impl GatewayConfig {
    pub fn from_yaml_file(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Ok(serde_yaml::from_str(&content)?)
    }

    /// `GATEWAY_CONFIG_PATH` env var, else `./gateway-config.yaml`, else defaults.
    pub fn discover_config() -> Option<PathBuf> {
        if let Ok(path) = std::env::var("GATEWAY_CONFIG_PATH") {
            let path = PathBuf::from(path);
            if path.exists() {
                return Some(path);
            }
        }
        let cwd = PathBuf::from("./gateway-config.yaml");
        cwd.exists().then_some(cwd)
    }

    pub fn load_or_default(cli_path: Option<PathBuf>) -> anyhow::Result<Self> {
        let mut config = if let Some(path) = cli_path {
            tracing::info!(?path, "loading configuration from explicit path");
            Self::from_yaml_file(&path)?
        } else if let Some(path) = Self::discover_config() {
            tracing::info!(?path, "loading configuration from discovered path");
            Self::from_yaml_file(&path)?
        } else {
            tracing::warn!("no configuration file found, using defaults");
            Self::default()
        };
        config.apply_env_overrides();
        Ok(config)
    }

    pub fn apply_env_overrides(&mut self) {
        if let Ok(val) = std::env::var("GATEWAY_PUBLIC_ORIGIN") {
            self.public_origin = val;
        }
        if let Ok(val) = std::env::var("GATEWAY_ORCHESTRATOR_NAMESPACE") {
            self.orchestrator.namespace = val;
        }
        if let Ok(val) = std::env::var("GATEWAY_CONTAINER_REGISTRY_ENDPOINT") {
            self.container_registry.endpoint = val;
        }
        if let Ok(val) = std::env::var("GATEWAY_TOOLGATEWAY_WORKLOAD_NAME") {
            self.tool_gateway_workload_name = val;
        }
        if let Ok(val) = std::env::var("GATEWAY_DEVELOPMENT_MODE") {
            self.development.mode = matches!(val.to_lowercase().as_str(), "true" | "1" | "yes" | "on");
        }
        if let Ok(val) = std::env::var("GATEWAY_METRICS_ENABLED") {
            self.observability.metrics.enabled = matches!(val.to_lowercase().as_str(), "true" | "1" | "yes" | "on");
        }
        if let Ok(val) = std::env::var("GATEWAY_IDENTITY_PROVIDER_ISSUER") {
            self.identity_provider.issuer = val;
        }
        if let Ok(val) = std::env::var("GATEWAY_IDENTITY_PROVIDER_AUDIENCE") {
            self.identity_provider.audience = val;
        }
        if let Ok(val) = std::env::var("GATEWAY_IDENTITY_PROVIDER_PUBLIC_KEY_PEM") {
            self.identity_provider.public_key_pem = val;
        }
    }
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            public_origin: default_public_origin(),
            identity_provider: IdentityProviderConfig::default(),
            resource_store: ResourceStoreConfig::default(),
            session_store: SessionStoreConfig::default(),
            orchestrator: OrchestratorConfig::default(),
            container_registry: ContainerRegistryConfig::default(),
            tool_gateway_workload_name: default_toolgateway_workload_name(),
            development: DevelopmentConfig::default(),
            observability: ObservabilityConfig::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_local_and_in_memory() {
        let config = GatewayConfig::default();
        assert!(matches!(config.resource_store, ResourceStoreConfig::InMemory));
        assert!(matches!(config.session_store, SessionStoreConfig::InMemory));
        assert_eq!(config.orchestrator.namespace, "adapter");
        assert_eq!(config.tool_gateway_workload_name, "toolgateway");
        assert!(!config.development.mode);
    }

    #[test]
    fn yaml_roundtrip_preserves_document_db_backend() {
        let yaml = r#"
resourceStore:
  kind: document-db
  connectionString: "postgres://localhost/gateway"
"#;
        let config: GatewayConfig = serde_yaml::from_str(yaml).unwrap();
        assert!(matches!(config.resource_store, ResourceStoreConfig::DocumentDb { .. }));
    }
}
