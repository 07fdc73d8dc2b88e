// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Wires config → repositories → deployment manager → session routing →
//! `AppState`, then serves either the main gateway route table or the
//! `toolgateway` role's MCP surface (§6.1/§6.3).

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use gateway_core::application::repository_factory::{create_adapter_repository, create_tool_repository};
use gateway_core::application::session_routing::SessionRoutingHandler;
use gateway_core::application::tool_gateway::ToolGatewayRouter;
use gateway_core::domain::deployment::DeploymentManager;
use gateway_core::domain::identity::TokenValidator;
use gateway_core::domain::repository::{PostgresConfig, RedisConfig, StorageBackend};
use gateway_core::domain::session::{RedisSessionConfig, SessionStoreBackend};
use gateway_core::infrastructure::deployment::kube_client::{FakeKubeClient, RealKubeClient};
use gateway_core::infrastructure::deployment::KubeDeploymentManager;
use gateway_core::infrastructure::identity::JwtTokenValidator;
use gateway_core::infrastructure::node_info;
use gateway_core::infrastructure::session_store::create_session_store;
use gateway_core::presentation::api;

use crate::config::{GatewayConfig, ResourceStoreConfig, SessionStoreConfig};

/// Node pod DNS port — fixed, not one of the §6.3 option groups.
const MCP_PORT: u16 = 443;
const NODE_INFO_CACHE_TTL: Duration = Duration::from_secs(15);

fn resource_store_backend(config: &ResourceStoreConfig) -> StorageBackend {
    match config {
        ResourceStoreConfig::InMemory => StorageBackend::InMemory,
        ResourceStoreConfig::DistributedCache { connection_string } => {
            StorageBackend::Redis(RedisConfig { connection_string: connection_string.clone() })
        }
        ResourceStoreConfig::DocumentDb { connection_string } => {
            StorageBackend::Postgres(PostgresConfig { connection_string: connection_string.clone() })
        }
    }
}

fn session_store_backend(config: &SessionStoreConfig) -> SessionStoreBackend {
    match config {
        SessionStoreConfig::InMemory => SessionStoreBackend::InMemory,
        SessionStoreConfig::DistributedCache { connection_string, ttl_seconds } => {
            SessionStoreBackend::Redis(RedisSessionConfig {
                connection_string: connection_string.clone(),
                ttl_seconds: *ttl_seconds,
            })
        }
    }
}

/// Builds the deployment manager: a real `kube::Client` against the cluster
/// when reachable, falling back to the in-memory fake under
/// `development.mode` (mirrors the teacher's embedded-vs-daemon posture).
async fn build_deployment_manager(config: &GatewayConfig) -> anyhow::Result<(Arc<dyn DeploymentManager>, Option<kube::Client>)> {
    let registry = config.container_registry.endpoint.clone();
    if config.development.mode {
        tracing::info!("development.mode: using an in-memory deployment manager, no cluster required");
        let manager = KubeDeploymentManager::new(FakeKubeClient::default(), registry);
        return Ok((Arc::new(manager), None));
    }

    let client = kube::Client::try_default().await.context("failed to build Kubernetes client")?;
    let real = RealKubeClient::new(client.clone(), config.orchestrator.namespace.clone());
    let manager = KubeDeploymentManager::new(real, registry);
    Ok((Arc::new(manager), Some(client)))
}

/// Builds the edge bearer-token validator (§4.10/§6.3). `development.mode`
/// skips it entirely — the middleware falls back to `X-Dev-*` headers
/// instead. Outside dev mode a missing signing key is a startup failure,
/// not a silent open edge.
fn build_token_validator(config: &GatewayConfig) -> anyhow::Result<Option<Arc<dyn TokenValidator>>> {
    if config.development.mode {
        return Ok(None);
    }

    let identity = &config.identity_provider;
    if identity.public_key_pem.is_empty() {
        anyhow::bail!("identityProvider.publicKeyPem is required outside development.mode");
    }

    let validator = JwtTokenValidator::new(&identity.public_key_pem, &identity.issuer, &identity.audience)
        .context("failed to build token validator")?;
    Ok(Some(Arc::new(validator)))
}

pub async fn run(config: GatewayConfig, bind_address: &str) -> anyhow::Result<()> {
    let adapter_repo = create_adapter_repository(&resource_store_backend(&config.resource_store)).await?;
    let tool_repo = create_tool_repository(&resource_store_backend(&config.resource_store)).await?;
    let session_store = create_session_store(&session_store_backend(&config.session_store)).await?;
    let (deployment, kube_client) = build_deployment_manager(&config).await?;

    let node_info = match kube_client {
        Some(client) => node_info::into_provider(client, config.orchestrator.namespace.clone(), MCP_PORT, NODE_INFO_CACHE_TTL),
        None => Arc::new(DevNodeInfoProvider) as Arc<dyn gateway_core::domain::node_info::NodeInfoProvider>,
    };

    let session_routing = Arc::new(SessionRoutingHandler::new(node_info, session_store));

    let token_validator = build_token_validator(&config)?;

    let state = api::new_state(
        adapter_repo,
        tool_repo,
        deployment,
        session_routing,
        config.tool_gateway_workload_name.clone(),
        config.development.mode,
        token_validator,
    );

    let metrics_handle = if config.observability.metrics.enabled {
        Some(gateway_core::infrastructure::metrics::install_recorder().context("failed to install metrics recorder")?)
    } else {
        None
    };

    let app = api::app(state, metrics_handle);
    let listener = tokio::net::TcpListener::bind(bind_address).await?;
    tracing::info!(%bind_address, "gateway listening");
    axum::serve(listener, app).with_graceful_shutdown(shutdown_signal()).await?;
    Ok(())
}

/// Runs the `toolgateway` role's own process: just the MCP JSON surface over
/// the same resource store, no `/adapters`/`/tools` CRUD surface.
pub async fn run_toolgateway(config: GatewayConfig, bind_address: &str) -> anyhow::Result<()> {
    let tool_repo = create_tool_repository(&resource_store_backend(&config.resource_store)).await?;
    let tool_gateway = Arc::new(ToolGatewayRouter::new(tool_repo, config.orchestrator.namespace.clone()));

    let app = api::toolgateway_app(tool_gateway);
    let listener = tokio::net::TcpListener::bind(bind_address).await?;
    tracing::info!(%bind_address, "toolgateway listening");
    axum::serve(listener, app).with_graceful_shutdown(shutdown_signal()).await?;
    Ok(())
}

async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
}

/// `development.mode` without a cluster: every workload resolves to
/// `localhost`, matching the mock-principal posture of the same flag in
/// [`gateway_core::presentation::middleware::identity`].
struct DevNodeInfoProvider;

#[async_trait::async_trait]
impl gateway_core::domain::node_info::NodeInfoProvider for DevNodeInfoProvider {
    async fn resolve_endpoints(
        &self,
        workload_name: &str,
    ) -> Result<Vec<gateway_core::domain::node_info::ReplicaEndpoint>, gateway_core::domain::node_info::NodeInfoError> {
        Ok(vec![gateway_core::domain::node_info::ReplicaEndpoint {
            workload_name: workload_name.to_string(),
            ordinal: 0,
            address: format!("http://{workload_name}.localhost:{MCP_PORT}"),
        }])
    }
}
