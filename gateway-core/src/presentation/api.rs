// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! Application state and route table for the main gateway process (the
//! `gateway` role — as opposed to the `toolgateway` role served by
//! [`crate::presentation::mcp_server`]).

use std::sync::Arc;

use axum::routing::{get, post};
use axum::Router;

use crate::application::resource_service::ResourceService;
use crate::application::session_routing::SessionRoutingHandler;
use crate::application::tool_gateway::ToolGatewayRouter;
use crate::domain::deployment::DeploymentManager;
use crate::domain::identity::TokenValidator;
use crate::domain::record::{AdapterRecord, ToolRecord};
use crate::domain::repository::RecordRepository;
use crate::infrastructure::reverse_proxy::ReverseProxy;
use crate::presentation::{adapters, middleware, proxy_handler, tools};

pub struct AppState {
    pub adapter_service: ResourceService<AdapterRecord>,
    pub tool_service: ResourceService<ToolRecord>,
    pub adapter_repo: Arc<dyn RecordRepository<AdapterRecord>>,
    pub deployment: Arc<dyn DeploymentManager>,
    pub session_routing: Arc<SessionRoutingHandler>,
    pub reverse_proxy: ReverseProxy,
    pub toolgateway_workload_name: String,
    pub development_mode: bool,
    /// The edge bearer-token verifier (§4.10). Always present outside
    /// `development_mode` — [`crate::presentation::middleware::identity`]
    /// never falls back to forwarded headers in production, so a missing
    /// validator there is a 401, not a silent bypass.
    pub token_validator: Option<Arc<dyn TokenValidator>>,
}

pub fn app(state: AppState, metrics: Option<metrics_exporter_prometheus::PrometheusHandle>) -> Router {
    let state = Arc::new(state);

    let router = Router::new()
        .route("/adapters", post(adapters::create).get(adapters::list))
        .route(
            "/adapters/{name}",
            get(adapters::get).put(adapters::update).delete(adapters::delete),
        )
        .route("/adapters/{name}/status", get(adapters::status))
        .route("/adapters/{name}/logs", get(adapters::logs))
        .route("/adapters/{name}/mcp", post(proxy_handler::adapter_mcp))
        .route("/tools", post(tools::create).get(tools::list))
        .route("/tools/{name}", get(tools::get).put(tools::update).delete(tools::delete))
        .route("/tools/{name}/status", get(tools::status))
        .route("/tools/{name}/logs", get(tools::logs))
        .route("/mcp", post(proxy_handler::root_mcp))
        .layer(axum::middleware::from_fn_with_state(state.clone(), middleware::identity::require_principal))
        .with_state(state);

    // `/metrics` sits outside identity-forwarding: it's scraped by the
    // orchestrator, not called by a tenant.
    match metrics {
        Some(handle) => router.merge(crate::infrastructure::metrics::router(handle)),
        None => router,
    }
}

#[allow(clippy::too_many_arguments)]
pub fn new_state(
    adapter_repo: Arc<dyn RecordRepository<AdapterRecord>>,
    tool_repo: Arc<dyn RecordRepository<ToolRecord>>,
    deployment: Arc<dyn DeploymentManager>,
    session_routing: Arc<SessionRoutingHandler>,
    toolgateway_workload_name: String,
    development_mode: bool,
    token_validator: Option<Arc<dyn TokenValidator>>,
) -> AppState {
    AppState {
        adapter_service: ResourceService::new(adapter_repo.clone(), deployment.clone()),
        tool_service: ResourceService::new(tool_repo, deployment.clone()),
        adapter_repo,
        deployment,
        session_routing,
        reverse_proxy: ReverseProxy::new(),
        toolgateway_workload_name,
        development_mode,
        token_validator,
    }
}

/// Builds the `toolgateway` role's own process router (§4.8/§4.9): the MCP
/// JSON surface for list-tools/call-tool, reached only through the main
/// gateway's reverse proxy — never through [`app`].
pub fn toolgateway_app(tool_gateway: Arc<ToolGatewayRouter>) -> Router {
    crate::presentation::mcp_server::router(tool_gateway)
}
