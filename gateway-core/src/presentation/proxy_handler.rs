// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! Data-plane entry points — `POST /adapters/{name}/mcp` and `POST /mcp`
//! (§4.8). Wires C7 (session routing) and C8 (reverse proxy) together behind
//! the axum request/response types.

use std::sync::Arc;

use axum::extract::{Extension, Path, Request, State};
use axum::http::{HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};

use crate::application::session_routing::RouteTarget;
use crate::domain::error::GatewayError;
use crate::domain::permission::{evaluate, Operation, Principal};
use crate::infrastructure::reverse_proxy::ProxyError;
use crate::presentation::api::AppState;

/// The MCP streamable-HTTP session header, opaque to this gateway (§6.1).
pub const SESSION_HEADER: &str = "mcp-session-id";

pub async fn adapter_mcp(
    State(state): State<Arc<AppState>>,
    Extension(principal): Extension<Principal>,
    Path(name): Path<String>,
    request: Request,
) -> Response {
    let Some(record) = state.adapter_repo.try_get(&name).await.unwrap_or(None) else {
        return GatewayError::NotFound(name).into_response();
    };
    if !evaluate(&principal, &record, Operation::Read) {
        return GatewayError::Forbidden.into_response();
    }

    proxy(&state, &name, ProxyKind::Adapter, request).await
}

pub async fn root_mcp(State(state): State<Arc<AppState>>, request: Request) -> Response {
    let workload = state.toolgateway_workload_name.clone();
    proxy(&state, &workload, ProxyKind::Root, request).await
}

/// Which rewrite rule applies to the resolved backend URL: an adapter's own
/// `/adapters/<name>/...` prefix gets stripped, the bare `/mcp` entry always
/// lands on the toolgateway's fixed `/mcp/rpc` route.
enum ProxyKind {
    Adapter,
    Root,
}

async fn proxy(state: &AppState, workload_name: &str, kind: ProxyKind, request: Request) -> Response {
    let session_id = request
        .headers()
        .get(SESSION_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(|s| s.to_string());

    let target = match &session_id {
        Some(session_id) => RouteTarget::ExistingSession { session_id },
        None => RouteTarget::NewSession { workload_name },
    };

    let backend = match state.session_routing.resolve(target).await {
        Ok(backend) => backend,
        Err(e) => return e.into_response(),
    };

    let (parts, body) = request.into_parts();
    let target_url = match kind {
        ProxyKind::Adapter => crate::infrastructure::reverse_proxy::ReverseProxy::rewrite_target(&backend, &parts.uri),
        ProxyKind::Root => crate::infrastructure::reverse_proxy::ReverseProxy::root_target(&backend, &parts.uri),
    };

    let is_new_session = session_id.is_none();
    match state.reverse_proxy.forward(parts.method, &target_url, parts.headers, body).await {
        Ok(proxied) => {
            if is_new_session {
                if let Some(new_session_id) = proxied.headers.get(SESSION_HEADER).and_then(|v: &HeaderValue| v.to_str().ok())
                {
                    if let Err(e) = state.session_routing.bind_new_session(new_session_id, &backend).await {
                        tracing::warn!(session_id = new_session_id, backend = %backend, error = %e, "failed to bind new session");
                    }
                }
            }
            let mut response = Response::builder().status(proxied.status);
            *response.headers_mut().unwrap() = proxied.headers;
            response.body(proxied.body).unwrap()
        }
        Err(ProxyError::ConnectFailed(msg)) => {
            (StatusCode::BAD_GATEWAY, format!("upstream connect failed: {msg}")).into_response()
        }
    }
}
