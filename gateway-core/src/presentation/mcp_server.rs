// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! The tool-gateway workload's own MCP surface (C9) — served by the process
//! running in the `toolgateway` role, reached through the data-plane proxy
//! rather than mounted alongside `/adapters`/`/tools`. This router carries
//! its own state (just the [`ToolGatewayRouter`]) since the `toolgateway`
//! role never needs the rest of [`super::api::AppState`].
//!
//! This is the intra-cluster hop §4.10 carves out for `X_MCP_*`
//! forwarded-identity headers: the toolgateway workload is reached only
//! through the main gateway's reverse proxy, never directly from an
//! external caller, so trusting headers here does not reopen the edge
//! bypass that [`super::middleware::identity`] closes.

use std::sync::Arc;

use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::application::tool_gateway::ToolGatewayRouter;
use crate::domain::identity::{principal_from_forwarded, X_MCP_ROLES, X_MCP_USER_ID};

#[derive(Debug, Deserialize)]
#[serde(tag = "method", content = "params", rename_all = "snake_case")]
enum McpRequest {
    #[serde(rename = "tools/list")]
    ToolsList,
    #[serde(rename = "tools/call")]
    ToolsCall { name: String, #[serde(default)] arguments: Value },
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
enum McpResponse {
    Tools { tools: Vec<crate::domain::record::ToolDescriptor> },
    CallResult { content: String, is_error: bool },
}

pub fn router(tool_gateway: Arc<ToolGatewayRouter>) -> Router {
    Router::new().route("/mcp/rpc", post(handle)).with_state(tool_gateway)
}

async fn handle(
    State(tool_gateway): State<Arc<ToolGatewayRouter>>,
    headers: HeaderMap,
    Json(request): Json<McpRequest>,
) -> Response {
    let principal = principal_from_forwarded(
        headers.get(X_MCP_USER_ID).and_then(|v| v.to_str().ok()),
        headers.get(X_MCP_ROLES).and_then(|v| v.to_str().ok()),
    );
    let Some(principal) = principal else {
        return (StatusCode::UNAUTHORIZED, "missing forwarded identity").into_response();
    };

    match request {
        McpRequest::ToolsList => {
            let tools = tool_gateway.list_tools(&principal).await.unwrap_or_default();
            Json(McpResponse::Tools { tools }).into_response()
        }
        McpRequest::ToolsCall { name, arguments } => {
            let result = tool_gateway.call_tool(&principal, &name, arguments).await;
            Json(McpResponse::CallResult { content: result.content, is_error: result.is_error }).into_response()
        }
    }
}
