// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! `/tools` handlers — mirrors `/adapters` for `ToolData`/`ToolRecord` (§6.1).

use std::sync::Arc;

use axum::extract::{Extension, Path, Query, State};
use axum::response::Response;
use axum::Json;

use crate::domain::error::GatewayError;
use crate::domain::permission::Principal;
use crate::domain::record::{ToolData, ToolRecord};
use crate::presentation::api::AppState;
use crate::presentation::resource_handlers::{self, LogsQuery};

const LOCATION_PREFIX: &str = "/tools";

pub async fn create(
    State(state): State<Arc<AppState>>,
    Extension(principal): Extension<Principal>,
    Json(draft): Json<ToolData>,
) -> Result<Response, GatewayError> {
    resource_handlers::create(&state.tool_service, &principal, LOCATION_PREFIX, draft).await
}

pub async fn list(
    State(state): State<Arc<AppState>>,
    Extension(principal): Extension<Principal>,
) -> Result<Json<Vec<ToolRecord>>, GatewayError> {
    resource_handlers::list(&state.tool_service, &principal).await
}

pub async fn get(
    State(state): State<Arc<AppState>>,
    Extension(principal): Extension<Principal>,
    Path(name): Path<String>,
) -> Result<Response, GatewayError> {
    resource_handlers::get(&state.tool_service, &principal, &name).await
}

pub async fn update(
    State(state): State<Arc<AppState>>,
    Extension(principal): Extension<Principal>,
    Path(name): Path<String>,
    Json(draft): Json<ToolData>,
) -> Result<Json<ToolRecord>, GatewayError> {
    resource_handlers::update(&state.tool_service, &principal, &name, draft).await
}

pub async fn delete(
    State(state): State<Arc<AppState>>,
    Extension(principal): Extension<Principal>,
    Path(name): Path<String>,
) -> Result<axum::http::StatusCode, GatewayError> {
    resource_handlers::delete(&state.tool_service, &principal, &name).await
}

pub async fn status(
    State(state): State<Arc<AppState>>,
    Extension(principal): Extension<Principal>,
    Path(name): Path<String>,
) -> Result<Json<crate::domain::deployment::DeploymentStatus>, GatewayError> {
    resource_handlers::get(&state.tool_service, &principal, &name).await.map(|_| ())?;
    let status = state.deployment.status(&name).await?;
    Ok(Json(status))
}

pub async fn logs(
    State(state): State<Arc<AppState>>,
    Extension(principal): Extension<Principal>,
    Path(name): Path<String>,
    Query(query): Query<LogsQuery>,
) -> Result<String, GatewayError> {
    resource_handlers::get(&state.tool_service, &principal, &name).await.map(|_| ())?;
    state.deployment.logs(&name, resource_handlers::ordinal_from_query(&query)).await.map_err(GatewayError::from)
}
