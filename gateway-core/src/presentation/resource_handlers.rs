// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! Generic CRUD handler bodies shared by the `/adapters` and `/tools`
//! surfaces (§6.1) — one implementation per HTTP verb, instantiated once per
//! record kind, mirroring [`crate::application::resource_service::ResourceService`]'s
//! own genericity rather than duplicating five handlers twice.

use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::application::resource_service::ResourceService;
use crate::domain::error::GatewayError;
use crate::domain::permission::Principal;
use crate::domain::record::ResourceRecord;

pub async fn create<R>(
    service: &ResourceService<R>,
    principal: &Principal,
    location_prefix: &str,
    draft: R::Draft,
) -> Result<Response, GatewayError>
where
    R: ResourceRecord + Serialize,
{
    let record = service.create(principal, draft).await?;
    let location = format!("{location_prefix}/{}", record.name());
    Ok((
        StatusCode::CREATED,
        [(header::LOCATION, location)],
        Json(record),
    )
        .into_response())
}

pub async fn list<R>(service: &ResourceService<R>, principal: &Principal) -> Result<Json<Vec<R>>, GatewayError>
where
    R: ResourceRecord + Serialize,
{
    Ok(Json(service.list(principal).await?))
}

pub async fn get<R>(service: &ResourceService<R>, principal: &Principal, name: &str) -> Result<Response, GatewayError>
where
    R: ResourceRecord + Serialize,
{
    match service.get(principal, name).await? {
        Some(record) => Ok(Json(record).into_response()),
        None => Err(GatewayError::NotFound(name.to_string())),
    }
}

pub async fn update<R>(
    service: &ResourceService<R>,
    principal: &Principal,
    name: &str,
    draft: R::Draft,
) -> Result<Json<R>, GatewayError>
where
    R: ResourceRecord + Serialize,
{
    Ok(Json(service.update(principal, name, draft).await?))
}

pub async fn delete<R>(service: &ResourceService<R>, principal: &Principal, name: &str) -> Result<StatusCode, GatewayError>
where
    R: ResourceRecord,
{
    service.delete(principal, name).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[derive(Debug, Deserialize)]
pub struct LogsQuery {
    #[serde(default)]
    pub instance: Option<u32>,
}

pub fn ordinal_from_query(query: &LogsQuery) -> u32 {
    query.instance.unwrap_or(0)
}
