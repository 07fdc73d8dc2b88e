// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! Resource Store (C1) — durable `name -> AdapterRecord` / `name -> ToolRecord`
//! mapping. One repository trait per aggregate, following the project's
//! usual repository-per-aggregate convention; both are generic-trait aliases
//! over the shared [`RecordRepository`] shape so [`crate::application::resource_service::ResourceService`]
//! can be instantiated once per record kind instead of duplicated.

use async_trait::async_trait;

use crate::domain::record::{AdapterRecord, ToolRecord};

/// Pluggable storage backend, selected at startup from `resourceStore.kind`.
#[derive(Debug, Clone)]
pub enum StorageBackend {
    InMemory,
    /// `resourceStore.kind = document-db`: realized against the one concrete
    /// client already in the dependency graph, Postgres, with records stored
    /// as JSONB documents.
    Postgres(PostgresConfig),
    /// `resourceStore.kind = distributed-cache`.
    Redis(RedisConfig),
}

#[derive(Debug, Clone)]
pub struct PostgresConfig {
    pub connection_string: String,
}

#[derive(Debug, Clone)]
pub struct RedisConfig {
    pub connection_string: String,
}

#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("not found: {0}")]
    NotFound(String),
    #[error("backend unavailable: {0}")]
    BackendUnavailable(String),
    #[error("serialization error: {0}")]
    Serialization(String),
}

impl From<sqlx::Error> for RepositoryError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => RepositoryError::NotFound("row not found".to_string()),
            other => RepositoryError::BackendUnavailable(other.to_string()),
        }
    }
}

impl From<serde_json::Error> for RepositoryError {
    fn from(err: serde_json::Error) -> Self {
        RepositoryError::Serialization(err.to_string())
    }
}

impl From<redis::RedisError> for RepositoryError {
    fn from(err: redis::RedisError) -> Self {
        RepositoryError::BackendUnavailable(err.to_string())
    }
}

/// Contract shared by both record kinds (§4.1): `tryGet`/`upsert` (idempotent)
/// /`delete` (absent is success)/`list` (must tolerate a name-index entry
/// whose record disappeared out from under it).
#[async_trait]
pub trait RecordRepository<R>: Send + Sync {
    async fn try_get(&self, name: &str) -> Result<Option<R>, RepositoryError>;
    async fn upsert(&self, record: &R) -> Result<(), RepositoryError>;
    async fn delete(&self, name: &str) -> Result<(), RepositoryError>;
    async fn list(&self) -> Result<Vec<R>, RepositoryError>;
}

pub trait AdapterRepository: RecordRepository<AdapterRecord> {}
impl<T: RecordRepository<AdapterRecord> + ?Sized> AdapterRepository for T {}

pub trait ToolRepository: RecordRepository<ToolRecord> {}
impl<T: RecordRepository<ToolRecord> + ?Sized> ToolRepository for T {}
