// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! Node-Info Provider (C4) — resolves a workload name to its current set of
//! replica endpoints by listing the orchestrator's endpoint objects.
//! Derived, never persisted.

use async_trait::async_trait;

/// `{ workloadName, ordinal, address }`, ordered by ordinal. `address` is
/// scheme-qualified (`http://host:port`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReplicaEndpoint {
    pub workload_name: String,
    pub ordinal: u32,
    pub address: String,
}

#[derive(Debug, thiserror::Error)]
pub enum NodeInfoError {
    #[error("no endpoints for workload '{0}'")]
    NotFound(String),
    #[error("node-info backend unavailable: {0}")]
    Unavailable(String),
}

/// Caching is permitted with a short TTL; a stale hit is acceptable — the
/// backend surfaces a network error and the session is treated as broken.
#[async_trait]
pub trait NodeInfoProvider: Send + Sync {
    async fn resolve_endpoints(&self, workload_name: &str) -> Result<Vec<ReplicaEndpoint>, NodeInfoError>;
}
