// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! Deployment Manager (C5) — reconciles a resource record onto orchestrator
//! state. Stateless: the orchestrator itself is the source of runtime
//! status, never this trait's implementor.

use async_trait::async_trait;
use serde::{Serialize, Serializer};

use crate::domain::record::DeploymentSpec;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReplicaStatus {
    Healthy,
    Degraded { ready: u32, desired: u32 },
}

/// §6.2: `replicaStatus` is a plain string field (`"Healthy"` or
/// `"Degraded: <ready>/<desired> ready"`), not a tagged object.
impl Serialize for ReplicaStatus {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl ReplicaStatus {
    /// §4.5: `"Healthy"` iff `readyReplicas == desiredReplicas && desiredReplicas > 0`.
    pub fn derive(ready: u32, desired: u32) -> Self {
        if ready == desired && desired > 0 {
            ReplicaStatus::Healthy
        } else {
            ReplicaStatus::Degraded { ready, desired }
        }
    }
}

impl std::fmt::Display for ReplicaStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ReplicaStatus::Healthy => write!(f, "Healthy"),
            ReplicaStatus::Degraded { ready, desired } => {
                write!(f, "Degraded: {ready}/{desired} ready")
            }
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeploymentStatus {
    pub ready_replicas: u32,
    pub updated_replicas: u32,
    pub available_replicas: u32,
    /// `"Unknown"` when the workload's container info is missing.
    pub image: String,
    pub replica_status: ReplicaStatus,
}

#[derive(Debug, thiserror::Error)]
pub enum DeploymentError {
    #[error("upstream failed: {0}")]
    UpstreamFailed(String),
}

/// create/update/delete/status/logs over the orchestrator-side replica-set +
/// service pair. `Conflict` on create and `NotFound` on delete are
/// non-fatal — callers treat create-on-conflict as an upsert and delete as
/// already-satisfied.
#[async_trait]
pub trait DeploymentManager: Send + Sync {
    async fn create(&self, spec: &DeploymentSpec) -> Result<(), DeploymentError>;

    /// Patches only the differing fields; never recreates; never touches
    /// identity labels.
    async fn update(&self, spec: &DeploymentSpec) -> Result<(), DeploymentError>;

    /// `NotFound` is success, so this never returns that as an error.
    async fn delete(&self, name: &str) -> Result<(), DeploymentError>;

    async fn status(&self, name: &str) -> Result<DeploymentStatus, DeploymentError>;

    /// Pod name is `<name>-<ordinal>`; capped at a bounded tail.
    async fn logs(&self, name: &str, ordinal: u32) -> Result<String, DeploymentError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_derivation_matches_invariant_10() {
        assert_eq!(ReplicaStatus::derive(3, 3), ReplicaStatus::Healthy);
        assert_eq!(ReplicaStatus::derive(0, 0), ReplicaStatus::Degraded { ready: 0, desired: 0 });
        assert_eq!(ReplicaStatus::derive(1, 3), ReplicaStatus::Degraded { ready: 1, desired: 3 });
        assert_eq!(ReplicaStatus::derive(1, 3).to_string(), "Degraded: 1/3 ready");
    }
}
