// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! Deployment Manager (C5) implementations. [`KubeDeploymentManager`] talks
//! to the orchestrator only through the narrow [`kube_client::KubeClient`]
//! trait — the same posture the teacher takes with `bollard` behind
//! `AgentRuntime`: a thin trait hides the concrete client so the use-case
//! layer never names it.

pub mod kube_client;

use async_trait::async_trait;

use crate::domain::deployment::{DeploymentError, DeploymentManager, DeploymentStatus, ReplicaStatus};
use crate::domain::record::{DeploymentSpec, ResourceType};
use kube_client::{KubeClient, PodSpecInput, ServiceKind};

pub struct KubeDeploymentManager<C: KubeClient> {
    client: C,
    registry: String,
}

impl<C: KubeClient> KubeDeploymentManager<C> {
    pub fn new(client: C, registry: impl Into<String>) -> Self {
        Self { client, registry: registry.into() }
    }

    fn service_kind(resource_type: ResourceType) -> ServiceKind {
        match resource_type {
            ResourceType::Mcp => ServiceKind::Headless,
            ResourceType::Tool => ServiceKind::Clustered,
        }
    }
}

#[async_trait]
impl<C: KubeClient + Send + Sync> DeploymentManager for KubeDeploymentManager<C> {
    async fn create(&self, spec: &DeploymentSpec) -> Result<(), DeploymentError> {
        let pod = PodSpecInput {
            name: spec.name.clone(),
            image: format!("{}/{}:{}", self.registry, spec.image_name, spec.image_version),
            replica_count: spec.replica_count,
            resource_type: spec.resource_type,
            environment_variables: spec.environment_variables.clone(),
            use_workload_identity: spec.use_workload_identity,
        };

        // Orchestrator `Conflict` on an already-existing workload is treated
        // as an upsert, not a failure (§4.5).
        if let Err(e) = self.client.apply_stateful_workload(&pod).await {
            if !self.client.workload_exists(&spec.name).await {
                return Err(e);
            }
        }
        self.client.apply_service(&spec.name, Self::service_kind(spec.resource_type)).await
    }

    async fn update(&self, spec: &DeploymentSpec) -> Result<(), DeploymentError> {
        let pod = PodSpecInput {
            name: spec.name.clone(),
            image: format!("{}/{}:{}", self.registry, spec.image_name, spec.image_version),
            replica_count: spec.replica_count,
            resource_type: spec.resource_type,
            environment_variables: spec.environment_variables.clone(),
            use_workload_identity: spec.use_workload_identity,
        };
        self.client.apply_stateful_workload(&pod).await
    }

    async fn delete(&self, name: &str) -> Result<(), DeploymentError> {
        self.client.delete_stateful_workload(name).await?;
        self.client.delete_service(name).await
    }

    async fn status(&self, name: &str) -> Result<DeploymentStatus, DeploymentError> {
        let raw = self.client.workload_status(name).await?;
        let replica_status = ReplicaStatus::derive(raw.ready_replicas, raw.desired_replicas);
        Ok(DeploymentStatus {
            ready_replicas: raw.ready_replicas,
            updated_replicas: raw.updated_replicas,
            available_replicas: raw.available_replicas,
            image: raw.image,
            replica_status,
        })
    }

    async fn logs(&self, name: &str, ordinal: u32) -> Result<String, DeploymentError> {
        self.client.pod_logs(&format!("{name}-{ordinal}")).await
    }
}
