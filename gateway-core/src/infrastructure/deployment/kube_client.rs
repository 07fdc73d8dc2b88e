// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! The narrow surface [`KubeDeploymentManager`](super::KubeDeploymentManager)
//! needs from the orchestrator API: apply/delete a stateful workload and its
//! companion service, read status, read logs. [`RealKubeClient`] is the
//! `kube`-crate-backed adapter; [`FakeKubeClient`] is an in-memory double for
//! tests and `development.mode`.

use std::collections::BTreeMap;

use async_trait::async_trait;
use k8s_openapi::api::apps::v1::{StatefulSet, StatefulSetSpec};
use k8s_openapi::api::core::v1::{Container, EnvVar, Pod, PodSpec, PodTemplateSpec, Service, ServicePort, ServiceSpec};
use k8s_openapi::apimachinery::pkg::apis::meta::v1::{LabelSelector, ObjectMeta};
use kube::api::{Api, DeleteParams, LogParams, Patch, PatchParams, PostParams};

use crate::domain::deployment::DeploymentError;
use crate::domain::record::ResourceType;

#[derive(Debug, Clone)]
pub struct PodSpecInput {
    pub name: String,
    pub image: String,
    pub replica_count: u32,
    pub resource_type: ResourceType,
    pub environment_variables: BTreeMap<String, String>,
    pub use_workload_identity: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServiceKind {
    /// `mcp`: no cluster IP, so `<name>-<ordinal>` pod DNS resolves.
    Headless,
    /// `tool`: clustered virtual IP, routing is name-based.
    Clustered,
}

#[derive(Debug, Clone)]
pub struct WorkloadStatus {
    pub ready_replicas: u32,
    pub updated_replicas: u32,
    pub available_replicas: u32,
    pub desired_replicas: u32,
    pub image: String,
}

#[async_trait]
pub trait KubeClient: Send + Sync {
    async fn apply_stateful_workload(&self, spec: &PodSpecInput) -> Result<(), DeploymentError>;
    async fn apply_service(&self, name: &str, kind: ServiceKind) -> Result<(), DeploymentError>;
    async fn delete_stateful_workload(&self, name: &str) -> Result<(), DeploymentError>;
    async fn delete_service(&self, name: &str) -> Result<(), DeploymentError>;
    async fn workload_exists(&self, name: &str) -> bool;
    async fn workload_status(&self, name: &str) -> Result<WorkloadStatus, DeploymentError>;
    async fn pod_logs(&self, pod_name: &str) -> Result<String, DeploymentError>;
}

const LOG_TAIL_LINES: i64 = 1000;

pub struct RealKubeClient {
    client: kube::Client,
    namespace: String,
}

impl RealKubeClient {
    pub fn new(client: kube::Client, namespace: impl Into<String>) -> Self {
        Self { client, namespace: namespace.into() }
    }

    fn statefulsets(&self) -> Api<StatefulSet> {
        Api::namespaced(self.client.clone(), &self.namespace)
    }

    fn services(&self) -> Api<Service> {
        Api::namespaced(self.client.clone(), &self.namespace)
    }

    fn pods(&self) -> Api<Pod> {
        Api::namespaced(self.client.clone(), &self.namespace)
    }

    fn build_statefulset(spec: &PodSpecInput) -> StatefulSet {
        let labels = BTreeMap::from([
            ("app".to_string(), spec.name.clone()),
            ("adapter/type".to_string(), spec.resource_type.label_value().to_string()),
            ("workload-identity/use".to_string(), spec.use_workload_identity.to_string()),
        ]);

        let env: Vec<EnvVar> = spec
            .environment_variables
            .iter()
            .map(|(k, v)| EnvVar { name: k.clone(), value: Some(v.clone()), ..Default::default() })
            .collect();

        StatefulSet {
            metadata: ObjectMeta { name: Some(spec.name.clone()), labels: Some(labels.clone()), ..Default::default() },
            spec: Some(StatefulSetSpec {
                service_name: format!("{}-service", spec.name),
                replicas: Some(spec.replica_count as i32),
                selector: LabelSelector { match_labels: Some(labels.clone()), ..Default::default() },
                template: PodTemplateSpec {
                    metadata: Some(ObjectMeta { labels: Some(labels), ..Default::default() }),
                    spec: Some(PodSpec {
                        containers: vec![Container {
                            name: spec.name.clone(),
                            image: Some(spec.image.clone()),
                            env: Some(env),
                            ..Default::default()
                        }],
                        ..Default::default()
                    }),
                },
                ..Default::default()
            }),
            status: None,
        }
    }

    fn build_service(name: &str, kind: ServiceKind) -> Service {
        let labels = BTreeMap::from([("app".to_string(), name.to_string())]);
        Service {
            metadata: ObjectMeta { name: Some(format!("{name}-service")), ..Default::default() },
            spec: Some(ServiceSpec {
                selector: Some(labels),
                cluster_ip: matches!(kind, ServiceKind::Headless).then(|| "None".to_string()),
                ports: Some(vec![ServicePort { port: 443, ..Default::default() }]),
                ..Default::default()
            }),
            status: None,
        }
    }
}

#[async_trait]
impl KubeClient for RealKubeClient {
    async fn apply_stateful_workload(&self, spec: &PodSpecInput) -> Result<(), DeploymentError> {
        let resource = Self::build_statefulset(spec);
        self.statefulsets()
            .patch(&spec.name, &PatchParams::apply("gateway"), &Patch::Apply(&resource))
            .await
            .map_err(|e| DeploymentError::UpstreamFailed(format!(
                "failed to apply StatefulSet '{}': {e} (check image pull access and namespace quota)",
                spec.name
            )))?;
        Ok(())
    }

    async fn apply_service(&self, name: &str, kind: ServiceKind) -> Result<(), DeploymentError> {
        let resource = Self::build_service(name, kind);
        self.services()
            .patch(&format!("{name}-service"), &PatchParams::apply("gateway"), &Patch::Apply(&resource))
            .await
            .map_err(|e| {
                DeploymentError::UpstreamFailed(format!("failed to apply Service for '{name}': {e}"))
            })?;
        Ok(())
    }

    async fn delete_stateful_workload(&self, name: &str) -> Result<(), DeploymentError> {
        match self.statefulsets().delete(name, &DeleteParams::default()).await {
            Ok(_) => Ok(()),
            Err(kube::Error::Api(e)) if e.code == 404 => Ok(()),
            Err(e) => Err(DeploymentError::UpstreamFailed(format!(
                "failed to delete StatefulSet '{name}': {e}"
            ))),
        }
    }

    async fn delete_service(&self, name: &str) -> Result<(), DeploymentError> {
        match self.services().delete(&format!("{name}-service"), &DeleteParams::default()).await {
            Ok(_) => Ok(()),
            Err(kube::Error::Api(e)) if e.code == 404 => Ok(()),
            Err(e) => Err(DeploymentError::UpstreamFailed(format!(
                "failed to delete Service for '{name}': {e}"
            ))),
        }
    }

    async fn workload_exists(&self, name: &str) -> bool {
        self.statefulsets().get(name).await.is_ok()
    }

    async fn workload_status(&self, name: &str) -> Result<WorkloadStatus, DeploymentError> {
        let resource = self
            .statefulsets()
            .get(name)
            .await
            .map_err(|e| DeploymentError::UpstreamFailed(format!("failed to read StatefulSet '{name}': {e}")))?;

        let status = resource.status.unwrap_or_default();
        let image = resource
            .spec
            .as_ref()
            .and_then(|s| s.template.spec.as_ref())
            .and_then(|p| p.containers.first())
            .and_then(|c| c.image.clone())
            .unwrap_or_else(|| "Unknown".to_string());

        Ok(WorkloadStatus {
            ready_replicas: status.ready_replicas.unwrap_or(0) as u32,
            updated_replicas: status.updated_replicas.unwrap_or(0) as u32,
            available_replicas: status.available_replicas.unwrap_or(0) as u32,
            desired_replicas: status.replicas as u32,
            image,
        })
    }

    async fn pod_logs(&self, pod_name: &str) -> Result<String, DeploymentError> {
        self.pods()
            .logs(pod_name, &LogParams { tail_lines: Some(LOG_TAIL_LINES), ..Default::default() })
            .await
            .map_err(|e| DeploymentError::UpstreamFailed(format!("failed to read logs for pod '{pod_name}': {e}")))
    }
}

/// In-memory double for tests and `development.mode` (§9): never touches a
/// real cluster, models just enough state to make create/update/delete/status
/// observable.
#[derive(Default)]
pub struct FakeKubeClient {
    workloads: parking_lot::Mutex<BTreeMap<String, PodSpecInput>>,
}

#[async_trait]
impl KubeClient for FakeKubeClient {
    async fn apply_stateful_workload(&self, spec: &PodSpecInput) -> Result<(), DeploymentError> {
        self.workloads.lock().insert(spec.name.clone(), spec.clone());
        Ok(())
    }

    async fn apply_service(&self, _name: &str, _kind: ServiceKind) -> Result<(), DeploymentError> {
        Ok(())
    }

    async fn delete_stateful_workload(&self, name: &str) -> Result<(), DeploymentError> {
        self.workloads.lock().remove(name);
        Ok(())
    }

    async fn delete_service(&self, _name: &str) -> Result<(), DeploymentError> {
        Ok(())
    }

    async fn workload_exists(&self, name: &str) -> bool {
        self.workloads.lock().contains_key(name)
    }

    async fn workload_status(&self, name: &str) -> Result<WorkloadStatus, DeploymentError> {
        let workloads = self.workloads.lock();
        let spec = workloads
            .get(name)
            .ok_or_else(|| DeploymentError::UpstreamFailed(format!("no such workload '{name}'")))?;
        Ok(WorkloadStatus {
            ready_replicas: spec.replica_count,
            updated_replicas: spec.replica_count,
            available_replicas: spec.replica_count,
            desired_replicas: spec.replica_count,
            image: spec.image.clone(),
        })
    }

    async fn pod_logs(&self, _pod_name: &str) -> Result<String, DeploymentError> {
        Ok(String::new())
    }
}
