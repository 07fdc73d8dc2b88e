// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! Resource Services (C6) — CRUD over adapter/tool records with validation,
//! authorization, and deployment orchestration. One generic service,
//! instantiated once per record kind (§9: "interface-based polymorphism ...
//! variant-typed strategy objects selected at startup").

use std::sync::Arc;

use chrono::Utc;

use crate::domain::deployment::DeploymentManager;
use crate::domain::error::GatewayError;
use crate::domain::permission::{evaluate, Operation, Principal};
use crate::domain::record::{validate_name, ResourceRecord};
use crate::domain::repository::RecordRepository;

pub struct ResourceService<R: ResourceRecord> {
    repo: Arc<dyn RecordRepository<R>>,
    deployment: Arc<dyn DeploymentManager>,
}

impl<R: ResourceRecord> ResourceService<R> {
    pub fn new(repo: Arc<dyn RecordRepository<R>>, deployment: Arc<dyn DeploymentManager>) -> Self {
        Self { repo, deployment }
    }

    /// §4.6 create: validate name, reject on name collision, invoke the
    /// deployment manager **before** persisting (§5/§7 create-before-persist
    /// ordering — a persisted record always corresponds to an attempted
    /// deployment), then persist.
    pub async fn create(&self, principal: &Principal, draft: R::Draft) -> Result<R, GatewayError> {
        let name = R::draft_name(&draft).to_string();
        validate_name(&name)?;

        if self.repo.try_get(&name).await?.is_some() {
            return Err(GatewayError::Conflict(format!("'{name}' already exists")));
        }

        let record = R::from_draft(draft, principal.user_id.clone(), Utc::now());
        self.deployment.create(&record.deployment_spec()).await?;
        self.repo.upsert(&record).await?;

        tracing::info!(name = %record.name(), resource_type = ?R::resource_type(), "created resource");
        Ok(record)
    }

    /// §4.6 get: absent stays absent to the caller; only a found-but-denied
    /// record becomes `Forbidden`.
    pub async fn get(&self, principal: &Principal, name: &str) -> Result<Option<R>, GatewayError> {
        let Some(record) = self.repo.try_get(name).await? else {
            return Ok(None);
        };
        if !evaluate(principal, &record, Operation::Read) {
            return Err(GatewayError::Forbidden);
        }
        Ok(Some(record))
    }

    /// §4.6 update: name immutability (§8.3) is enforced by the caller
    /// comparing URL name to `draft_name` before invoking this — both must
    /// already agree with `name`. Recomputes the deployment-dirty predicate
    /// (§8.4) and only calls the deployment manager when it's true.
    pub async fn update(&self, principal: &Principal, name: &str, draft: R::Draft) -> Result<R, GatewayError> {
        if R::draft_name(&draft) != name {
            return Err(GatewayError::ValidationFailure(
                "name is immutable and must match the URL".to_string(),
            ));
        }

        let mut record = self
            .repo
            .try_get(name)
            .await?
            .ok_or_else(|| GatewayError::NotFound(name.to_string()))?;

        if !evaluate(principal, &record, Operation::Write) {
            return Err(GatewayError::Forbidden);
        }

        let before = record.clone();
        record.apply_draft(draft, Utc::now());

        if before.deployment_dirty(&record) {
            self.deployment.update(&record.deployment_spec()).await?;
        }
        self.repo.upsert(&record).await?;

        Ok(record)
    }

    /// §4.6 delete / §5 delete-before-undeploy ordering: store-delete
    /// precedes deployment-delete, so a partially deleted state presents to
    /// users as "already gone".
    pub async fn delete(&self, principal: &Principal, name: &str) -> Result<(), GatewayError> {
        let record = self
            .repo
            .try_get(name)
            .await?
            .ok_or_else(|| GatewayError::NotFound(name.to_string()))?;

        if !evaluate(principal, &record, Operation::Write) {
            return Err(GatewayError::Forbidden);
        }

        self.repo.delete(name).await?;
        self.deployment.delete(name).await?;
        Ok(())
    }

    /// §4.6 list: the number filtered out is logged but never surfaced to
    /// the caller.
    pub async fn list(&self, principal: &Principal) -> Result<Vec<R>, GatewayError> {
        let all = self.repo.list().await?;
        let total = all.len();
        let visible = crate::domain::permission::filter(all, principal, Operation::Read);
        tracing::debug!(total, visible = visible.len(), "listed resources");
        Ok(visible)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::collections::BTreeMap;
    use std::sync::Mutex;

    use crate::domain::deployment::{DeploymentError, DeploymentStatus, ReplicaStatus};
    use crate::domain::record::{AdapterData, AdapterRecord};
    use crate::domain::repository::RepositoryError;

    #[derive(Default)]
    struct InMemoryRepo {
        records: Mutex<BTreeMap<String, AdapterRecord>>,
    }

    #[async_trait]
    impl RecordRepository<AdapterRecord> for InMemoryRepo {
        async fn try_get(&self, name: &str) -> Result<Option<AdapterRecord>, RepositoryError> {
            Ok(self.records.lock().unwrap().get(name).cloned())
        }
        async fn upsert(&self, record: &AdapterRecord) -> Result<(), RepositoryError> {
            self.records.lock().unwrap().insert(record.name.clone(), record.clone());
            Ok(())
        }
        async fn delete(&self, name: &str) -> Result<(), RepositoryError> {
            self.records.lock().unwrap().remove(name);
            Ok(())
        }
        async fn list(&self) -> Result<Vec<AdapterRecord>, RepositoryError> {
            Ok(self.records.lock().unwrap().values().cloned().collect())
        }
    }

    #[derive(Default)]
    struct CountingDeployment {
        create_calls: Mutex<u32>,
        update_calls: Mutex<u32>,
        fail_create: bool,
    }

    #[async_trait]
    impl DeploymentManager for CountingDeployment {
        async fn create(&self, _spec: &crate::domain::record::DeploymentSpec) -> Result<(), DeploymentError> {
            *self.create_calls.lock().unwrap() += 1;
            if self.fail_create {
                return Err(DeploymentError::UpstreamFailed("boom".into()));
            }
            Ok(())
        }
        async fn update(&self, _spec: &crate::domain::record::DeploymentSpec) -> Result<(), DeploymentError> {
            *self.update_calls.lock().unwrap() += 1;
            Ok(())
        }
        async fn delete(&self, _name: &str) -> Result<(), DeploymentError> {
            Ok(())
        }
        async fn status(&self, _name: &str) -> Result<DeploymentStatus, DeploymentError> {
            Ok(DeploymentStatus {
                ready_replicas: 1,
                updated_replicas: 1,
                available_replicas: 1,
                image: "img:v1".to_string(),
                replica_status: ReplicaStatus::Healthy,
            })
        }
        async fn logs(&self, _name: &str, _ordinal: u32) -> Result<String, DeploymentError> {
            Ok(String::new())
        }
    }

    fn draft(name: &str) -> AdapterData {
        AdapterData {
            name: name.to_string(),
            image_name: "img".to_string(),
            image_version: "v1".to_string(),
            environment_variables: BTreeMap::new(),
            replica_count: 1,
            description: String::new(),
            use_workload_identity: false,
            required_roles: vec![],
        }
    }

    fn service(deployment: Arc<CountingDeployment>) -> ResourceService<AdapterRecord> {
        ResourceService::new(Arc::new(InMemoryRepo::default()), deployment)
    }

    #[tokio::test]
    async fn s1_create_adapter_records_owner_and_triggers_deploy() {
        let deployment = Arc::new(CountingDeployment::default());
        let svc = service(deployment.clone());
        let principal = Principal::new("u1", []);

        let record = svc.create(&principal, draft("a1")).await.unwrap();
        assert_eq!(record.created_by, "u1");
        assert_eq!(record.created_at, record.last_updated_at);
        assert_eq!(*deployment.create_calls.lock().unwrap(), 1);
    }

    #[tokio::test]
    async fn s2_duplicate_create_is_rejected_without_a_second_deploy_call() {
        let deployment = Arc::new(CountingDeployment::default());
        let svc = service(deployment.clone());
        let principal = Principal::new("u1", []);

        svc.create(&principal, draft("a1")).await.unwrap();
        let err = svc.create(&principal, draft("a1")).await.unwrap_err();
        assert!(matches!(err, GatewayError::Conflict(_)));
        assert_eq!(*deployment.create_calls.lock().unwrap(), 1);
    }

    #[tokio::test]
    async fn invariant_1_bad_name_never_reaches_the_store_or_deployer() {
        let deployment = Arc::new(CountingDeployment::default());
        let svc = service(deployment.clone());
        let principal = Principal::new("u1", []);

        let err = svc.create(&principal, draft("Not Valid!")).await.unwrap_err();
        assert!(matches!(err, GatewayError::ValidationFailure(_)));
        assert_eq!(*deployment.create_calls.lock().unwrap(), 0);
    }

    #[tokio::test]
    async fn invariant_2_failed_deployment_leaves_no_record() {
        let deployment = Arc::new(CountingDeployment { fail_create: true, ..Default::default() });
        let svc = service(deployment);
        let principal = Principal::new("u1", []);

        assert!(svc.create(&principal, draft("a1")).await.is_err());
        assert!(svc.get(&principal, "a1").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn s3_s4_read_gated_by_required_roles() {
        let deployment = Arc::new(CountingDeployment::default());
        let svc = service(deployment);
        let owner = Principal::new("u1", []);
        let mut gated = draft("a1");
        gated.required_roles = vec!["reader".to_string()];
        svc.create(&owner, gated).await.unwrap();

        let guest = Principal::new("u2", ["guest".to_string()]);
        assert!(matches!(svc.get(&guest, "a1").await, Err(GatewayError::Forbidden)));

        let reader = Principal::new("u2", ["reader".to_string()]);
        assert!(svc.get(&reader, "a1").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn s5_s6_deployment_dirty_predicate_gates_the_deploy_call() {
        let deployment = Arc::new(CountingDeployment::default());
        let svc = service(deployment.clone());
        let owner = Principal::new("u1", []);

        let mut env_change = draft("a1");
        env_change.environment_variables.insert("K".to_string(), "old".to_string());
        svc.create(&owner, env_change.clone()).await.unwrap();
        assert_eq!(*deployment.create_calls.lock().unwrap(), 1);

        let mut new_env = env_change.clone();
        new_env.environment_variables.insert("K".to_string(), "new".to_string());
        svc.update(&owner, "a1", new_env).await.unwrap();
        assert_eq!(*deployment.update_calls.lock().unwrap(), 1);

        let mut description_only = env_change;
        description_only.environment_variables.insert("K".to_string(), "new".to_string());
        description_only.description = "updated description".to_string();
        svc.update(&owner, "a1", description_only).await.unwrap();
        assert_eq!(*deployment.update_calls.lock().unwrap(), 1);
    }

    #[tokio::test]
    async fn invariant_3_update_cannot_rename() {
        let deployment = Arc::new(CountingDeployment::default());
        let svc = service(deployment);
        let owner = Principal::new("u1", []);
        svc.create(&owner, draft("a1")).await.unwrap();

        let err = svc.update(&owner, "a1", draft("a2")).await.unwrap_err();
        assert!(matches!(err, GatewayError::ValidationFailure(_)));
    }

    #[tokio::test]
    async fn invariant_6_list_never_returns_forbidden_resources() {
        let deployment = Arc::new(CountingDeployment::default());
        let svc = service(deployment);
        let owner = Principal::new("u1", []);
        svc.create(&owner, draft("public")).await.unwrap();

        let mut gated = draft("private");
        gated.required_roles = vec!["admin-only".to_string()];
        svc.create(&owner, gated).await.unwrap();

        let guest = Principal::new("u2", ["guest".to_string()]);
        let visible = svc.list(&guest).await.unwrap();
        assert_eq!(visible.len(), 1);
        assert_eq!(visible[0].name, "public");
    }
}
