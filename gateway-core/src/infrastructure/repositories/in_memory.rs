// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! In-memory `RecordRepository` (§6.2: `resourceStore.kind = in-memory`).
//! Local development and tests only — no cross-replica visibility.

use std::collections::BTreeMap;
use std::sync::RwLock;

use async_trait::async_trait;

use crate::domain::record::ResourceRecord;
use crate::domain::repository::{RecordRepository, RepositoryError};

pub struct InMemoryRecordRepository<R: ResourceRecord> {
    records: RwLock<BTreeMap<String, R>>,
}

impl<R: ResourceRecord> InMemoryRecordRepository<R> {
    pub fn new() -> Self {
        Self { records: RwLock::new(BTreeMap::new()) }
    }
}

impl<R: ResourceRecord> Default for InMemoryRecordRepository<R> {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl<R: ResourceRecord> RecordRepository<R> for InMemoryRecordRepository<R> {
    async fn try_get(&self, name: &str) -> Result<Option<R>, RepositoryError> {
        Ok(self.records.read().unwrap().get(name).cloned())
    }

    async fn upsert(&self, record: &R) -> Result<(), RepositoryError> {
        self.records.write().unwrap().insert(record.name().to_string(), record.clone());
        Ok(())
    }

    async fn delete(&self, name: &str) -> Result<(), RepositoryError> {
        self.records.write().unwrap().remove(name);
        Ok(())
    }

    async fn list(&self) -> Result<Vec<R>, RepositoryError> {
        Ok(self.records.read().unwrap().values().cloned().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use std::collections::BTreeMap as Map;

    use crate::domain::record::{AdapterData, AdapterRecord};

    fn record(name: &str) -> AdapterRecord {
        AdapterRecord::from_data(
            AdapterData {
                name: name.to_string(),
                image_name: "img".to_string(),
                image_version: "v1".to_string(),
                environment_variables: Map::new(),
                replica_count: 1,
                description: String::new(),
                use_workload_identity: false,
                required_roles: vec![],
            },
            "u1".to_string(),
            Utc::now(),
        )
    }

    #[tokio::test]
    async fn upsert_then_get_round_trips() {
        let repo = InMemoryRecordRepository::<AdapterRecord>::new();
        repo.upsert(&record("a1")).await.unwrap();
        let found = repo.try_get("a1").await.unwrap();
        assert_eq!(found.unwrap().name, "a1");
    }

    #[tokio::test]
    async fn delete_of_absent_name_is_not_an_error() {
        let repo = InMemoryRecordRepository::<AdapterRecord>::new();
        repo.delete("missing").await.unwrap();
    }

    #[tokio::test]
    async fn upsert_is_keyed_by_name_not_id() {
        let repo = InMemoryRecordRepository::<AdapterRecord>::new();
        let first = record("a1");
        repo.upsert(&first).await.unwrap();
        let mut second = record("a1");
        second.description = "updated".to_string();
        repo.upsert(&second).await.unwrap();

        let all = repo.list().await.unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].description, "updated");
    }
}
