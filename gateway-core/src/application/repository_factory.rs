// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! Creates concrete repository implementations from `resourceStore.kind`.
//! Keeps the domain layer free of infrastructure dependencies: domain
//! defines the trait, infrastructure provides the implementation, this
//! factory picks between them at startup.

use std::sync::Arc;

use crate::domain::record::{AdapterRecord, ToolRecord};
use crate::domain::repository::{RecordRepository, StorageBackend};
use crate::infrastructure::repositories::in_memory::InMemoryRecordRepository;
use crate::infrastructure::repositories::postgres::PostgresRecordRepository;
use crate::infrastructure::repositories::redis_cache::RedisRecordRepository;

pub async fn create_adapter_repository(
    backend: &StorageBackend,
) -> anyhow::Result<Arc<dyn RecordRepository<AdapterRecord>>> {
    Ok(match backend {
        StorageBackend::InMemory => Arc::new(InMemoryRecordRepository::<AdapterRecord>::new()),
        StorageBackend::Postgres(cfg) => {
            Arc::new(PostgresRecordRepository::<AdapterRecord>::connect(&cfg.connection_string, "adapters").await?)
        }
        StorageBackend::Redis(cfg) => {
            Arc::new(RedisRecordRepository::<AdapterRecord>::connect(&cfg.connection_string, "adapter").await?)
        }
    })
}

pub async fn create_tool_repository(
    backend: &StorageBackend,
) -> anyhow::Result<Arc<dyn RecordRepository<ToolRecord>>> {
    Ok(match backend {
        StorageBackend::InMemory => Arc::new(InMemoryRecordRepository::<ToolRecord>::new()),
        StorageBackend::Postgres(cfg) => {
            Arc::new(PostgresRecordRepository::<ToolRecord>::connect(&cfg.connection_string, "tools").await?)
        }
        StorageBackend::Redis(cfg) => {
            Arc::new(RedisRecordRepository::<ToolRecord>::connect(&cfg.connection_string, "tool").await?)
        }
    })
}
