// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! Redis-backed `RecordRepository` (§6.2: `resourceStore.kind =
//! distributed-cache`). Records serialize to JSON under `{prefix}:{name}`;
//! membership is tracked in a companion set so `list` doesn't need `KEYS`.

use std::marker::PhantomData;

use async_trait::async_trait;
use redis::aio::ConnectionManager;
use redis::AsyncCommands;
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::domain::record::ResourceRecord;
use crate::domain::repository::{RecordRepository, RepositoryError};

pub struct RedisRecordRepository<R> {
    conn: ConnectionManager,
    prefix: String,
    _marker: PhantomData<R>,
}

impl<R: ResourceRecord + Serialize + DeserializeOwned> RedisRecordRepository<R> {
    pub async fn connect(connection_string: &str, prefix: &str) -> anyhow::Result<Self> {
        let client = redis::Client::open(connection_string)?;
        let conn = client.get_connection_manager().await?;
        Ok(Self { conn, prefix: prefix.to_string(), _marker: PhantomData })
    }

    fn key(&self, name: &str) -> String {
        format!("{}:{}", self.prefix, name)
    }

    fn index_key(&self) -> String {
        format!("{}:__index__", self.prefix)
    }
}

#[async_trait]
impl<R: ResourceRecord + Serialize + DeserializeOwned> RecordRepository<R> for RedisRecordRepository<R> {
    async fn try_get(&self, name: &str) -> Result<Option<R>, RepositoryError> {
        let mut conn = self.conn.clone();
        let raw: Option<String> = conn.get(self.key(name)).await?;
        raw.map(|raw| serde_json::from_str(&raw).map_err(RepositoryError::from)).transpose()
    }

    async fn upsert(&self, record: &R) -> Result<(), RepositoryError> {
        let mut conn = self.conn.clone();
        let payload = serde_json::to_string(record)?;
        let name = record.name();
        conn.set::<_, _, ()>(self.key(name), payload).await?;
        conn.sadd::<_, _, ()>(self.index_key(), name).await?;
        Ok(())
    }

    async fn delete(&self, name: &str) -> Result<(), RepositoryError> {
        let mut conn = self.conn.clone();
        conn.del::<_, ()>(self.key(name)).await?;
        conn.srem::<_, _, ()>(self.index_key(), name).await?;
        Ok(())
    }

    async fn list(&self) -> Result<Vec<R>, RepositoryError> {
        let mut conn = self.conn.clone();
        let names: Vec<String> = conn.smembers(self.index_key()).await?;
        let mut records = Vec::with_capacity(names.len());
        for name in names {
            if let Some(record) = self.try_get(&name).await? {
                records.push(record);
            }
        }
        records.sort_by(|a: &R, b: &R| a.name().cmp(b.name()));
        Ok(records)
    }
}
