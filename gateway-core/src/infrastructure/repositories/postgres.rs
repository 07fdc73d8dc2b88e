// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! PostgreSQL `RecordRepository` (§6.2: `resourceStore.kind = document-db`).
//! Records are stored as JSONB documents keyed by name — a single `records`
//! table per resource kind, generic over any [`ResourceRecord`] rather than
//! one hand-written table per aggregate.

use std::marker::PhantomData;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use sqlx::postgres::{PgPool, PgPoolOptions};
use sqlx::Row;

use crate::domain::record::ResourceRecord;
use crate::domain::repository::{RecordRepository, RepositoryError};

pub struct PostgresRecordRepository<R> {
    pool: PgPool,
    table: String,
    _marker: PhantomData<R>,
}

impl<R: ResourceRecord + Serialize + DeserializeOwned> PostgresRecordRepository<R> {
    pub async fn connect(connection_string: &str, table: &str) -> anyhow::Result<Self> {
        let pool = PgPoolOptions::new().max_connections(5).connect(connection_string).await?;
        sqlx::query(&format!(
            r#"
            CREATE TABLE IF NOT EXISTS {table} (
                name TEXT PRIMARY KEY,
                data JSONB NOT NULL,
                updated_at TIMESTAMPTZ NOT NULL DEFAULT now()
            )
            "#
        ))
        .execute(&pool)
        .await?;
        Ok(Self { pool, table: table.to_string(), _marker: PhantomData })
    }

    pub fn with_pool(pool: PgPool, table: impl Into<String>) -> Self {
        Self { pool, table: table.into(), _marker: PhantomData }
    }
}

#[async_trait]
impl<R: ResourceRecord + Serialize + DeserializeOwned> RecordRepository<R> for PostgresRecordRepository<R> {
    async fn try_get(&self, name: &str) -> Result<Option<R>, RepositoryError> {
        let row = sqlx::query(&format!("SELECT data FROM {} WHERE name = $1", self.table))
            .bind(name)
            .fetch_optional(&self.pool)
            .await?;

        row.map(|row| {
            let value: serde_json::Value = row.get("data");
            serde_json::from_value(value).map_err(RepositoryError::from)
        })
        .transpose()
    }

    async fn upsert(&self, record: &R) -> Result<(), RepositoryError> {
        let data = serde_json::to_value(record)?;
        sqlx::query(&format!(
            r#"
            INSERT INTO {} (name, data, updated_at)
            VALUES ($1, $2, now())
            ON CONFLICT (name) DO UPDATE SET data = EXCLUDED.data, updated_at = EXCLUDED.updated_at
            "#,
            self.table
        ))
        .bind(record.name())
        .bind(data)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn delete(&self, name: &str) -> Result<(), RepositoryError> {
        sqlx::query(&format!("DELETE FROM {} WHERE name = $1", self.table))
            .bind(name)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn list(&self) -> Result<Vec<R>, RepositoryError> {
        let rows = sqlx::query(&format!("SELECT data FROM {} ORDER BY name ASC", self.table))
            .fetch_all(&self.pool)
            .await?;

        rows.into_iter()
            .map(|row| {
                let value: serde_json::Value = row.get("data");
                serde_json::from_value(value).map_err(RepositoryError::from)
            })
            .collect()
    }
}
