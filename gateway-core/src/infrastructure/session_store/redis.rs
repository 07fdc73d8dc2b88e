// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! Redis-backed `SessionStore` (§6.2: `sessionStore.kind = distributed-cache`).
//! Bounded staleness is enforced with a TTL on every write rather than a
//! background sweep.

use async_trait::async_trait;
use redis::aio::ConnectionManager;
use redis::AsyncCommands;

use crate::domain::session::{RedisSessionConfig, SessionStore, SessionStoreError};

pub struct RedisSessionStore {
    conn: ConnectionManager,
    ttl_seconds: u64,
}

impl RedisSessionStore {
    pub async fn connect(config: &RedisSessionConfig) -> anyhow::Result<Self> {
        let client = redis::Client::open(config.connection_string.as_str())?;
        let conn = client.get_connection_manager().await?;
        Ok(Self { conn, ttl_seconds: config.ttl_seconds })
    }

    fn key(session_id: &str) -> String {
        format!("session:{session_id}")
    }
}

#[async_trait]
impl SessionStore for RedisSessionStore {
    async fn get(&self, session_id: &str) -> Result<Option<String>, SessionStoreError> {
        let mut conn = self.conn.clone();
        let value: Option<String> = conn.get(Self::key(session_id)).await?;
        Ok(value)
    }

    async fn set(&self, session_id: &str, target_url: &str) -> Result<(), SessionStoreError> {
        let mut conn = self.conn.clone();
        conn.set_ex::<_, _, ()>(Self::key(session_id), target_url, self.ttl_seconds).await?;
        Ok(())
    }
}
