// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! Session Store (C2) — durable `session-id -> backend target URL` mapping.
//!
//! Contract only: `get`/`set`, at-least-once durability, bounded staleness,
//! last-writer-wins, no cross-session ordering. Session ids are assumed
//! globally unique so `set` never needs a compare-and-swap.

use async_trait::async_trait;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionEntry {
    pub session_id: String,
    pub target_url: String,
}

#[derive(Debug, thiserror::Error)]
pub enum SessionStoreError {
    #[error("session store unavailable: {0}")]
    Unavailable(String),
}

impl From<redis::RedisError> for SessionStoreError {
    fn from(err: redis::RedisError) -> Self {
        SessionStoreError::Unavailable(err.to_string())
    }
}

#[async_trait]
pub trait SessionStore: Send + Sync {
    async fn get(&self, session_id: &str) -> Result<Option<String>, SessionStoreError>;
    async fn set(&self, session_id: &str, target_url: &str) -> Result<(), SessionStoreError>;
}

#[derive(Debug, Clone)]
pub enum SessionStoreBackend {
    InMemory,
    Redis(RedisSessionConfig),
}

#[derive(Debug, Clone)]
pub struct RedisSessionConfig {
    pub connection_string: String,
    pub ttl_seconds: u64,
}
