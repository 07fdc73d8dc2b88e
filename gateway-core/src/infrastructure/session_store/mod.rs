// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! `SessionStore` implementations (§6.2: `sessionStore.kind`).

pub mod in_memory;
pub mod redis;

use std::sync::Arc;

use crate::domain::session::{SessionStore, SessionStoreBackend};

pub async fn create_session_store(backend: &SessionStoreBackend) -> anyhow::Result<Arc<dyn SessionStore>> {
    Ok(match backend {
        SessionStoreBackend::InMemory => Arc::new(in_memory::InMemorySessionStore::new()),
        SessionStoreBackend::Redis(cfg) => Arc::new(redis::RedisSessionStore::connect(cfg).await?),
    })
}
