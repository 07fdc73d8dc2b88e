// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! Local-development `SessionStore` (§6.2: `sessionStore.kind = in-memory`).

use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;

use crate::domain::session::{SessionStore, SessionStoreError};

#[derive(Default)]
pub struct InMemorySessionStore {
    entries: RwLock<HashMap<String, String>>,
}

impl InMemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SessionStore for InMemorySessionStore {
    async fn get(&self, session_id: &str) -> Result<Option<String>, SessionStoreError> {
        Ok(self.entries.read().unwrap().get(session_id).cloned())
    }

    async fn set(&self, session_id: &str, target_url: &str) -> Result<(), SessionStoreError> {
        self.entries.write().unwrap().insert(session_id.to_string(), target_url.to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn unknown_session_is_none_not_an_error() {
        let store = InMemorySessionStore::new();
        assert_eq!(store.get("missing").await.unwrap(), None);
    }

    #[tokio::test]
    async fn last_writer_wins() {
        let store = InMemorySessionStore::new();
        store.set("s1", "http://a").await.unwrap();
        store.set("s1", "http://b").await.unwrap();
        assert_eq!(store.get("s1").await.unwrap().as_deref(), Some("http://b"));
    }
}
