// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! Session Routing Handler (C7) — decides the backend for a new or existing
//! MCP streamable-HTTP session. The only write path into the session store:
//! a new session is bound to its chosen backend once the upstream response
//! carries a session id.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::domain::error::GatewayError;
use crate::domain::node_info::NodeInfoProvider;
use crate::domain::session::SessionStore;

pub struct SessionRoutingHandler {
    node_info: Arc<dyn NodeInfoProvider>,
    session_store: Arc<dyn SessionStore>,
    round_robin: AtomicUsize,
}

/// Which workload a routed request is headed for: an adapter's own name, or
/// the fixed tool-gateway workload for the bare `/mcp` entry.
pub enum RouteTarget<'a> {
    NewSession { workload_name: &'a str },
    ExistingSession { session_id: &'a str },
}

impl SessionRoutingHandler {
    pub fn new(node_info: Arc<dyn NodeInfoProvider>, session_store: Arc<dyn SessionStore>) -> Self {
        Self { node_info, session_store, round_robin: AtomicUsize::new(0) }
    }

    /// §4.7: resolves the backend URL to forward this request to. Never
    /// writes to the session store itself — see [`Self::bind_new_session`].
    pub async fn resolve(&self, target: RouteTarget<'_>) -> Result<String, GatewayError> {
        match target {
            RouteTarget::NewSession { workload_name } => {
                let endpoints = self
                    .node_info
                    .resolve_endpoints(workload_name)
                    .await
                    .map_err(|e| GatewayError::ServiceUnavailable(e.to_string()))?;

                if endpoints.is_empty() {
                    return Err(GatewayError::ServiceUnavailable(format!(
                        "no ready replicas for workload '{workload_name}'"
                    )));
                }

                let idx = self.round_robin.fetch_add(1, Ordering::Relaxed) % endpoints.len();
                Ok(endpoints[idx].address.clone())
            }
            RouteTarget::ExistingSession { session_id } => self
                .session_store
                .get(session_id)
                .await
                .map_err(|e| GatewayError::ServiceUnavailable(e.to_string()))?
                .ok_or_else(|| {
                    GatewayError::ServiceUnavailable(format!("no backend bound for session '{session_id}'"))
                }),
        }
    }

    /// After the request is proxied: if the upstream response carried a
    /// session-initialization header and the request was "new", bind it.
    pub async fn bind_new_session(&self, session_id: &str, target_url: &str) -> Result<(), GatewayError> {
        self.session_store
            .set(session_id, target_url)
            .await
            .map_err(|e| GatewayError::ServiceUnavailable(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::sync::Mutex;

    use crate::domain::node_info::{NodeInfoError, ReplicaEndpoint};
    use crate::domain::session::SessionStoreError;

    struct FakeNodeInfo {
        endpoints: Vec<ReplicaEndpoint>,
    }

    #[async_trait]
    impl NodeInfoProvider for FakeNodeInfo {
        async fn resolve_endpoints(&self, workload_name: &str) -> Result<Vec<ReplicaEndpoint>, NodeInfoError> {
            if self.endpoints.is_empty() {
                return Err(NodeInfoError::NotFound(workload_name.to_string()));
            }
            Ok(self.endpoints.clone())
        }
    }

    #[derive(Default)]
    struct FakeSessionStore {
        entries: Mutex<HashMap<String, String>>,
    }

    #[async_trait]
    impl SessionStore for FakeSessionStore {
        async fn get(&self, session_id: &str) -> Result<Option<String>, SessionStoreError> {
            Ok(self.entries.lock().unwrap().get(session_id).cloned())
        }
        async fn set(&self, session_id: &str, target_url: &str) -> Result<(), SessionStoreError> {
            self.entries.lock().unwrap().insert(session_id.to_string(), target_url.to_string());
            Ok(())
        }
    }

    fn endpoint(ordinal: u32) -> ReplicaEndpoint {
        ReplicaEndpoint {
            workload_name: "a1".to_string(),
            ordinal,
            address: format!("http://a1-{ordinal}:8000"),
        }
    }

    #[tokio::test]
    async fn invariant_9_no_backend_yields_service_unavailable() {
        let node_info = Arc::new(FakeNodeInfo { endpoints: vec![] });
        let store = Arc::new(FakeSessionStore::default());
        let handler = SessionRoutingHandler::new(node_info, store.clone());

        let err = handler
            .resolve(RouteTarget::NewSession { workload_name: "a1" })
            .await
            .unwrap_err();
        assert!(matches!(err, GatewayError::ServiceUnavailable(_)));
        assert!(store.entries.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn s7_s8_session_affinity_across_two_requests() {
        let node_info = Arc::new(FakeNodeInfo { endpoints: vec![endpoint(0), endpoint(1)] });
        let store = Arc::new(FakeSessionStore::default());
        let handler = SessionRoutingHandler::new(node_info, store);

        let chosen = handler
            .resolve(RouteTarget::NewSession { workload_name: "a1" })
            .await
            .unwrap();
        handler.bind_new_session("sess-1", &chosen).await.unwrap();

        let second = handler
            .resolve(RouteTarget::ExistingSession { session_id: "sess-1" })
            .await
            .unwrap();
        assert_eq!(second, chosen);
    }

    #[tokio::test]
    async fn existing_session_miss_does_not_silently_create() {
        let node_info = Arc::new(FakeNodeInfo { endpoints: vec![endpoint(0)] });
        let store = Arc::new(FakeSessionStore::default());
        let handler = SessionRoutingHandler::new(node_info, store);

        let err = handler
            .resolve(RouteTarget::ExistingSession { session_id: "unknown" })
            .await
            .unwrap_err();
        assert!(matches!(err, GatewayError::ServiceUnavailable(_)));
    }
}
