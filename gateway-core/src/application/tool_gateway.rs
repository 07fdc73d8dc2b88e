// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! Tool-Gateway Router (C9) — an MCP server in its own right, exposing the
//! union of all registered tools and dispatching each call to its backing
//! service. Exact-match dispatch by tool name (grounded directly on
//! `infrastructure::tool_router::ToolRouter`'s index-then-wildcard shape,
//! narrowed here since tool names are never wildcarded).

use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::Mutex;
use serde_json::Value;

use crate::domain::permission::{evaluate, filter, Operation, Principal};
use crate::domain::record::{ToolDescriptor, ToolRecord};
use crate::domain::repository::RecordRepository;

const LIST_CACHE_TTL: Duration = Duration::from_secs(300);

struct ListCache {
    records: Vec<ToolRecord>,
    fetched_at: Instant,
}

pub struct ToolGatewayRouter {
    repo: Arc<dyn RecordRepository<ToolRecord>>,
    http: reqwest::Client,
    namespace: String,
    cache: Mutex<Option<ListCache>>,
}

/// MCP tool-result envelope: errors are reported via `is_error`, never a
/// thrown exception (§4.9).
#[derive(Debug, Clone, serde::Serialize)]
pub struct ToolResult {
    pub content: String,
    pub is_error: bool,
}

impl ToolResult {
    fn ok(content: String) -> Self {
        Self { content, is_error: false }
    }

    fn error(message: impl Into<String>) -> Self {
        Self { content: message.into(), is_error: true }
    }
}

impl ToolGatewayRouter {
    pub fn new(repo: Arc<dyn RecordRepository<ToolRecord>>, namespace: impl Into<String>) -> Self {
        Self { repo, http: reqwest::Client::new(), namespace: namespace.into(), cache: Mutex::new(None) }
    }

    async fn cached_records(&self) -> anyhow::Result<Vec<ToolRecord>> {
        if let Some(cache) = self.cache.lock().as_ref() {
            if cache.fetched_at.elapsed() < LIST_CACHE_TTL {
                return Ok(cache.records.clone());
            }
        }
        let records = self.repo.list().await?;
        *self.cache.lock() = Some(ListCache { records: records.clone(), fetched_at: Instant::now() });
        Ok(records)
    }

    /// §4.9 list-tools: cached as the raw list, filtered per request.
    pub async fn list_tools(&self, principal: &Principal) -> anyhow::Result<Vec<ToolDescriptor>> {
        let records = self.cached_records().await?;
        let visible = filter(records, principal, Operation::Read);
        Ok(visible.into_iter().map(|r| r.tool_definition.tool).collect())
    }

    /// §4.9 call-tool.
    pub async fn call_tool(&self, principal: &Principal, tool_name: &str, arguments: Value) -> ToolResult {
        let record = match self.repo.try_get(tool_name).await {
            Ok(Some(record)) => record,
            Ok(None) => return ToolResult::error(format!("Error: Tool '{tool_name}' not found")),
            Err(e) => return ToolResult::error(format!("Error: Failed to connect: {e}")),
        };

        if !evaluate(principal, &record, Operation::Read) {
            return ToolResult::error("Error: You do not have permission to invoke this tool");
        }

        let url = format!(
            "http://{}-service.{}.svc.cluster.local:{}{}",
            tool_name, self.namespace, record.tool_definition.port, record.tool_definition.path
        );

        let response = match self.http.post(&url).json(&arguments).send().await {
            Ok(response) => response,
            Err(_) => return ToolResult::error("Error: Failed to connect to the tool backend"),
        };

        if !response.status().is_success() {
            return ToolResult::error(format!("Error: Inference server returned {}", response.status().as_u16()));
        }

        match response.text().await {
            Ok(body) => ToolResult::ok(body),
            Err(_) => ToolResult::error("Error: Failed to connect to the tool backend"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use chrono::Utc;
    use std::collections::BTreeMap;

    use crate::domain::record::{AdapterData, ToolData, ToolDefinition};
    use crate::domain::repository::RepositoryError;

    #[derive(Default)]
    struct FakeRepo {
        records: std::sync::Mutex<Vec<ToolRecord>>,
    }

    #[async_trait]
    impl RecordRepository<ToolRecord> for FakeRepo {
        async fn try_get(&self, name: &str) -> Result<Option<ToolRecord>, RepositoryError> {
            Ok(self.records.lock().unwrap().iter().find(|r| r.name == name).cloned())
        }
        async fn upsert(&self, record: &ToolRecord) -> Result<(), RepositoryError> {
            self.records.lock().unwrap().push(record.clone());
            Ok(())
        }
        async fn delete(&self, _name: &str) -> Result<(), RepositoryError> {
            Ok(())
        }
        async fn list(&self) -> Result<Vec<ToolRecord>, RepositoryError> {
            Ok(self.records.lock().unwrap().clone())
        }
    }

    fn tool_record(name: &str, required_roles: &[&str]) -> ToolRecord {
        ToolRecord::from_data(
            ToolData {
                adapter: AdapterData {
                    name: name.to_string(),
                    image_name: "img".to_string(),
                    image_version: "v1".to_string(),
                    environment_variables: BTreeMap::new(),
                    replica_count: 1,
                    description: String::new(),
                    use_workload_identity: false,
                    required_roles: required_roles.iter().map(|r| r.to_string()).collect(),
                },
                tool_definition: ToolDefinition {
                    tool: ToolDescriptor {
                        name: name.to_string(),
                        description: "does a thing".to_string(),
                        input_schema: serde_json::json!({"type": "object"}),
                    },
                    port: 443,
                    path: "/score".to_string(),
                },
            },
            "u1".to_string(),
            Utc::now(),
        )
    }

    #[tokio::test]
    async fn call_unknown_tool_is_a_reported_error_not_a_panic() {
        let repo = Arc::new(FakeRepo::default());
        let router = ToolGatewayRouter::new(repo, "default");
        let principal = Principal::new("u1", []);

        let result = router.call_tool(&principal, "missing", serde_json::json!({})).await;
        assert!(result.is_error);
        assert_eq!(result.content, "Error: Tool 'missing' not found");
    }

    #[tokio::test]
    async fn call_forbidden_tool_is_a_reported_error() {
        let repo = Arc::new(FakeRepo::default());
        repo.upsert(&tool_record("t1", &["reader"])).await.unwrap();
        let router = ToolGatewayRouter::new(repo, "default");
        let guest = Principal::new("u2", ["guest".to_string()]);

        let result = router.call_tool(&guest, "t1", serde_json::json!({})).await;
        assert!(result.is_error);
        assert_eq!(result.content, "Error: You do not have permission to invoke this tool");
    }

    #[tokio::test]
    async fn list_tools_respects_per_request_filtering() {
        let repo = Arc::new(FakeRepo::default());
        repo.upsert(&tool_record("public", &[])).await.unwrap();
        repo.upsert(&tool_record("private", &["admin-only"])).await.unwrap();
        let router = ToolGatewayRouter::new(repo, "default");

        let guest = Principal::new("u2", ["guest".to_string()]);
        let visible = router.list_tools(&guest).await.unwrap();
        assert_eq!(visible.len(), 1);
        assert_eq!(visible[0].name, "public");
    }
}
