// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! Resource records — `AdapterRecord` and `ToolRecord`.
//!
//! `ToolRecord` models "object inheritance of ToolData from AdapterData" as
//! composition: it embeds an [`AdapterRecord`] plus a [`ToolDefinition`],
//! never as a subtype. [`Deref`]/[`DerefMut`] to the embedded adapter give it
//! the same field surface for authorization and deployment purposes.

use std::collections::{BTreeMap, BTreeSet};
use std::ops::{Deref, DerefMut};
use std::sync::OnceLock;

use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::domain::error::GatewayError;

/// `^[a-z0-9-]+$`, non-empty.
fn name_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[a-z0-9-]+$").expect("static regex"))
}

pub fn validate_name(name: &str) -> Result<(), GatewayError> {
    if name.is_empty() || !name_pattern().is_match(name) {
        return Err(GatewayError::ValidationFailure(format!(
            "name '{name}' must match ^[a-z0-9-]+$ and be non-empty"
        )));
    }
    Ok(())
}

/// Which kind of workload a record deploys as. Drives pod labels and the
/// companion service's cluster-IP policy (§6.4).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResourceType {
    Mcp,
    Tool,
}

impl ResourceType {
    pub fn label_value(self) -> &'static str {
        match self {
            ResourceType::Mcp => "mcp",
            ResourceType::Tool => "tool",
        }
    }
}

fn normalize_roles(roles: impl IntoIterator<Item = String>) -> BTreeSet<String> {
    roles
        .into_iter()
        .map(|r| r.trim().to_lowercase())
        .filter(|r| !r.is_empty())
        .collect()
}

/// Incoming create/update payload for an adapter. Distinct from
/// [`AdapterRecord`]: identity and audit fields are never accepted from a
/// client body, only assigned by [`crate::application::resource_service`].
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdapterData {
    pub name: String,
    pub image_name: String,
    pub image_version: String,
    #[serde(default)]
    pub environment_variables: BTreeMap<String, String>,
    pub replica_count: u32,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub use_workload_identity: bool,
    #[serde(default)]
    pub required_roles: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdapterRecord {
    pub id: Uuid,
    pub name: String,
    pub image_name: String,
    pub image_version: String,
    pub environment_variables: BTreeMap<String, String>,
    pub replica_count: u32,
    pub description: String,
    pub use_workload_identity: bool,
    pub required_roles: BTreeSet<String>,
    pub created_by: String,
    pub created_at: DateTime<Utc>,
    pub last_updated_at: DateTime<Utc>,
}

impl AdapterRecord {
    pub fn from_data(data: AdapterData, created_by: String, now: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: data.name,
            image_name: data.image_name,
            image_version: data.image_version,
            environment_variables: data.environment_variables,
            replica_count: data.replica_count,
            description: data.description,
            use_workload_identity: data.use_workload_identity,
            required_roles: normalize_roles(data.required_roles),
            created_by,
            created_at: now,
            last_updated_at: now,
        }
    }

    /// Applies a metadata-only or redeploy-triggering update, preserving
    /// identity and audit fields. Does not decide whether to redeploy — see
    /// [`AdapterRecord::deployment_dirty`].
    pub fn apply_update(&mut self, data: AdapterData, now: DateTime<Utc>) {
        self.image_name = data.image_name;
        self.image_version = data.image_version;
        self.environment_variables = data.environment_variables;
        self.replica_count = data.replica_count;
        self.description = data.description;
        self.use_workload_identity = data.use_workload_identity;
        self.required_roles = normalize_roles(data.required_roles);
        self.last_updated_at = now;
    }

    /// §4.6/§8.4: compares exactly `{imageName, imageVersion, replicaCount,
    /// environmentVariables}`; envs compare as sorted key-value sequences,
    /// which `BTreeMap`'s `PartialEq` already gives us.
    pub fn deployment_dirty(&self, other: &AdapterRecord) -> bool {
        self.image_name != other.image_name
            || self.image_version != other.image_version
            || self.replica_count != other.replica_count
            || self.environment_variables != other.environment_variables
    }

    pub fn deployment_spec(&self, resource_type: ResourceType) -> DeploymentSpec {
        DeploymentSpec {
            name: self.name.clone(),
            resource_type,
            image_name: self.image_name.clone(),
            image_version: self.image_version.clone(),
            replica_count: self.replica_count,
            environment_variables: self.environment_variables.clone(),
            use_workload_identity: self.use_workload_identity,
        }
    }
}

/// `{ tool: {name, description, inputSchema, ...}, port, path }`, embedded in
/// a [`ToolRecord`]. Invariant: `tool.name == toolRecord.name`, enforced by
/// [`ToolRecord::from_data`]/[`ToolRecord::apply_update`].
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolDefinition {
    pub tool: ToolDescriptor,
    #[serde(default = "default_tool_port")]
    pub port: u16,
    #[serde(default = "default_tool_path")]
    pub path: String,
}

fn default_tool_port() -> u16 {
    443
}

fn default_tool_path() -> String {
    "/score".to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolDescriptor {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default = "default_input_schema")]
    pub input_schema: Value,
}

fn default_input_schema() -> Value {
    serde_json::json!({ "type": "object" })
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolData {
    #[serde(flatten)]
    pub adapter: AdapterData,
    pub tool_definition: ToolDefinition,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolRecord {
    #[serde(flatten)]
    pub adapter: AdapterRecord,
    pub tool_definition: ToolDefinition,
}

impl ToolRecord {
    pub fn from_data(mut data: ToolData, created_by: String, now: DateTime<Utc>) -> Self {
        data.tool_definition.tool.name = data.adapter.name.clone();
        Self {
            adapter: AdapterRecord::from_data(data.adapter, created_by, now),
            tool_definition: data.tool_definition,
        }
    }

    pub fn apply_update(&mut self, mut data: ToolData, now: DateTime<Utc>) {
        data.tool_definition.tool.name = data.adapter.name.clone();
        self.adapter.apply_update(data.adapter, now);
        self.tool_definition = data.tool_definition;
    }

    pub fn deployment_dirty(&self, other: &ToolRecord) -> bool {
        self.adapter.deployment_dirty(&other.adapter)
    }
}

/// What [`crate::application::resource_service::ResourceService`] needs from
/// a record kind to stay generic over "adapter" vs. "tool" — name, how it
/// turns into a [`DeploymentSpec`], and how a client-supplied draft becomes
/// or updates one. Built from a draft rather than deserialized directly, so
/// a client body can never smuggle in `id`/`createdBy`/`createdAt`.
pub trait ResourceRecord: Clone + Send + Sync + crate::domain::permission::Owned + 'static {
    type Draft: Send + Sync;

    fn name(&self) -> &str;
    fn resource_type() -> ResourceType;
    fn deployment_spec(&self) -> DeploymentSpec;
    fn deployment_dirty(&self, other: &Self) -> bool;
    fn draft_name(draft: &Self::Draft) -> &str;
    fn from_draft(draft: Self::Draft, created_by: String, now: DateTime<Utc>) -> Self;
    fn apply_draft(&mut self, draft: Self::Draft, now: DateTime<Utc>);
}

impl ResourceRecord for AdapterRecord {
    type Draft = AdapterData;

    fn name(&self) -> &str {
        &self.name
    }

    fn resource_type() -> ResourceType {
        ResourceType::Mcp
    }

    fn deployment_spec(&self) -> DeploymentSpec {
        AdapterRecord::deployment_spec(self, ResourceType::Mcp)
    }

    fn deployment_dirty(&self, other: &Self) -> bool {
        AdapterRecord::deployment_dirty(self, other)
    }

    fn draft_name(draft: &Self::Draft) -> &str {
        &draft.name
    }

    fn from_draft(draft: Self::Draft, created_by: String, now: DateTime<Utc>) -> Self {
        AdapterRecord::from_data(draft, created_by, now)
    }

    fn apply_draft(&mut self, draft: Self::Draft, now: DateTime<Utc>) {
        AdapterRecord::apply_update(self, draft, now)
    }
}

impl ResourceRecord for ToolRecord {
    type Draft = ToolData;

    fn name(&self) -> &str {
        &self.adapter.name
    }

    fn resource_type() -> ResourceType {
        ResourceType::Tool
    }

    fn deployment_spec(&self) -> DeploymentSpec {
        self.adapter.deployment_spec(ResourceType::Tool)
    }

    fn deployment_dirty(&self, other: &Self) -> bool {
        ToolRecord::deployment_dirty(self, other)
    }

    fn draft_name(draft: &Self::Draft) -> &str {
        &draft.adapter.name
    }

    fn from_draft(draft: Self::Draft, created_by: String, now: DateTime<Utc>) -> Self {
        ToolRecord::from_data(draft, created_by, now)
    }

    fn apply_draft(&mut self, draft: Self::Draft, now: DateTime<Utc>) {
        ToolRecord::apply_update(self, draft, now)
    }
}

impl crate::domain::permission::Owned for AdapterRecord {
    fn created_by(&self) -> &str {
        &self.created_by
    }

    fn required_roles(&self) -> &BTreeSet<String> {
        &self.required_roles
    }
}

impl crate::domain::permission::Owned for ToolRecord {
    fn created_by(&self) -> &str {
        &self.adapter.created_by
    }

    fn required_roles(&self) -> &BTreeSet<String> {
        &self.adapter.required_roles
    }
}

impl Deref for ToolRecord {
    type Target = AdapterRecord;

    fn deref(&self) -> &Self::Target {
        &self.adapter
    }
}

impl DerefMut for ToolRecord {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.adapter
    }
}

/// The narrow view the Deployment Manager (C5) needs — never a raw client
/// request, always the record as persisted (§9 open question 1).
#[derive(Debug, Clone)]
pub struct DeploymentSpec {
    pub name: String,
    pub resource_type: ResourceType,
    pub image_name: String,
    pub image_version: String,
    pub replica_count: u32,
    pub environment_variables: BTreeMap<String, String>,
    pub use_workload_identity: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_invalid_names() {
        for bad in ["Has-Caps", "has_underscore", "", "has space", "trailingSlash/"] {
            assert!(validate_name(bad).is_err(), "expected {bad:?} to be rejected");
        }
        for good in ["a", "a1-b2", "weather"] {
            assert!(validate_name(good).is_ok(), "expected {good:?} to be accepted");
        }
    }

    #[test]
    fn deployment_dirty_ignores_description_and_roles() {
        let now = Utc::now();
        let base = AdapterRecord::from_data(
            AdapterData {
                name: "a1".into(),
                image_name: "img".into(),
                image_version: "v1".into(),
                environment_variables: BTreeMap::from([("K".to_string(), "old".to_string())]),
                replica_count: 1,
                description: "d1".into(),
                use_workload_identity: false,
                required_roles: vec![],
            },
            "u1".into(),
            now,
        );

        let mut metadata_only = base.clone();
        metadata_only.apply_update(
            AdapterData {
                name: base.name.clone(),
                description: "d2".into(),
                required_roles: vec!["reader".into()],
                ..adapter_data_from(&base)
            },
            now,
        );
        assert!(!base.deployment_dirty(&metadata_only));

        let mut redeploy = base.clone();
        redeploy.apply_update(
            AdapterData {
                environment_variables: BTreeMap::from([("K".to_string(), "new".to_string())]),
                ..adapter_data_from(&base)
            },
            now,
        );
        assert!(base.deployment_dirty(&redeploy));
    }

    fn adapter_data_from(r: &AdapterRecord) -> AdapterData {
        AdapterData {
            name: r.name.clone(),
            image_name: r.image_name.clone(),
            image_version: r.image_version.clone(),
            environment_variables: r.environment_variables.clone(),
            replica_count: r.replica_count,
            description: r.description.clone(),
            use_workload_identity: r.use_workload_identity,
            required_roles: r.required_roles.iter().cloned().collect(),
        }
    }
}
