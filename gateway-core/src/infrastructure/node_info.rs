// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! Kubernetes-backed Node-Info Provider (C4): lists a workload's `Endpoints`
//! object and derives per-pod addresses from its subsets, short-TTL cached to
//! absorb the request volume of a busy gateway without adding a separate
//! caching layer above this module.

use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use k8s_openapi::api::core::v1::{EndpointAddress, Endpoints};
use kube::api::Api;
use parking_lot::Mutex;

use crate::domain::node_info::{NodeInfoError, NodeInfoProvider, ReplicaEndpoint};

struct CacheEntry {
    endpoints: Vec<ReplicaEndpoint>,
    fetched_at: Instant,
}

pub struct KubeNodeInfoProvider {
    client: kube::Client,
    namespace: String,
    port: u16,
    ttl: Duration,
    cache: Mutex<std::collections::HashMap<String, CacheEntry>>,
}

impl KubeNodeInfoProvider {
    pub fn new(client: kube::Client, namespace: impl Into<String>, port: u16, ttl: Duration) -> Self {
        Self {
            client,
            namespace: namespace.into(),
            port,
            ttl,
            cache: Mutex::new(std::collections::HashMap::new()),
        }
    }

    async fn fetch(&self, workload_name: &str) -> Result<Vec<ReplicaEndpoint>, NodeInfoError> {
        let api: Api<Endpoints> = Api::namespaced(self.client.clone(), &self.namespace);
        let endpoints = api
            .get(workload_name)
            .await
            .map_err(|e| NodeInfoError::Unavailable(e.to_string()))?;

        Ok(replicas_from_endpoints(workload_name, self.port, endpoints))
    }
}

/// Derives one [`ReplicaEndpoint`] per ready address across all subsets of
/// an `Endpoints` object, pulled out of [`KubeNodeInfoProvider::fetch`] so it
/// can be exercised without a live cluster. `ordinal` comes from the pod's
/// own `<name>-<ordinal>` suffix (§4.5's StatefulSet naming convention),
/// read off `hostname` or the address's `target_ref` — a per-subset index
/// would collapse every address in a single subset onto ordinal 0, which is
/// the common case for a workload's `Endpoints` object.
fn replicas_from_endpoints(workload_name: &str, port: u16, endpoints: Endpoints) -> Vec<ReplicaEndpoint> {
    let mut replicas: Vec<ReplicaEndpoint> = endpoints
        .subsets
        .unwrap_or_default()
        .into_iter()
        .flat_map(|subset| subset.addresses.unwrap_or_default())
        .enumerate()
        .map(|(fallback_ordinal, address)| ReplicaEndpoint {
            workload_name: workload_name.to_string(),
            ordinal: pod_ordinal(&address, workload_name).unwrap_or(fallback_ordinal as u32),
            address: format!("http://{}:{}", address.ip, port),
        })
        .collect();
    replicas.sort_by_key(|r| r.ordinal);
    replicas
}

/// Parses the StatefulSet ordinal off `<workload_name>-<ordinal>`, the pod
/// name carried as `hostname` (headless service) or `target_ref.name`.
fn pod_ordinal(address: &EndpointAddress, workload_name: &str) -> Option<u32> {
    let pod_name = address
        .hostname
        .as_deref()
        .or_else(|| address.target_ref.as_ref().and_then(|r| r.name.as_deref()))?;
    pod_name.strip_prefix(workload_name)?.strip_prefix('-')?.parse().ok()
}

#[async_trait]
impl NodeInfoProvider for KubeNodeInfoProvider {
    async fn resolve_endpoints(&self, workload_name: &str) -> Result<Vec<ReplicaEndpoint>, NodeInfoError> {
        if let Some(entry) = self.cache.lock().get(workload_name) {
            if entry.fetched_at.elapsed() < self.ttl {
                return Ok(entry.endpoints.clone());
            }
        }

        let endpoints = self.fetch(workload_name).await?;
        self.cache.lock().insert(
            workload_name.to_string(),
            CacheEntry { endpoints: endpoints.clone(), fetched_at: Instant::now() },
        );
        if endpoints.is_empty() {
            return Err(NodeInfoError::NotFound(workload_name.to_string()));
        }
        Ok(endpoints)
    }
}

pub fn into_provider(client: kube::Client, namespace: String, port: u16, ttl: Duration) -> Arc<dyn NodeInfoProvider> {
    Arc::new(KubeNodeInfoProvider::new(client, namespace, port, ttl))
}

#[cfg(test)]
mod tests {
    use super::*;
    use k8s_openapi::api::core::v1::EndpointSubset;
    use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;

    fn address(hostname: &str, ip: &str) -> EndpointAddress {
        EndpointAddress { hostname: Some(hostname.to_string()), ip: ip.to_string(), ..Default::default() }
    }

    #[test]
    fn three_addresses_in_one_subset_get_distinct_ordinals() {
        let endpoints = Endpoints {
            metadata: ObjectMeta::default(),
            subsets: Some(vec![EndpointSubset {
                addresses: Some(vec![
                    address("a1-0", "10.0.0.1"),
                    address("a1-1", "10.0.0.2"),
                    address("a1-2", "10.0.0.3"),
                ]),
                ..Default::default()
            }]),
        };

        let replicas = replicas_from_endpoints("a1", 443, endpoints);
        let mut ordinals: Vec<u32> = replicas.iter().map(|r| r.ordinal).collect();
        ordinals.sort();
        assert_eq!(ordinals, vec![0, 1, 2]);
    }

    #[test]
    fn ordinal_falls_back_to_position_when_pod_name_is_unparseable() {
        let endpoints = Endpoints {
            metadata: ObjectMeta::default(),
            subsets: Some(vec![EndpointSubset {
                addresses: Some(vec![
                    EndpointAddress { hostname: None, ip: "10.0.0.1".to_string(), ..Default::default() },
                    EndpointAddress { hostname: None, ip: "10.0.0.2".to_string(), ..Default::default() },
                ]),
                ..Default::default()
            }]),
        };

        let replicas = replicas_from_endpoints("a1", 443, endpoints);
        let mut ordinals: Vec<u32> = replicas.iter().map(|r| r.ordinal).collect();
        ordinals.sort();
        assert_eq!(ordinals, vec![0, 1]);
    }
}
