// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! # Infrastructure Layer
//!
//! Concrete adapters for the traits `domain` declares: storage backends for
//! `RecordRepository`/`SessionStore`, the Kubernetes-backed `NodeInfoProvider`
//! and `DeploymentManager`, the JWT-backed `TokenValidator`, and the
//! streaming reverse proxy.

pub mod deployment;
pub mod identity;
pub mod metrics;
pub mod node_info;
pub mod repositories;
pub mod reverse_proxy;
pub mod session_store;
