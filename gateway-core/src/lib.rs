// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! # gateway-core
//!
//! Core domain model, application services, and infrastructure adapters for
//! the MCP gateway. Owns everything except process bootstrap and CLI
//! parsing, which live in the `gateway` binary crate.
//!
//! ## Components (C1–C10)
//!
//! | Component | Module |
//! |---|---|
//! | C1 Resource Store | [`domain::repository`], [`infrastructure::repositories`] |
//! | C2 Session Store | [`domain::session`], [`infrastructure::session_store`] |
//! | C3 Permission Evaluator | [`domain::permission`] |
//! | C4 Node-Info Provider | [`domain::node_info`], [`infrastructure::node_info`] |
//! | C5 Deployment Manager | [`domain::deployment`], [`infrastructure::deployment`] |
//! | C6 Resource Services | [`application::resource_service`] |
//! | C7 Session Routing Handler | [`application::session_routing`] |
//! | C8 Reverse Proxy | [`infrastructure::reverse_proxy`] |
//! | C9 Tool-Gateway Router | [`application::tool_gateway`], [`presentation::mcp_server`] |
//! | C10 Identity Forwarding | [`domain::identity`], [`presentation::middleware::identity`] |
//!
//! ## Layer Structure
//!
//! ```text
//! presentation/   ← HTTP surface (Axum): routes, middleware, error mapping
//!     ↓
//! application/    ← Use-cases: resource CRUD, session routing, tool dispatch
//!     ↓
//! domain/         ← Records, traits, invariants — no I/O
//!     ↓
//! infrastructure/ ← Postgres/Redis/in-memory stores, kube client, reverse proxy
//! ```

pub mod application;
pub mod domain;
pub mod infrastructure;
pub mod presentation;
