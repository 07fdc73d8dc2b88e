// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! # Presentation Layer
//!
//! HTTP surface that translates external requests into application service
//! calls. No business logic lives here — all real work is delegated to
//! `crate::application`.
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`api`] | `AppState` and the main gateway's route table |
//! | [`adapters`] | `/adapters` CRUD + status + logs handlers |
//! | [`tools`] | `/tools` CRUD + status + logs handlers |
//! | [`resource_handlers`] | Generic CRUD bodies shared by `adapters`/`tools` |
//! | [`proxy_handler`] | Session routing + reverse proxy entry points (C7/C8) |
//! | [`mcp_server`] | The `toolgateway` role's own MCP JSON surface (C9) |
//! | [`middleware`] | Identity Forwarding (C10) |
//! | [`error`] | `GatewayError` to HTTP status mapping |

pub mod adapters;
pub mod api;
pub mod error;
pub mod mcp_server;
pub mod middleware;
pub mod proxy_handler;
pub mod resource_handlers;
pub mod tools;
