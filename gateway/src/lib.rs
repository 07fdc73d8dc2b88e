// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! MCP gateway CLI library — exposes the testable pieces of `main.rs`.

pub mod config;
pub mod server;
