// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

pub mod repository_factory;
pub mod resource_service;
pub mod session_routing;
pub mod tool_gateway;
