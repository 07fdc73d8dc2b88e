// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! `RecordRepository` implementations, one per `resourceStore.kind` (§6.2).

pub mod in_memory;
pub mod postgres;
pub mod redis_cache;
