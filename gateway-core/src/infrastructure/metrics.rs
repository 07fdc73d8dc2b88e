// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! Ambient metrics exposition (§7): one process-global Prometheus recorder,
//! rendered behind an axum handler rather than the exporter's own listener so
//! it shares the gateway's bind address and port.

use axum::routing::get;
use axum::Router;
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};

pub fn install_recorder() -> Result<PrometheusHandle, metrics_exporter_prometheus::BuildError> {
    PrometheusBuilder::new().install_recorder()
}

/// A standalone `/metrics` router, merged into the main app so it shares the
/// gateway's bind address rather than opening a second listener.
pub fn router(handle: PrometheusHandle) -> Router {
    Router::new().route("/metrics", get(move || async move { handle.render() }))
}
