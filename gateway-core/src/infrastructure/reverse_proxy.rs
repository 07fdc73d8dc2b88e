// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! Reverse Proxy (C8) — forwards MCP streamable-HTTP traffic to a chosen
//! backend without buffering the body in either direction, using `reqwest`
//! streaming bodies the way the teacher uses them for outbound HTTP egress.

use axum::body::Body;
use axum::http::{HeaderMap, HeaderName, Method, StatusCode, Uri};
use bytes::Bytes;
use futures::TryStreamExt;

/// Hop-by-hop headers that must never be forwarded (RFC 7230 §6.1).
const HOP_BY_HOP: &[&str] =
    &["connection", "keep-alive", "proxy-authenticate", "proxy-authorization", "te", "trailer", "transfer-encoding", "upgrade"];

pub struct ProxiedResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Body,
}

#[derive(Debug, thiserror::Error)]
pub enum ProxyError {
    #[error("upstream connect failed: {0}")]
    ConnectFailed(String),
}

pub struct ReverseProxy {
    client: reqwest::Client,
}

impl ReverseProxy {
    pub fn new() -> Self {
        Self { client: reqwest::Client::new() }
    }

    /// §4.8 step 3: strips the leading `/adapters/<name>` prefix (two path
    /// segments) from `path`, appends a trailing `/` when what remains ends
    /// in `/messages`, then rejoins with `backend_base` and the original
    /// query/fragment.
    pub fn rewrite_target(backend_base: &str, original: &Uri) -> String {
        let path = original.path();
        let mut segments = path.splitn(4, '/').skip(1);
        segments.next(); // "adapters"
        segments.next(); // "<name>"
        let mut remainder = segments.next().map(|s| format!("/{s}")).unwrap_or_default();
        if let Some(rest) = segments.next() {
            remainder.push('/');
            remainder.push_str(rest);
        }
        if remainder.is_empty() {
            remainder.push('/');
        }
        if remainder.ends_with("/messages") {
            remainder.push('/');
        }

        let mut target = format!("{}{}", backend_base.trim_end_matches('/'), remainder);
        if let Some(query) = original.query() {
            target.push('?');
            target.push_str(query);
        }
        target
    }

    /// The bare `/mcp` entry point (§6.1): always forwarded to the fixed
    /// `toolgateway` workload's one route, `/mcp/rpc` — there is no
    /// `/adapters/<name>` prefix to strip here, so [`Self::rewrite_target`]
    /// does not apply.
    pub fn root_target(backend_base: &str, original: &Uri) -> String {
        let mut target = format!("{}/mcp/rpc", backend_base.trim_end_matches('/'));
        if let Some(query) = original.query() {
            target.push('?');
            target.push_str(query);
        }
        target
    }

    /// §4.8 steps 2-5: clones method/headers/body, sends with
    /// `ResponseHeadersRead` semantics (reqwest's default — it never buffers
    /// the full body before returning), and streams the result back.
    pub async fn forward(
        &self,
        method: Method,
        target_url: &str,
        headers: HeaderMap,
        body: Body,
    ) -> Result<ProxiedResponse, ProxyError> {
        let forwarded_headers = strip_hop_by_hop(headers);
        let reqwest_method =
            reqwest::Method::from_bytes(method.as_str().as_bytes()).map_err(|e| ProxyError::ConnectFailed(e.to_string()))?;

        let body_stream = body.into_data_stream();
        let upstream_body = reqwest::Body::wrap_stream(body_stream);

        let response = self
            .client
            .request(reqwest_method, target_url)
            .headers(forwarded_headers)
            .body(upstream_body)
            .send()
            .await
            .map_err(|e| ProxyError::ConnectFailed(e.to_string()))?;

        let status = StatusCode::from_u16(response.status().as_u16()).unwrap_or(StatusCode::BAD_GATEWAY);
        let headers = strip_hop_by_hop(response.headers().clone());
        let stream = response.bytes_stream().map_err(std::io::Error::other);
        let body = Body::from_stream(stream);

        Ok(ProxiedResponse { status, headers, body })
    }
}

impl Default for ReverseProxy {
    fn default() -> Self {
        Self::new()
    }
}

fn strip_hop_by_hop(mut headers: HeaderMap) -> HeaderMap {
    for name in HOP_BY_HOP {
        if let Ok(name) = name.parse::<HeaderName>() {
            headers.remove(name);
        }
    }
    headers
}

pub type StreamedBytes = Result<Bytes, std::io::Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_adapter_prefix_and_keeps_remainder() {
        let uri: Uri = "/adapters/a1/mcp?x=1".parse().unwrap();
        assert_eq!(ReverseProxy::rewrite_target("http://backend:8000", &uri), "http://backend:8000/mcp?x=1");
    }

    #[test]
    fn appends_trailing_slash_for_messages_path() {
        let uri: Uri = "/adapters/a1/sse/messages".parse().unwrap();
        assert_eq!(ReverseProxy::rewrite_target("http://backend:8000", &uri), "http://backend:8000/sse/messages/");
    }

    #[test]
    fn empty_remainder_becomes_root() {
        let uri: Uri = "/adapters/a1".parse().unwrap();
        assert_eq!(ReverseProxy::rewrite_target("http://backend:8000", &uri), "http://backend:8000/");
    }

    #[test]
    fn root_target_always_hits_the_toolgateway_rpc_route() {
        let uri: Uri = "/mcp".parse().unwrap();
        assert_eq!(ReverseProxy::root_target("http://toolgateway:443", &uri), "http://toolgateway:443/mcp/rpc");
    }

    #[test]
    fn root_target_preserves_query_string() {
        let uri: Uri = "/mcp?x=1".parse().unwrap();
        assert_eq!(ReverseProxy::root_target("http://toolgateway:443", &uri), "http://toolgateway:443/mcp/rpc?x=1");
    }
}
