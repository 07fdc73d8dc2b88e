// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! Identity Forwarding middleware (C10) for the edge-facing main gateway.
//! Establishes the [`Principal`] for every request before it reaches its
//! handler; rejects requests that carry none.
//!
//! §4.10: "Headers from untrusted clients must be stripped at the edge;
//! only intra-cluster hops may supply them." This middleware runs at the
//! edge, so outside `development.mode` it *only* accepts a validated
//! `Authorization: Bearer` token through [`TokenValidator`] — it never reads
//! `X_MCP_*` forwarded-identity headers, those are for the toolgateway's own
//! intra-cluster hop (see [`crate::presentation::mcp_server`]).
//! `development.mode` swaps in `X-Dev-*` headers so a developer can drive the
//! API without standing up an identity-provider handshake.

use std::sync::Arc;

use axum::extract::{Request, State};
use axum::http::{HeaderMap, StatusCode};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};

use crate::domain::identity::{bearer_token, principal_from_forwarded, X_DEV_ROLES, X_DEV_USER_ID};
use crate::domain::permission::Principal;
use crate::presentation::api::AppState;

fn header_str<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers.get(name).and_then(|v| v.to_str().ok())
}

pub async fn require_principal(
    State(state): State<Arc<AppState>>,
    mut request: Request,
    next: Next,
) -> Response {
    let principal = if state.development_mode {
        let headers = request.headers();
        principal_from_forwarded(header_str(headers, X_DEV_USER_ID), header_str(headers, X_DEV_ROLES))
    } else {
        match edge_principal(&state, request.headers()).await {
            Ok(principal) => Some(principal),
            Err(response) => return response,
        }
    };

    match principal {
        Some(principal) => {
            request.extensions_mut().insert(principal);
            next.run(request).await
        }
        None => (StatusCode::UNAUTHORIZED, "missing forwarded identity").into_response(),
    }
}

/// Validates the caller's bearer token. Never falls back to forwarded
/// headers — a production deployment with no [`AppState::token_validator`]
/// configured rejects every request rather than trusting the edge.
async fn edge_principal(state: &AppState, headers: &HeaderMap) -> Result<Principal, Response> {
    let Some(validator) = &state.token_validator else {
        tracing::error!("no token validator configured outside development mode; rejecting request");
        return Err((StatusCode::UNAUTHORIZED, "identity provider not configured").into_response());
    };

    let auth_header = headers.get(axum::http::header::AUTHORIZATION).and_then(|v| v.to_str().ok());
    let Some(token) = bearer_token(auth_header) else {
        return Err((StatusCode::UNAUTHORIZED, "missing bearer token").into_response());
    };

    validator
        .validate(token)
        .await
        .map_err(|e| (StatusCode::UNAUTHORIZED, format!("invalid bearer token: {e}")).into_response())
}
