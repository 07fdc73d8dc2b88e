// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! Identity Forwarding (C10) — well-known header names carrying a principal
//! between internal hops, and the dev-mode equivalents. Headers from
//! untrusted clients must be stripped at the edge; only intra-cluster hops
//! may supply `X_MCP_*`. Parsing itself is transport-agnostic: it takes
//! plain string values, not a framework's header-map type.

use async_trait::async_trait;

use crate::domain::permission::Principal;

pub const X_MCP_USER_ID: &str = "x-mcp-userid";
pub const X_MCP_USER_NAME: &str = "x-mcp-username";
pub const X_MCP_ROLES: &str = "x-mcp-roles";

pub const X_DEV_USER_ID: &str = "x-dev-userid";
pub const X_DEV_NAME: &str = "x-dev-name";
pub const X_DEV_ROLES: &str = "x-dev-roles";

/// Reconstructs a principal from forwarded-identity header values (no
/// identity-provider handshake on this hop).
pub fn principal_from_forwarded(user_id: Option<&str>, roles_csv: Option<&str>) -> Option<Principal> {
    let user_id = user_id?.trim();
    if user_id.is_empty() {
        return None;
    }
    Some(Principal::new(user_id, split_roles(roles_csv)))
}

fn split_roles(roles_csv: Option<&str>) -> Vec<String> {
    roles_csv
        .unwrap_or_default()
        .split(',')
        .map(|r| r.trim().to_string())
        .filter(|r| !r.is_empty())
        .collect()
}

#[derive(Debug, thiserror::Error)]
pub enum IdentityError {
    #[error("invalid or expired bearer token: {0}")]
    InvalidToken(String),
    #[error("missing bearer token")]
    MissingToken,
}

/// Verifies a bearer token against the configured identity provider and
/// reconstructs the calling [`Principal`] (§4.10, §6.3
/// `identityProvider.{issuer,audience,tenantId,clientId}` — "token-verifier
/// parameters consumed by an external collaborator"). This is the *only*
/// identity-establishment path the edge-facing gateway may trust in
/// production: `X_MCP_*` forwarded headers are for intra-cluster hops only
/// (see [`principal_from_forwarded`]) and must never reach this trait.
#[async_trait]
pub trait TokenValidator: Send + Sync {
    async fn validate(&self, bearer_token: &str) -> Result<Principal, IdentityError>;
}

/// Extracts the token from an `Authorization: Bearer <token>` header value.
pub fn bearer_token(header_value: Option<&str>) -> Option<&str> {
    header_value?.strip_prefix("Bearer ").map(str::trim).filter(|t| !t.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reconstructs_principal_from_headers() {
        let p = principal_from_forwarded(Some("u1"), Some("reader, mcp.admin")).unwrap();
        assert_eq!(p.user_id, "u1");
        assert!(p.is_admin());
        assert!(p.roles.contains("reader"));
    }

    #[test]
    fn missing_user_id_yields_no_principal() {
        assert!(principal_from_forwarded(None, Some("reader")).is_none());
        assert!(principal_from_forwarded(Some("  "), Some("reader")).is_none());
    }

    #[test]
    fn bearer_token_strips_scheme() {
        assert_eq!(bearer_token(Some("Bearer abc.def.ghi")), Some("abc.def.ghi"));
    }

    #[test]
    fn bearer_token_rejects_missing_or_wrong_scheme() {
        assert_eq!(bearer_token(None), None);
        assert_eq!(bearer_token(Some("abc.def.ghi")), None);
        assert_eq!(bearer_token(Some("Bearer ")), None);
    }
}
