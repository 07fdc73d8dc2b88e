// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! JWT-backed [`TokenValidator`] — the edge-facing identity provider
//! integration (§4.10, §6.3), grounded on the teacher's
//! `infrastructure::smcp::signature::ContextTokenVerifier`: an RS256
//! `DecodingKey` plus `jsonwebtoken::Validation` checked against the
//! configured issuer/audience.

use async_trait::async_trait;
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::Deserialize;

use crate::domain::identity::{IdentityError, TokenValidator};
use crate::domain::permission::Principal;

#[derive(Debug, Deserialize)]
struct GatewayClaims {
    sub: String,
    #[serde(default)]
    roles: Vec<String>,
}

pub struct JwtTokenValidator {
    decoding_key: DecodingKey,
    validation: Validation,
}

impl JwtTokenValidator {
    pub fn new(public_key_pem: &str, issuer: &str, audience: &str) -> anyhow::Result<Self> {
        let decoding_key = DecodingKey::from_rsa_pem(public_key_pem.as_bytes())?;
        let mut validation = Validation::new(Algorithm::RS256);
        validation.set_required_spec_claims(&["exp", "sub"]);
        validation.set_issuer(&[issuer]);
        validation.set_audience(&[audience]);
        Ok(Self { decoding_key, validation })
    }
}

#[async_trait]
impl TokenValidator for JwtTokenValidator {
    async fn validate(&self, bearer_token: &str) -> Result<Principal, IdentityError> {
        let token_data = decode::<GatewayClaims>(bearer_token, &self.decoding_key, &self.validation)
            .map_err(|e| IdentityError::InvalidToken(e.to_string()))?;
        Ok(Principal::new(token_data.claims.sub, token_data.claims.roles))
    }
}
