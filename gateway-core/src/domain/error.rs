// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! Gateway-wide error type.
//!
//! One variant per failure kind named in the control-plane error design:
//! validation, conflict, not-found, forbidden, upstream failure, and
//! service-unavailable. `IntoResponse` (presentation layer) maps each to its
//! HTTP status; nothing here knows about HTTP.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("validation failed: {0}")]
    ValidationFailure(String),

    #[error("{0}")]
    Conflict(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("forbidden")]
    Forbidden,

    #[error("upstream failed: {0}")]
    UpstreamFailed(String),

    #[error("service unavailable: {0}")]
    ServiceUnavailable(String),
}

impl From<crate::domain::repository::RepositoryError> for GatewayError {
    fn from(err: crate::domain::repository::RepositoryError) -> Self {
        use crate::domain::repository::RepositoryError as R;
        match err {
            R::NotFound(msg) => GatewayError::NotFound(msg),
            R::BackendUnavailable(msg) => GatewayError::UpstreamFailed(msg),
            R::Serialization(msg) => GatewayError::UpstreamFailed(msg),
        }
    }
}

impl From<crate::domain::deployment::DeploymentError> for GatewayError {
    fn from(err: crate::domain::deployment::DeploymentError) -> Self {
        use crate::domain::deployment::DeploymentError as D;
        match err {
            D::UpstreamFailed(msg) => GatewayError::UpstreamFailed(msg),
        }
    }
}
