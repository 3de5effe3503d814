use axum::http::StatusCode;
use thiserror::Error;

use super::claims::ClaimsError;
use super::decision::{CheckDecision, RpcCode};

/// Why a token failed verification. Only traced, never returned to the caller.
#[derive(Debug, Error)]
pub enum VerifyError {
    #[error(transparent)]
    Jwt(#[from] jsonwebtoken::errors::Error),
    #[error(transparent)]
    Claims(#[from] ClaimsError),
}

/// Every way a check can fail. Each variant maps to exactly one Deny.
#[derive(Debug, Error)]
pub enum CheckError {
    #[error("missing authorization header")]
    MissingAuthorization,
    #[error("authorization header is not a bearer token")]
    InvalidTokenType,
    #[error("configured public key is not a valid RSA PEM")]
    InvalidPublicKey,
    #[error("token verification failed: {0}")]
    Unauthorized(#[from] VerifyError),
    #[error("cannot serialize claims: {0}")]
    ClaimsEncoding(#[source] serde_json::Error),
}

impl CheckError {
    /// Client faults are 401, configuration faults are 503 / INTERNAL.
    pub fn into_decision(self) -> CheckDecision {
        let (rpc_code, status, body) = match self {
            CheckError::MissingAuthorization => (
                RpcCode::Unauthenticated,
                StatusCode::UNAUTHORIZED,
                "Unauthenticated",
            ),
            CheckError::InvalidTokenType => (
                RpcCode::PermissionDenied,
                StatusCode::UNAUTHORIZED,
                "Invalid access token type",
            ),
            CheckError::InvalidPublicKey => (
                RpcCode::Internal,
                StatusCode::SERVICE_UNAVAILABLE,
                "Invalid public key",
            ),
            CheckError::Unauthorized(_) => (
                RpcCode::PermissionDenied,
                StatusCode::UNAUTHORIZED,
                "Unauthorized",
            ),
            CheckError::ClaimsEncoding(_) => (
                RpcCode::Internal,
                StatusCode::SERVICE_UNAVAILABLE,
                "Cannot convert claims to JSON",
            ),
        };

        CheckDecision::deny(rpc_code, status, body)
    }
}
