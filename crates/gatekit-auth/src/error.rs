//! Authentication error taxonomy.
//!
//! Token-facing failures split into four classes with distinct
//! handling: `Malformed` and `InvalidSignature` are client faults that
//! must never be retried, `Expired` asks the client to refresh or
//! re-authenticate, and `InvalidSession` is the revocation/rotation
//! signal — a cryptographically valid token whose liveness record is
//! gone from the store.

use gatekit_core::error::GatekitError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("invalid credentials")]
    InvalidCredentials,

    #[error("malformed token: {0}")]
    Malformed(String),

    #[error("invalid token signature")]
    InvalidSignature,

    #[error("token has expired")]
    Expired,

    #[error("no live session for token")]
    InvalidSession,

    #[error("token store unavailable: {0}")]
    StoreUnavailable(String),

    #[error("cryptography error: {0}")]
    Crypto(String),
}

impl From<AuthError> for GatekitError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::InvalidCredentials
            | AuthError::Malformed(_)
            | AuthError::InvalidSignature
            | AuthError::Expired
            | AuthError::InvalidSession => GatekitError::AuthenticationFailed {
                reason: err.to_string(),
            },
            AuthError::StoreUnavailable(msg) => GatekitError::Store(msg),
            AuthError::Crypto(msg) => GatekitError::Crypto(msg),
        }
    }
}
