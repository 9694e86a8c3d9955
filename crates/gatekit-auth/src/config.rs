//! Authentication configuration.

use std::env;

/// Configuration for the authentication service.
///
/// The two signing secrets are independent by design: an access token
/// can never be verified with the refresh secret or vice versa.
#[derive(Debug, Clone)]
pub struct AuthConfig {
    /// HMAC secret for signing/verifying access tokens.
    pub access_token_secret: String,
    /// HMAC secret for signing/verifying refresh tokens.
    pub refresh_token_secret: String,
    /// Access token lifetime in seconds (default: 1800 = 30 minutes).
    pub access_token_lifetime_secs: u64,
    /// Refresh token lifetime in seconds (default: 604_800 = 7 days).
    pub refresh_token_lifetime_secs: u64,
    /// Optional pepper appended to passwords before Argon2id hashing
    /// and verification.
    pub pepper: Option<String>,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            access_token_secret: String::new(),
            refresh_token_secret: String::new(),
            access_token_lifetime_secs: 1800,
            refresh_token_lifetime_secs: 604_800,
            pepper: None,
        }
    }
}

impl AuthConfig {
    /// Build a config from the deployment environment.
    ///
    /// Missing secrets are left empty — the caller decides whether an
    /// empty secret is acceptable (it is not, outside of tests).
    pub fn from_env() -> Self {
        Self {
            access_token_secret: env::var("ACCESS_TOKEN_SECRET").unwrap_or_default(),
            refresh_token_secret: env::var("REFRESH_TOKEN_SECRET").unwrap_or_default(),
            pepper: env::var("PASSWORD_SALT").ok(),
            ..Self::default()
        }
    }
}
