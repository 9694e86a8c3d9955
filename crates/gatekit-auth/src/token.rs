//! Signed token pair minting and verification.
//!
//! Access and refresh tokens are HS256 JWTs signed with independent
//! secrets. Claims are closed record types decoded with strict field
//! presence checks; the algorithm is pinned, so a token whose header
//! names anything but HS256 is rejected before its claims are looked
//! at. Expiry is checked explicitly with zero leeway: a token is valid
//! on the closed-open interval `[issued, exp)`.

use std::collections::HashSet;

use chrono::Utc;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config::AuthConfig;
use crate::error::AuthError;

/// Claims embedded in every access token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccessClaims {
    pub authorized: bool,
    /// Session identifier — the store key for this token's liveness
    /// record.
    pub access_uuid: String,
    /// Identity the session is bound to.
    pub email: String,
    /// Expiration (Unix timestamp, seconds).
    pub exp: i64,
}

/// Claims embedded in every refresh token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RefreshClaims {
    pub refresh_uuid: String,
    pub email: String,
    pub exp: i64,
}

/// One access token + one refresh token issued together, with
/// independent session identifiers and expiries.
///
/// `access_expired < refresh_expired` always holds with the default
/// lifetimes. The serialized form doubles as the store record under
/// `"<email>_td"`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
    pub access_uuid: String,
    pub refresh_uuid: String,
    /// Access expiry (Unix timestamp, seconds).
    pub access_expired: i64,
    /// Refresh expiry (Unix timestamp, seconds).
    pub refresh_expired: i64,
}

/// Mint a fresh token pair for `email` with random session identifiers
/// and lifetimes taken from `config`.
pub fn mint_pair(email: &str, config: &AuthConfig) -> Result<TokenPair, AuthError> {
    let now = Utc::now().timestamp();
    let access_expired = now + config.access_token_lifetime_secs as i64;
    let refresh_expired = now + config.refresh_token_lifetime_secs as i64;
    let access_uuid = Uuid::new_v4().to_string();
    let refresh_uuid = Uuid::new_v4().to_string();

    let access_token = mint_access(email, &access_uuid, access_expired, config)?;
    let refresh_token = mint_refresh(email, &refresh_uuid, refresh_expired, config)?;

    Ok(TokenPair {
        access_token,
        refresh_token,
        access_uuid,
        refresh_uuid,
        access_expired,
        refresh_expired,
    })
}

/// Sign an access token carrying `{authorized, access_uuid, email, exp}`.
pub fn mint_access(
    email: &str,
    session_id: &str,
    expires_at: i64,
    config: &AuthConfig,
) -> Result<String, AuthError> {
    let claims = AccessClaims {
        authorized: true,
        access_uuid: session_id.to_owned(),
        email: email.to_owned(),
        exp: expires_at,
    };
    encode(&claims, &config.access_token_secret)
}

/// Sign a refresh token carrying `{refresh_uuid, email, exp}`.
pub fn mint_refresh(
    email: &str,
    session_id: &str,
    expires_at: i64,
    config: &AuthConfig,
) -> Result<String, AuthError> {
    let claims = RefreshClaims {
        refresh_uuid: session_id.to_owned(),
        email: email.to_owned(),
        exp: expires_at,
    };
    encode(&claims, &config.refresh_token_secret)
}

/// Verify an access token's signature and expiry and return its claims.
pub fn verify_access(token: &str, config: &AuthConfig) -> Result<AccessClaims, AuthError> {
    let claims: AccessClaims = decode(token, &config.access_token_secret)?;
    check_expiry(claims.exp)?;
    Ok(claims)
}

/// Verify a refresh token's signature and expiry and return its claims.
pub fn verify_refresh(token: &str, config: &AuthConfig) -> Result<RefreshClaims, AuthError> {
    let claims: RefreshClaims = decode(token, &config.refresh_token_secret)?;
    check_expiry(claims.exp)?;
    Ok(claims)
}

fn encode<T: Serialize>(claims: &T, secret: &str) -> Result<String, AuthError> {
    let key = EncodingKey::from_secret(secret.as_bytes());
    jsonwebtoken::encode(&Header::new(Algorithm::HS256), claims, &key)
        .map_err(|e| AuthError::Crypto(format!("JWT encode: {e}")))
}

fn decode<T: serde::de::DeserializeOwned>(token: &str, secret: &str) -> Result<T, AuthError> {
    let key = DecodingKey::from_secret(secret.as_bytes());

    // Pin the algorithm; expiry is validated by `check_expiry` so
    // that the boundary `exp == now` counts as expired.
    let mut validation = Validation::new(Algorithm::HS256);
    validation.validate_exp = false;
    validation.validate_aud = false;
    validation.required_spec_claims = HashSet::new();
    validation.leeway = 0;

    jsonwebtoken::decode::<T>(token, &key, &validation)
        .map(|data| data.claims)
        .map_err(|e| {
            use jsonwebtoken::errors::ErrorKind;
            // Expiry never surfaces here — exp validation is disabled
            // above and classified by `check_expiry` alone.
            match e.kind() {
                ErrorKind::InvalidSignature
                | ErrorKind::InvalidAlgorithm
                | ErrorKind::InvalidAlgorithmName
                | ErrorKind::MissingAlgorithm => AuthError::InvalidSignature,
                _ => AuthError::Malformed(e.to_string()),
            }
        })
}

fn check_expiry(exp: i64) -> Result<(), AuthError> {
    if exp <= Utc::now().timestamp() {
        return Err(AuthError::Expired);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config() -> AuthConfig {
        AuthConfig {
            access_token_secret: "access-secret-for-tests".into(),
            refresh_token_secret: "refresh-secret-for-tests".into(),
            ..AuthConfig::default()
        }
    }

    #[test]
    fn access_roundtrip() {
        let config = test_config();
        let exp = Utc::now().timestamp() + 60;
        let token = mint_access("u@x.com", "sid-123", exp, &config).unwrap();

        let claims = verify_access(&token, &config).unwrap();
        assert!(claims.authorized);
        assert_eq!(claims.access_uuid, "sid-123");
        assert_eq!(claims.email, "u@x.com");
        assert_eq!(claims.exp, exp);
    }

    #[test]
    fn refresh_roundtrip() {
        let config = test_config();
        let exp = Utc::now().timestamp() + 60;
        let token = mint_refresh("u@x.com", "sid-456", exp, &config).unwrap();

        let claims = verify_refresh(&token, &config).unwrap();
        assert_eq!(claims.refresh_uuid, "sid-456");
        assert_eq!(claims.email, "u@x.com");
    }

    #[test]
    fn pair_lifetimes_and_unique_session_ids() {
        let config = test_config();
        let now = Utc::now().timestamp();
        let pair = mint_pair("u@x.com", &config).unwrap();

        assert_ne!(pair.access_uuid, pair.refresh_uuid);
        assert!(pair.access_expired < pair.refresh_expired);
        assert!((pair.access_expired - now - 1800).abs() <= 2);
        assert!((pair.refresh_expired - now - 604_800).abs() <= 2);
    }

    #[test]
    fn wrong_secret_is_invalid_signature_not_malformed() {
        let config = test_config();
        let forger = AuthConfig {
            access_token_secret: "attacker-controlled".into(),
            ..test_config()
        };
        let exp = Utc::now().timestamp() + 60;

        // Valid claims re-signed with the wrong secret.
        let forged = mint_access("u@x.com", "sid-123", exp, &forger).unwrap();
        let err = verify_access(&forged, &config).unwrap_err();
        assert!(matches!(err, AuthError::InvalidSignature), "got {err:?}");
    }

    #[test]
    fn access_and_refresh_secrets_are_independent() {
        let config = test_config();
        let exp = Utc::now().timestamp() + 60;
        let access = mint_access("u@x.com", "sid-123", exp, &config).unwrap();

        let err = verify_refresh(&access, &config).unwrap_err();
        assert!(matches!(err, AuthError::InvalidSignature), "got {err:?}");
    }

    #[test]
    fn unexpected_algorithm_is_rejected() {
        let config = test_config();
        let claims = AccessClaims {
            authorized: true,
            access_uuid: "sid-123".into(),
            email: "u@x.com".into(),
            exp: Utc::now().timestamp() + 60,
        };
        let key = EncodingKey::from_secret(config.access_token_secret.as_bytes());
        let hs384 = jsonwebtoken::encode(&Header::new(Algorithm::HS384), &claims, &key).unwrap();

        let err = verify_access(&hs384, &config).unwrap_err();
        assert!(matches!(err, AuthError::InvalidSignature), "got {err:?}");
    }

    #[test]
    fn exp_equal_to_now_is_expired() {
        let config = test_config();
        let token = mint_access("u@x.com", "sid-123", Utc::now().timestamp(), &config).unwrap();

        let err = verify_access(&token, &config).unwrap_err();
        assert!(matches!(err, AuthError::Expired), "got {err:?}");
    }

    #[test]
    fn garbage_is_malformed() {
        let config = test_config();
        let err = verify_access("not-a-jwt", &config).unwrap_err();
        assert!(matches!(err, AuthError::Malformed(_)), "got {err:?}");
    }

    #[test]
    fn missing_claim_is_malformed() {
        let config = test_config();
        // Well-signed token missing `access_uuid`.
        let claims = serde_json::json!({
            "email": "u@x.com",
            "exp": Utc::now().timestamp() + 60,
        });
        let key = EncodingKey::from_secret(config.access_token_secret.as_bytes());
        let token = jsonwebtoken::encode(&Header::new(Algorithm::HS256), &claims, &key).unwrap();

        let err = verify_access(&token, &config).unwrap_err();
        assert!(matches!(err, AuthError::Malformed(_)), "got {err:?}");
    }

    #[test]
    fn token_pair_store_record_roundtrip() {
        let config = test_config();
        let pair = mint_pair("u@x.com", &config).unwrap();

        let json = serde_json::to_string(&pair).unwrap();
        let restored: TokenPair = serde_json::from_str(&json).unwrap();
        assert_eq!(restored.access_uuid, pair.access_uuid);
        assert_eq!(restored.refresh_expired, pair.refresh_expired);
    }
}
