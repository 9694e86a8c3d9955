//! Session lifecycle over the ephemeral token store.
//!
//! One active session per identity is materialized as five
//! cross-referenced store entries:
//!
//! | key                       | value          | ttl     |
//! |---------------------------|----------------|---------|
//! | `"<email>_td"`            | TokenPair JSON | access  |
//! | `access_uuid`             | email          | access  |
//! | `refresh_uuid`            | email          | refresh |
//! | `"<refresh_uuid>_access"` | access_uuid    | refresh |
//! | `"<access_uuid>_refresh"` | refresh_uuid   | refresh |
//!
//! The two cross-links exist exactly as long as the pair has been
//! neither rotated nor revoked; their absence is what makes refresh
//! tokens single-use. Writes and deletes of the five keys are not
//! transactional — partial failures are logged with the keys involved
//! and never rolled back.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use gatekit_core::error::GatekitError;
use gatekit_core::repository::TokenStore;
use parking_lot::Mutex;
use tokio::sync::Mutex as AsyncMutex;
use tracing::{error, warn};

use crate::config::AuthConfig;
use crate::error::AuthError;
use crate::token::{self, TokenPair};

/// Identity and session handle extracted from a verified, live access
/// token. Exists only for the duration of one request.
#[derive(Debug, Clone)]
pub struct AccessContext {
    pub session_id: String,
    pub email: String,
}

/// Orchestrates the token codec and the token store.
///
/// Holds a per-identity lock so the read-then-write in [`issue`]
/// (and the delete-then-write in [`refresh`]) is serialized per
/// identity; operations on different identities do not contend.
///
/// [`issue`]: SessionManager::issue
/// [`refresh`]: SessionManager::refresh
pub struct SessionManager<S: TokenStore> {
    store: S,
    config: AuthConfig,
    identity_locks: Mutex<HashMap<String, Arc<AsyncMutex<()>>>>,
}

fn pair_key(email: &str) -> String {
    format!("{email}_td")
}

fn access_link_key(refresh_uuid: &str) -> String {
    format!("{refresh_uuid}_access")
}

fn refresh_link_key(access_uuid: &str) -> String {
    format!("{access_uuid}_refresh")
}

fn store_err(e: GatekitError) -> AuthError {
    AuthError::StoreUnavailable(e.to_string())
}

fn ttl_from(expires_at: i64, now: i64) -> Duration {
    Duration::from_secs(expires_at.saturating_sub(now).max(0) as u64)
}

impl<S: TokenStore> SessionManager<S> {
    pub fn new(store: S, config: AuthConfig) -> Self {
        Self {
            store,
            config,
            identity_locks: Mutex::new(HashMap::new()),
        }
    }

    /// Issue a token pair for `email`.
    ///
    /// Idempotent within the refresh window: if a stored pair for this
    /// identity still has a live refresh expiry, it is returned
    /// unchanged instead of minting a duplicate concurrent session.
    pub async fn issue(&self, email: &str) -> Result<TokenPair, AuthError> {
        let lock = self.identity_lock(email);
        let _guard = lock.lock().await;

        if let Some(pair) = self.live_pair(email).await? {
            return Ok(pair);
        }

        let pair = token::mint_pair(email, &self.config)?;
        self.persist(email, &pair).await?;
        Ok(pair)
    }

    /// Authenticate one protected request.
    ///
    /// Codec verification alone is not sufficient — logout must take
    /// effect before natural expiry, so the store lookup of the
    /// session identifier is the authority on liveness.
    pub async fn verify_request(&self, raw_access_token: &str) -> Result<AccessContext, AuthError> {
        let claims = token::verify_access(raw_access_token, &self.config).inspect_err(|e| {
            if matches!(e, AuthError::InvalidSignature) {
                warn!("access token rejected: invalid signature (possible forgery)");
            }
        })?;

        let Some(email) = self
            .store
            .get(&claims.access_uuid)
            .await
            .map_err(store_err)?
        else {
            return Err(AuthError::InvalidSession);
        };

        Ok(AccessContext {
            session_id: claims.access_uuid,
            email,
        })
    }

    /// Rotate a token pair: consume the refresh token, tear down the
    /// old record set, and mint a replacement.
    ///
    /// Refresh tokens are single-use — once the cross-link under
    /// `"<refresh_uuid>_access"` is gone the token is dead, even if
    /// its signature and expiry still check out. A store failure after
    /// teardown but before the new pair is persisted leaves the
    /// identity with no session; the caller must re-authenticate.
    pub async fn refresh(&self, raw_refresh_token: &str) -> Result<TokenPair, AuthError> {
        let claims = token::verify_refresh(raw_refresh_token, &self.config).inspect_err(|e| {
            if matches!(e, AuthError::InvalidSignature) {
                warn!("refresh token rejected: invalid signature (possible forgery)");
            }
        })?;

        let lock = self.identity_lock(&claims.email);
        let _guard = lock.lock().await;

        let access_uuid = self
            .store
            .get(&access_link_key(&claims.refresh_uuid))
            .await
            .map_err(store_err)?
            .ok_or(AuthError::InvalidSession)?;

        self.remove_all(&[
            claims.refresh_uuid.clone(),
            access_uuid.clone(),
            access_link_key(&claims.refresh_uuid),
            refresh_link_key(&access_uuid),
            pair_key(&claims.email),
        ])
        .await?;

        // Always a brand-new pair on this path — no idempotent reuse.
        let pair = token::mint_pair(&claims.email, &self.config)?;
        self.persist(&claims.email, &pair).await?;
        Ok(pair)
    }

    /// Revoke the session bound to `access_session_id` (logout).
    ///
    /// Linkage recovery is best-effort: whatever cross-links are still
    /// readable decide which of the five keys get removed. Removing an
    /// absent key succeeds, so repeating a revocation is safe and
    /// converges to fully-revoked.
    pub async fn revoke(&self, access_session_id: &str) -> Result<(), AuthError> {
        let refresh_uuid = match self.store.get(&refresh_link_key(access_session_id)).await {
            Ok(value) => value,
            Err(e) => {
                warn!(error = %e, "revoke: refresh cross-link unreadable, continuing");
                None
            }
        };
        let email = match self.store.get(access_session_id).await {
            Ok(value) => value,
            Err(e) => {
                warn!(error = %e, "revoke: identity record unreadable, continuing");
                None
            }
        };

        let mut keys = vec![
            access_session_id.to_owned(),
            refresh_link_key(access_session_id),
        ];
        if let Some(refresh_uuid) = &refresh_uuid {
            keys.push(refresh_uuid.clone());
            keys.push(access_link_key(refresh_uuid));
        }
        if let Some(email) = &email {
            keys.push(pair_key(email));
        }

        self.remove_all(&keys).await
    }

    fn identity_lock(&self, email: &str) -> Arc<AsyncMutex<()>> {
        let mut locks = self.identity_locks.lock();
        locks.entry(email.to_owned()).or_default().clone()
    }

    /// Return the stored pair for `email` if its refresh window is
    /// still open.
    async fn live_pair(&self, email: &str) -> Result<Option<TokenPair>, AuthError> {
        let Some(raw) = self.store.get(&pair_key(email)).await.map_err(store_err)? else {
            return Ok(None);
        };
        let Ok(pair) = serde_json::from_str::<TokenPair>(&raw) else {
            warn!(email, "dropping undecodable stored token pair");
            return Ok(None);
        };
        if pair.refresh_expired != 0 && pair.refresh_expired > Utc::now().timestamp() {
            Ok(Some(pair))
        } else {
            Ok(None)
        }
    }

    /// Write the five-entry record set for a freshly minted pair.
    ///
    /// Liveness entries go first and the two cross-links last; the
    /// verification path depends only on the first three, which keeps
    /// the partial-write window as small as the store allows.
    async fn persist(&self, email: &str, pair: &TokenPair) -> Result<(), AuthError> {
        let now = Utc::now().timestamp();
        let access_ttl = ttl_from(pair.access_expired, now);
        let refresh_ttl = ttl_from(pair.refresh_expired, now);
        let record = serde_json::to_string(pair)
            .map_err(|e| AuthError::StoreUnavailable(format!("serialize session record: {e}")))?;

        let entries = [
            (pair_key(email), record, access_ttl),
            (pair.access_uuid.clone(), email.to_owned(), access_ttl),
            (pair.refresh_uuid.clone(), email.to_owned(), refresh_ttl),
            (
                access_link_key(&pair.refresh_uuid),
                pair.access_uuid.clone(),
                refresh_ttl,
            ),
            (
                refresh_link_key(&pair.access_uuid),
                pair.refresh_uuid.clone(),
                refresh_ttl,
            ),
        ];

        let mut written: Vec<&str> = Vec::with_capacity(entries.len());
        for (key, value, ttl) in &entries {
            if let Err(e) = self.store.put(key, value.clone(), *ttl).await {
                error!(
                    email,
                    failed_key = %key,
                    written = ?written,
                    error = %e,
                    "partial session record write, entries already written are not rolled back"
                );
                return Err(AuthError::StoreUnavailable(format!("write {key}: {e}")));
            }
            written.push(key);
        }
        Ok(())
    }

    /// Remove every key in `keys`, attempting all of them even after a
    /// failure. Reports which removals failed; nothing is restored.
    async fn remove_all(&self, keys: &[String]) -> Result<(), AuthError> {
        let mut failed: Vec<String> = Vec::new();
        for key in keys {
            if let Err(e) = self.store.remove(key).await {
                warn!(failed_key = %key, error = %e, "session record removal failed");
                failed.push(key.clone());
            }
        }
        if failed.is_empty() {
            Ok(())
        } else {
            Err(AuthError::StoreUnavailable(format!(
                "failed to remove keys: {}",
                failed.join(", ")
            )))
        }
    }
}
