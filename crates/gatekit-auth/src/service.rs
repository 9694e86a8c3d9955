//! Authentication service — the surface the transport layer calls.

use gatekit_core::error::{GatekitError, GatekitResult};
use gatekit_core::models::user::CreateUser;
use gatekit_core::repository::{TokenStore, UserRepository};
use tracing::info;

use crate::config::AuthConfig;
use crate::error::AuthError;
use crate::password;
use crate::session::{AccessContext, SessionManager};
use crate::token::TokenPair;

/// Ties credential verification to the session lifecycle.
///
/// Generic over the user repository and the token store so the auth
/// layer carries no dependency on any particular backend.
pub struct AuthService<U: UserRepository, S: TokenStore> {
    user_repo: U,
    sessions: SessionManager<S>,
    config: AuthConfig,
}

impl<U: UserRepository, S: TokenStore> AuthService<U, S> {
    pub fn new(user_repo: U, store: S, config: AuthConfig) -> Self {
        Self {
            user_repo,
            sessions: SessionManager::new(store, config.clone()),
            config,
        }
    }

    /// Sign in with email + password and issue a token pair.
    ///
    /// An unknown email is registered on the spot: the password is
    /// hashed, the user created, and a session issued. A known email
    /// with a wrong password fails with invalid credentials. Signing
    /// in again while a refresh window is open returns the existing
    /// pair (see [`SessionManager::issue`]).
    pub async fn sign_in(&self, email: &str, password: &str) -> GatekitResult<TokenPair> {
        let pepper = self.config.pepper.as_deref();

        match self.user_repo.get_by_email(email).await {
            Ok(user) => {
                let valid = password::verify_password(password, &user.password_hash, pepper)
                    .map_err(GatekitError::from)?;
                if !valid {
                    return Err(AuthError::InvalidCredentials.into());
                }
            }
            Err(GatekitError::NotFound { .. }) => {
                let password_hash =
                    password::hash_password(password, pepper).map_err(GatekitError::from)?;
                self.user_repo
                    .create(CreateUser {
                        email: email.to_owned(),
                        password_hash,
                    })
                    .await?;
                info!(email, "registered new user at sign-in");
            }
            Err(e) => return Err(e),
        }

        self.sessions.issue(email).await.map_err(Into::into)
    }

    /// Authenticate a protected request from a raw access token.
    pub async fn authenticate(&self, raw_access_token: &str) -> GatekitResult<AccessContext> {
        self.sessions
            .verify_request(raw_access_token)
            .await
            .map_err(Into::into)
    }

    /// Rotate a token pair from a raw refresh token.
    pub async fn refresh_pair(&self, raw_refresh_token: &str) -> GatekitResult<TokenPair> {
        self.sessions
            .refresh(raw_refresh_token)
            .await
            .map_err(Into::into)
    }

    /// Sign out the session bound to `access_session_id`.
    pub async fn sign_out(&self, access_session_id: &str) -> GatekitResult<()> {
        self.sessions
            .revoke(access_session_id)
            .await
            .map_err(Into::into)
    }

    /// The underlying session manager, for callers that need the
    /// finer-grained error taxonomy.
    pub fn sessions(&self) -> &SessionManager<S> {
        &self.sessions
    }
}
