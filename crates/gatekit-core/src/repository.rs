//! Trait definitions for data access abstraction.
//!
//! The auth layer depends only on these interfaces: a relational user
//! store and an ephemeral key-value token store with per-key expiry.
//! Both are injected dependencies — nothing in the core reaches a
//! process-wide singleton.

use std::time::Duration;

use crate::error::GatekitResult;
use crate::models::user::{CreateUser, User};

pub trait UserRepository: Send + Sync {
    fn create(&self, input: CreateUser) -> impl Future<Output = GatekitResult<User>> + Send;
    fn get_by_email(&self, email: &str) -> impl Future<Output = GatekitResult<User>> + Send;
}

/// Ephemeral key-value store with per-key TTL eviction.
///
/// Last write wins per key. `get` on an absent or expired key returns
/// `None`, never an error; `remove` of an absent key succeeds. The
/// store has no knowledge of session semantics — cross-link
/// bookkeeping is owned entirely by the session manager.
pub trait TokenStore: Send + Sync {
    fn put(
        &self,
        key: &str,
        value: String,
        ttl: Duration,
    ) -> impl Future<Output = GatekitResult<()>> + Send;
    fn get(&self, key: &str) -> impl Future<Output = GatekitResult<Option<String>>> + Send;
    fn remove(&self, key: &str) -> impl Future<Output = GatekitResult<()>> + Send;
}
