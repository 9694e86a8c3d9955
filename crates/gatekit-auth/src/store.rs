//! In-memory ephemeral token store.
//!
//! A mapping from opaque string keys to string values with per-key
//! TTL. Expiry is enforced twice: lazily — `get` never returns an
//! entry whose deadline has passed — and by a background sweep task
//! that physically drops expired entries. The store knows nothing
//! about session semantics; it only evicts on time.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use gatekit_core::error::GatekitResult;
use gatekit_core::repository::TokenStore;
use parking_lot::RwLock;
use tokio::sync::watch;
use tokio::time::sleep;

/// Default sweep cadence: 8 minutes.
pub const DEFAULT_SWEEP_INTERVAL: Duration = Duration::from_secs(8 * 60);

struct Entry {
    value: String,
    expires_at: Instant,
}

impl Entry {
    fn is_expired(&self, now: Instant) -> bool {
        // `expires_at <= now` so that a zero TTL is expired on the
        // very next read.
        self.expires_at <= now
    }
}

/// Holds the shutdown signal sender. When dropped, the watch channel
/// closes and the sweep task exits.
struct ShutdownGuard {
    shutdown_tx: watch::Sender<()>,
}

impl Drop for ShutdownGuard {
    fn drop(&mut self) {
        // Best-effort; the receiver may already be gone.
        let _ = self.shutdown_tx.send(());
    }
}

/// In-memory [`TokenStore`] implementation.
///
/// Cheaply cloneable via [`Arc`]; all clones share the same entries.
/// The sweep task stops automatically when the last clone drops.
#[derive(Clone)]
pub struct MemoryTokenStore {
    entries: Arc<RwLock<HashMap<String, Entry>>>,
    _shutdown_guard: Arc<ShutdownGuard>,
}

impl MemoryTokenStore {
    /// Create a store sweeping at [`DEFAULT_SWEEP_INTERVAL`].
    ///
    /// Must be called from within a tokio runtime — the sweep task is
    /// spawned immediately.
    pub fn new() -> Self {
        Self::with_sweep_interval(DEFAULT_SWEEP_INTERVAL)
    }

    /// Create a store with an explicit sweep cadence.
    pub fn with_sweep_interval(interval: Duration) -> Self {
        let (shutdown_tx, mut shutdown_rx) = watch::channel(());
        let entries: Arc<RwLock<HashMap<String, Entry>>> = Arc::new(RwLock::new(HashMap::new()));

        let sweep_entries = Arc::clone(&entries);
        tokio::spawn(async move {
            loop {
                tokio::select! {
                    _ = sleep(interval) => {
                        let now = Instant::now();
                        sweep_entries.write().retain(|_, entry| !entry.is_expired(now));
                    }
                    _ = shutdown_rx.changed() => break,
                }
            }
        });

        Self {
            entries,
            _shutdown_guard: Arc::new(ShutdownGuard { shutdown_tx }),
        }
    }

    /// Physical entry count, including expired entries the sweep has
    /// not yet collected.
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for MemoryTokenStore {
    fn default() -> Self {
        Self::new()
    }
}

impl TokenStore for MemoryTokenStore {
    async fn put(&self, key: &str, value: String, ttl: Duration) -> GatekitResult<()> {
        let entry = Entry {
            value,
            expires_at: Instant::now() + ttl,
        };
        self.entries.write().insert(key.to_owned(), entry);
        Ok(())
    }

    async fn get(&self, key: &str) -> GatekitResult<Option<String>> {
        let now = Instant::now();
        let entries = self.entries.read();
        Ok(entries
            .get(key)
            .filter(|entry| !entry.is_expired(now))
            .map(|entry| entry.value.clone()))
    }

    async fn remove(&self, key: &str) -> GatekitResult<()> {
        self.entries.write().remove(key);
        Ok(())
    }
}
