//! Distributed mutual exclusion over the shared store.
//!
//! The lock is a general primitive, independent of the cache layer. A lock
//! record is created by an atomic set-if-absent carrying the owner's token
//! and a TTL, and destroyed either by an ownership-checked compare-and-delete
//! or by passive expiry if the holder never releases it.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, error};
use uuid::Uuid;

use crate::store::KeyValueStore;

/// Retry policy and TTL for lock acquisition.
#[derive(Debug, Clone)]
pub struct LockConfig {
    /// How long a held lock survives without release.
    pub ttl: Duration,
    /// Additional attempts after the first failed acquisition.
    pub retry_count: u32,
    /// Fixed sleep between attempts.
    pub backoff: Duration,
}

impl Default for LockConfig {
    fn default() -> Self {
        Self {
            ttl: Duration::from_secs(30),
            retry_count: 3,
            backoff: Duration::from_millis(500),
        }
    }
}

/// Opaque identifier proving which acquisition attempt holds a lock.
///
/// Must be unique per acquisition attempt; release only succeeds when the
/// presented token matches the one stored at acquisition time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OwnerToken(String);

impl OwnerToken {
    /// Generates a fresh unique token.
    pub fn generate() -> Self {
        Self(Uuid::now_v7().to_string())
    }

    /// Wraps a caller-supplied token value.
    pub fn from_value(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Returns the token value.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for OwnerToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Distributed lock backed by a [`KeyValueStore`].
///
/// Correctness depends entirely on the store's set-if-absent and
/// compare-and-delete being atomic per key.
pub struct DistributedLock {
    store: Arc<dyn KeyValueStore>,
    config: LockConfig,
}

impl DistributedLock {
    /// Creates a lock with the process-wide default policy.
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self::with_config(store, LockConfig::default())
    }

    /// Creates a lock with an explicit policy.
    pub fn with_config(store: Arc<dyn KeyValueStore>, config: LockConfig) -> Self {
        Self { store, config }
    }

    /// Returns the configured policy.
    pub fn config(&self) -> &LockConfig {
        &self.config
    }

    /// Tries to acquire `key` for `token` under the default policy.
    ///
    /// Retries with a fixed backoff up to the configured count; returns
    /// false once retries are exhausted. Never returns an error: store
    /// failures are logged and count as failed attempts.
    pub async fn acquire(&self, key: &str, token: &OwnerToken) -> bool {
        self.acquire_with(key, token, &self.config).await
    }

    /// Tries to acquire `key` for `token` under a per-call policy.
    pub async fn acquire_with(&self, key: &str, token: &OwnerToken, config: &LockConfig) -> bool {
        let mut retries_left = config.retry_count;
        loop {
            if self.try_acquire(key, token, config.ttl).await {
                return true;
            }
            if retries_left == 0 {
                debug!(key, "lock acquisition exhausted retries");
                return false;
            }
            retries_left -= 1;
            debug!(key, retries_left, "lock busy, retrying");
            tokio::time::sleep(config.backoff).await;
        }
    }

    async fn try_acquire(&self, key: &str, token: &OwnerToken, ttl: Duration) -> bool {
        match self.store.set_if_absent(key, token.as_str(), ttl).await {
            Ok(acquired) => acquired,
            Err(e) => {
                error!(key, error = %e, "lock acquire failed against store");
                false
            }
        }
    }

    /// Releases `key` if it is currently held by `token`.
    ///
    /// Release by a non-owner is a no-op returning false: a holder whose TTL
    /// already expired must never delete a lock some other process has since
    /// acquired.
    pub async fn release(&self, key: &str, token: &OwnerToken) -> bool {
        match self.store.compare_and_delete(key, token.as_str()).await {
            Ok(released) => {
                if !released {
                    debug!(key, "release skipped, lock not held by this token");
                }
                released
            }
            Err(e) => {
                error!(key, error = %e, "lock release failed against store");
                false
            }
        }
    }
}
