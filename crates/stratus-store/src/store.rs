//! The shared key-value store contract.

use std::time::Duration;

use async_trait::async_trait;

use stratus_core::Result;

/// Contract over a shared, network-accessible key-value store.
///
/// Implementations must make `set_if_absent` and `compare_and_delete` atomic
/// per key; no cross-key transactions are assumed. Any operation may fail
/// with a transient [`stratus_core::StoreError`], which callers treat as
/// non-fatal: the cache controller fails open and the lock reports a failed
/// attempt.
///
/// Values are opaque serialized payloads (JSON documents in practice). A
/// zero TTL means the entry does not expire.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Reads the value stored under `key`, or `None` if absent or expired.
    async fn get(&self, key: &str) -> Result<Option<String>>;

    /// Writes `value` under `key` with the given time-to-live.
    async fn set(&self, key: &str, value: &str, ttl: Duration) -> Result<()>;

    /// Returns true if `key` currently holds a live value.
    async fn exists(&self, key: &str) -> Result<bool>;

    /// Deletes the given keys, returning how many were removed.
    async fn delete(&self, keys: &[&str]) -> Result<u64>;

    /// Atomically writes `value` under `key` only if the key is absent.
    ///
    /// Returns true if the write happened.
    async fn set_if_absent(&self, key: &str, value: &str, ttl: Duration) -> Result<bool>;

    /// Atomically deletes `key` only if its current value equals `expected`.
    ///
    /// Returns true if the key was deleted.
    async fn compare_and_delete(&self, key: &str, expected: &str) -> Result<bool>;
}
