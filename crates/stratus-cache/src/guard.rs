//! Read-through cache controller.

use std::fmt;
use std::future::Future;
use std::sync::Arc;
use std::time::Instant;

use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use stratus_core::Fingerprint;
use stratus_store::KeyValueStore;

use crate::config::{CacheConfig, CachePolicy};
use crate::metrics::CacheMetrics;
use crate::refresh::{RefreshDispatcher, RefreshJob, RefreshTask};

/// The interception layer in front of a slow, idempotent compute function.
///
/// Each guarded call resolves its [`Fingerprint`] to a data key and a marker
/// key, reads the store, and decides hit/miss/stale:
///
/// - store read error: fail open, compute in the foreground, no write-back
/// - miss: compute in the foreground, populate entry and marker
/// - fresh hit: return the cached value
/// - stale hit: return the cached value immediately and dispatch a
///   background refresh
///
/// A stale hit never blocks on the refresh; its caller-visible latency is a
/// store read, not a compute.
pub struct ReadThroughCache {
    store: Arc<dyn KeyValueStore>,
    dispatcher: RefreshDispatcher,
    config: CacheConfig,
    metrics: CacheMetrics,
}

impl ReadThroughCache {
    /// Creates a cache with the default configuration.
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self::with_config(store, CacheConfig::default())
    }

    /// Creates a cache with an explicit configuration.
    pub fn with_config(store: Arc<dyn KeyValueStore>, config: CacheConfig) -> Self {
        let metrics = CacheMetrics::new();
        let dispatcher =
            RefreshDispatcher::new(Arc::clone(&store), config.refresh.clone(), metrics.clone());
        Self {
            store,
            dispatcher,
            config,
            metrics,
        }
    }

    /// Returns the cache metrics.
    pub fn metrics(&self) -> &CacheMetrics {
        &self.metrics
    }

    /// Returns the configuration.
    pub fn config(&self) -> &CacheConfig {
        &self.config
    }

    /// Invokes `compute` through the cache.
    ///
    /// `compute` must be idempotent: on a stale hit it is re-invoked later on
    /// a background worker. Its error type propagates unchanged to the caller
    /// on a foreground miss; background failures are only logged.
    pub async fn call<T, E, F, Fut>(
        &self,
        policy: CachePolicy,
        fingerprint: Fingerprint,
        compute: F,
    ) -> Result<T, E>
    where
        T: Serialize + DeserializeOwned + Send + 'static,
        E: fmt::Display + Send + 'static,
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<T, E>> + Send + 'static,
    {
        let start = Instant::now();
        let data_key = fingerprint.data_key();
        let marker_key = fingerprint.marker_key();

        let cached = match self.store.get(&data_key).await {
            Ok(cached) => cached,
            Err(e) => {
                // A broken store must never fail the caller's operation.
                warn!(key = %data_key, error = %e, "store read failed, bypassing cache");
                self.metrics.record_fail_open();
                let result = compute().await;
                self.metrics
                    .record_operation_duration("fail_open", start.elapsed());
                return result;
            }
        };

        match cached {
            None => {
                self.metrics.record_miss();
                debug!(key = %data_key, "cache miss, computing");
                let value = compute().await?;
                self.write_back(&policy, &data_key, &marker_key, &value).await;
                self.metrics.record_operation_duration("miss", start.elapsed());
                Ok(value)
            }
            Some(payload) => {
                let value: T = match serde_json::from_str(&payload) {
                    Ok(value) => value,
                    Err(e) => {
                        warn!(key = %data_key, error = %e, "cached payload unreadable, bypassing cache");
                        self.metrics.record_fail_open();
                        let result = compute().await;
                        self.metrics
                            .record_operation_duration("fail_open", start.elapsed());
                        return result;
                    }
                };

                if policy.revalidates() && !self.is_fresh(&marker_key).await {
                    self.metrics.record_stale_hit();
                    debug!(key = %data_key, "stale hit, dispatching refresh");
                    self.dispatch_refresh(policy, &data_key, &marker_key, compute);
                    self.metrics
                        .record_operation_duration("stale_hit", start.elapsed());
                    return Ok(value);
                }

                self.metrics.record_hit();
                self.metrics.record_operation_duration("hit", start.elapsed());
                Ok(value)
            }
        }
    }

    /// Populates the entry and, when revalidation is on, the marker.
    /// Write failures are swallowed; the computed value already belongs to
    /// the caller.
    async fn write_back<T: Serialize>(
        &self,
        policy: &CachePolicy,
        data_key: &str,
        marker_key: &str,
        value: &T,
    ) {
        let payload = match serde_json::to_string(value) {
            Ok(payload) => payload,
            Err(e) => {
                warn!(key = %data_key, error = %e, "value not serializable, skipping cache write");
                return;
            }
        };

        if let Err(e) = self.store.set(data_key, &payload, self.config.base_ttl).await {
            warn!(key = %data_key, error = %e, "cache write failed");
            return;
        }
        if policy.revalidates() {
            if let Err(e) = self.store.set(marker_key, "1", policy.freshness).await {
                warn!(key = %marker_key, error = %e, "marker write failed");
            }
        }
    }

    /// Checks the freshness marker. A store error counts as fresh: while the
    /// store is flapping we keep serving the cached value instead of piling
    /// up refreshes.
    async fn is_fresh(&self, marker_key: &str) -> bool {
        match self.store.exists(marker_key).await {
            Ok(fresh) => fresh,
            Err(e) => {
                warn!(key = %marker_key, error = %e, "marker check failed, serving cached value");
                true
            }
        }
    }

    fn dispatch_refresh<T, E, F, Fut>(
        &self,
        policy: CachePolicy,
        data_key: &str,
        marker_key: &str,
        compute: F,
    ) where
        T: Serialize + DeserializeOwned + Send + 'static,
        E: fmt::Display + Send + 'static,
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<T, E>> + Send + 'static,
    {
        let key = data_key.to_string();
        let job: RefreshJob = Box::pin(async move {
            match compute().await {
                Ok(value) => match serde_json::to_string(&value) {
                    Ok(payload) => Some(payload),
                    Err(e) => {
                        warn!(key = %key, error = %e, "refreshed value not serializable");
                        None
                    }
                },
                Err(e) => {
                    warn!(key = %key, error = %e, "background refresh failed");
                    None
                }
            }
        });

        self.dispatcher.dispatch(RefreshTask {
            data_key: data_key.to_string(),
            marker_key: marker_key.to_string(),
            base_ttl: self.config.base_ttl,
            freshness: policy.freshness,
            job,
        });
    }
}
