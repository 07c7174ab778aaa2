//! Background refresh dispatch.
//!
//! Stale hits hand their recomputation here. Tasks run on a small pool of
//! worker tasks behind a bounded queue: a full queue drops the task, and
//! with coalescing enabled a refresh whose data key is already queued or
//! running is skipped. Callers never wait on a dispatched refresh and no
//! refresh outcome is ever propagated back to a caller.

use std::collections::HashSet;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use stratus_store::KeyValueStore;

use crate::config::RefreshConfig;
use crate::metrics::CacheMetrics;

/// A boxed compute-and-serialize job. Resolves to the serialized payload,
/// or `None` when the compute failed (the job logs its own failure).
pub(crate) type RefreshJob = Pin<Box<dyn Future<Output = Option<String>> + Send>>;

/// One pending refresh for a stale cache entry.
pub(crate) struct RefreshTask {
    pub data_key: String,
    pub marker_key: String,
    pub base_ttl: Duration,
    pub freshness: Duration,
    pub job: RefreshJob,
}

/// Fire-and-forget executor for stale-entry refreshes.
///
/// Dropping the dispatcher closes the queue; workers drain what was already
/// accepted and exit.
pub struct RefreshDispatcher {
    tx: mpsc::Sender<RefreshTask>,
    in_flight: Arc<Mutex<HashSet<String>>>,
    coalesce: bool,
}

impl RefreshDispatcher {
    /// Starts the worker pool and returns the dispatcher handle.
    pub fn new(
        store: Arc<dyn KeyValueStore>,
        config: RefreshConfig,
        metrics: CacheMetrics,
    ) -> Self {
        let workers = config.workers.max(1);
        let (tx, rx) = mpsc::channel(config.queue_capacity.max(1));
        let rx = Arc::new(tokio::sync::Mutex::new(rx));
        let in_flight = Arc::new(Mutex::new(HashSet::new()));

        for id in 0..workers {
            tokio::spawn(Self::worker(
                id,
                Arc::clone(&store),
                Arc::clone(&rx),
                Arc::clone(&in_flight),
                metrics.clone(),
            ));
        }

        info!(workers, "refresh dispatcher started");

        Self {
            tx,
            in_flight,
            coalesce: config.coalesce,
        }
    }

    /// Hands a refresh task to the worker pool without blocking.
    ///
    /// Returns true if the task was accepted. A task is rejected when the
    /// queue is full, or when coalescing is on and a refresh for the same
    /// data key is already in flight.
    pub(crate) fn dispatch(&self, task: RefreshTask) -> bool {
        if self.coalesce && !self.in_flight.lock().insert(task.data_key.clone()) {
            debug!(key = %task.data_key, "refresh already in flight, skipping");
            return false;
        }

        match self.tx.try_send(task) {
            Ok(()) => true,
            Err(mpsc::error::TrySendError::Full(task)) => {
                self.in_flight.lock().remove(&task.data_key);
                warn!(key = %task.data_key, "refresh queue full, dropping task");
                false
            }
            Err(mpsc::error::TrySendError::Closed(task)) => {
                self.in_flight.lock().remove(&task.data_key);
                warn!(key = %task.data_key, "refresh dispatcher stopped, dropping task");
                false
            }
        }
    }

    async fn worker(
        id: usize,
        store: Arc<dyn KeyValueStore>,
        rx: Arc<tokio::sync::Mutex<mpsc::Receiver<RefreshTask>>>,
        in_flight: Arc<Mutex<HashSet<String>>>,
        metrics: CacheMetrics,
    ) {
        loop {
            let task = { rx.lock().await.recv().await };
            let Some(task) = task else {
                debug!(worker = id, "refresh worker shutting down");
                break;
            };

            let RefreshTask {
                data_key,
                marker_key,
                base_ttl,
                freshness,
                job,
            } = task;

            match job.await {
                Some(payload) => {
                    // Repopulate the entry at the base TTL, then re-arm the
                    // freshness marker. The old value stays authoritative if
                    // either write fails.
                    if let Err(e) = store.set(&data_key, &payload, base_ttl).await {
                        warn!(key = %data_key, error = %e, "refresh write failed");
                        metrics.record_refresh("write_error");
                    } else {
                        if let Err(e) = store.set(&marker_key, "1", freshness).await {
                            warn!(key = %marker_key, error = %e, "marker re-arm failed");
                        }
                        debug!(key = %data_key, "cache entry refreshed");
                        metrics.record_refresh("ok");
                    }
                }
                None => {
                    // The job already logged the compute failure.
                    metrics.record_refresh("compute_error");
                }
            }

            in_flight.lock().remove(&data_key);
        }
    }
}
