//! Cache metrics recording.

use metrics::{counter, histogram};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

/// Registra las metricas de cache.
/// Llamar una vez al inicio para registrar las metricas.
pub fn register_cache_metrics() {
    metrics::describe_counter!("stratus_cache_hits_total", "Total number of cache hits");
    metrics::describe_counter!("stratus_cache_misses_total", "Total number of cache misses");
    metrics::describe_counter!(
        "stratus_cache_stale_hits_total",
        "Total number of stale hits served while revalidating"
    );
    metrics::describe_counter!(
        "stratus_cache_fail_open_total",
        "Total number of calls that bypassed a failing store"
    );
    metrics::describe_counter!(
        "stratus_cache_refresh_total",
        "Total number of background refreshes by outcome"
    );
    metrics::describe_histogram!(
        "stratus_cache_operation_seconds",
        "Time spent on cache operations"
    );
}

/// Recorder de metricas de cache.
/// Usa atomic counters internos para maximo rendimiento.
#[derive(Debug, Clone, Default)]
pub struct CacheMetrics {
    hits: Arc<AtomicU64>,
    misses: Arc<AtomicU64>,
    stale_hits: Arc<AtomicU64>,
    fail_opens: Arc<AtomicU64>,
}

impl CacheMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registra un cache hit
    pub fn record_hit(&self) {
        self.hits.fetch_add(1, Ordering::Relaxed);
        counter!("stratus_cache_hits_total").increment(1);
    }

    /// Registra un cache miss
    pub fn record_miss(&self) {
        self.misses.fetch_add(1, Ordering::Relaxed);
        counter!("stratus_cache_misses_total").increment(1);
    }

    /// Registra un stale hit servido mientras se revalida
    pub fn record_stale_hit(&self) {
        self.stale_hits.fetch_add(1, Ordering::Relaxed);
        counter!("stratus_cache_stale_hits_total").increment(1);
    }

    /// Registra un fail-open (store roto, se llamo al compute directo)
    pub fn record_fail_open(&self) {
        self.fail_opens.fetch_add(1, Ordering::Relaxed);
        counter!("stratus_cache_fail_open_total").increment(1);
    }

    /// Registra el resultado de un refresh en background
    pub fn record_refresh(&self, outcome: &str) {
        counter!("stratus_cache_refresh_total", "outcome" => outcome.to_string()).increment(1);
    }

    /// Registra la duracion de una operacion
    pub fn record_operation_duration(&self, operation: &str, duration: Duration) {
        histogram!(
            "stratus_cache_operation_seconds",
            "operation" => operation.to_string()
        )
        .record(duration.as_secs_f64());
    }

    /// Calcula hit rate (para logging/debugging)
    pub fn hit_rate(&self) -> f64 {
        let hits = self.hits.load(Ordering::Relaxed) as f64;
        let misses = self.misses.load(Ordering::Relaxed) as f64;
        let total = hits + misses;
        if total == 0.0 { 0.0 } else { hits / total }
    }

    /// Retorna el numero de hits
    pub fn hits(&self) -> u64 {
        self.hits.load(Ordering::Relaxed)
    }

    /// Retorna el numero de misses
    pub fn misses(&self) -> u64 {
        self.misses.load(Ordering::Relaxed)
    }

    /// Retorna el numero de stale hits
    pub fn stale_hits(&self) -> u64 {
        self.stale_hits.load(Ordering::Relaxed)
    }

    /// Retorna el numero de fail-opens
    pub fn fail_opens(&self) -> u64 {
        self.fail_opens.load(Ordering::Relaxed)
    }
}
