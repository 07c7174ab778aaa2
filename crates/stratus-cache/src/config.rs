//! Cache configuration and per-operation policy.

use std::time::Duration;

/// Per-operation cache policy, supplied explicitly at the call site.
///
/// The caller passes the freshness window when invoking the guarded
/// operation; there is no registry or runtime introspection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CachePolicy {
    /// How long a cached value counts as fresh. Zero disables revalidation
    /// entirely and the entry lives on the base TTL alone.
    pub freshness: Duration,
}

impl CachePolicy {
    /// Pure TTL cache: never revalidate.
    pub const NONE: CachePolicy = CachePolicy {
        freshness: Duration::ZERO,
    };

    /// Stale-while-revalidate with the given freshness window.
    pub fn revalidate_after(freshness: Duration) -> Self {
        Self { freshness }
    }

    /// Returns true if this policy uses stale-while-revalidate.
    pub fn revalidates(&self) -> bool {
        !self.freshness.is_zero()
    }
}

/// Configuracion del cache.
#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// Base TTL applied to every data entry write (default: 3 dias).
    pub base_ttl: Duration,
    /// Background refresh dispatch settings.
    pub refresh: RefreshConfig,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            base_ttl: Duration::from_secs(60 * 60 * 24 * 3),
            refresh: RefreshConfig::default(),
        }
    }
}

/// Configuration for the background refresh dispatcher.
#[derive(Debug, Clone)]
pub struct RefreshConfig {
    /// Number of worker tasks draining the refresh queue.
    pub workers: usize,
    /// Queue capacity; a full queue drops further refresh tasks.
    pub queue_capacity: usize,
    /// Skip a refresh when one for the same data key is already queued or
    /// running. Turning this off restores the behavior where every stale
    /// hit dispatches its own refresh.
    pub coalesce: bool,
}

impl Default for RefreshConfig {
    fn default() -> Self {
        Self {
            workers: 2,
            queue_capacity: 64,
            coalesce: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_policy_none_does_not_revalidate() {
        assert!(!CachePolicy::NONE.revalidates());
        assert!(CachePolicy::revalidate_after(Duration::from_secs(1)).revalidates());
    }

    #[test]
    fn test_default_base_ttl_is_three_days() {
        let config = CacheConfig::default();
        assert_eq!(config.base_ttl, Duration::from_secs(259_200));
    }

    #[test]
    fn test_default_refresh_coalesces() {
        let config = RefreshConfig::default();
        assert!(config.coalesce);
        assert!(config.workers >= 1);
        assert!(config.queue_capacity >= 1);
    }
}
