//! # Stratus Cache
//!
//! Read-through cache with stale-while-revalidate over a shared store.
//!
//! A guarded operation is an opaque, idempotent compute function wrapped
//! together with its [`Fingerprint`](stratus_core::Fingerprint) and a
//! [`CachePolicy`]. On each call the controller decides hit/miss/stale:
//! misses compute in the foreground and populate the store; stale hits
//! return the cached value immediately and hand a refresh task to a bounded
//! background dispatcher; store failures fail open so a broken cache never
//! fails the caller's operation.
//!
//! ## Example
//!
//! ```
//! use std::sync::Arc;
//! use std::time::Duration;
//! use stratus_cache::{CachePolicy, ReadThroughCache};
//! use stratus_core::Fingerprint;
//! use stratus_store::MemoryStore;
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> Result<(), std::io::Error> {
//! let cache = ReadThroughCache::new(Arc::new(MemoryStore::new()));
//!
//! let fp = Fingerprint::of("FileService", "list_files")
//!     .arg(&"/movies")
//!     .map_err(|e| std::io::Error::other(e.to_string()))?;
//! let policy = CachePolicy::revalidate_after(Duration::from_secs(2 * 60 * 60));
//!
//! let listing: Vec<String> = cache
//!     .call(policy, fp, || async {
//!         // expensive upstream call happens here, only on miss or refresh
//!         Ok::<_, std::io::Error>(vec!["movie.mkv".to_string()])
//!     })
//!     .await?;
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod guard;
pub mod ignore;
pub mod metrics;
mod refresh;

// Re-exports
pub use config::{CacheConfig, CachePolicy, RefreshConfig};
pub use guard::ReadThroughCache;
pub use ignore::IgnoreList;
pub use metrics::{CacheMetrics, register_cache_metrics};

// Re-export core types for consumers
pub use stratus_core::{Fingerprint, StoreError};
