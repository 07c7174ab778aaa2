//! # Stratus Store
//!
//! Shared key-value store contract for the Stratus cache layer.
//!
//! This crate defines the thin contract every backend must satisfy
//! ([`KeyValueStore`]), an in-memory reference backend with TTL expiry
//! ([`MemoryStore`]), and the distributed mutual-exclusion primitive built
//! on the store's atomic conditional operations ([`DistributedLock`]).
//!
//! ## Features
//!
//! - Async trait-based store abstraction with get/set-with-TTL/exists/delete
//! - Atomic set-if-absent and compare-and-delete for lock correctness
//! - Acquire-with-retry locking with ownership-checked release
//! - TTL-bounded auto-recovery from crashed lock holders
//!
//! ## Example
//!
//! ```
//! use std::sync::Arc;
//! use std::time::Duration;
//! use stratus_store::{DistributedLock, MemoryStore, OwnerToken};
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let store = Arc::new(MemoryStore::new());
//! let lock = DistributedLock::new(store);
//!
//! let token = OwnerToken::generate();
//! if lock.acquire("locks:rebuild-index", &token).await {
//!     // critical section
//!     lock.release("locks:rebuild-index", &token).await;
//! }
//! # }
//! ```

pub mod lock;
pub mod memory;
pub mod store;

// Re-exports
pub use lock::{DistributedLock, LockConfig, OwnerToken};
pub use memory::MemoryStore;
pub use store::KeyValueStore;

// Re-export stratus_core for consumers
pub use stratus_core;
