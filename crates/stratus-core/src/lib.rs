//! Stratus Core - Domain types for the Stratus cache layer
//!
//! This crate provides the foundational types shared by the store and cache
//! crates: the transport-level error taxonomy and the fingerprint type used
//! to derive cache keys from a guarded operation's identity and arguments.

pub mod error;
pub mod fingerprint;

// Re-exports
pub use error::{Result, StoreError};
pub use fingerprint::{DATA_PREFIX, Fingerprint, MARKER_PREFIX, marker_key_for};

/// Returns the crate version.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
