//! Error types for the shared key-value store.
//!
//! Every store operation can fail with a [`StoreError`]. Upstream components
//! treat these as transient: the cache controller fails open around read
//! errors and swallows write errors, so a broken store never fails a
//! caller's business operation.

use thiserror::Error;

/// Errors that can occur when talking to the shared key-value store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The store could not be reached.
    #[error("store unavailable: {reason}")]
    Unavailable { reason: String },

    /// An operation exceeded its deadline.
    #[error("store operation timed out after {seconds}s")]
    Timeout { seconds: u64 },

    /// A payload could not be encoded or decoded.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// The store has been shut down.
    #[error("store is closed")]
    Closed,
}

impl StoreError {
    /// Creates a new unavailable error.
    pub fn unavailable(reason: impl Into<String>) -> Self {
        Self::Unavailable {
            reason: reason.into(),
        }
    }

    /// Creates a new timeout error.
    pub fn timeout(seconds: u64) -> Self {
        Self::Timeout { seconds }
    }

    /// Creates a new serialization error.
    pub fn serialization(msg: impl Into<String>) -> Self {
        Self::Serialization(msg.into())
    }

    /// Returns true if this error might succeed on retry.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            Self::Unavailable { .. } | Self::Timeout { .. } | Self::Closed
        )
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

/// Type alias for Results with StoreError.
pub type Result<T> = std::result::Result<T, StoreError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = StoreError::unavailable("connection refused");
        assert_eq!(err.to_string(), "store unavailable: connection refused");

        let err = StoreError::timeout(5);
        assert_eq!(err.to_string(), "store operation timed out after 5s");

        let err = StoreError::serialization("invalid JSON");
        assert_eq!(err.to_string(), "serialization error: invalid JSON");
    }

    #[test]
    fn test_is_transient() {
        assert!(StoreError::unavailable("network error").is_transient());
        assert!(StoreError::timeout(30).is_transient());
        assert!(StoreError::Closed.is_transient());
        assert!(!StoreError::serialization("bad payload").is_transient());
    }

    #[test]
    fn test_from_serde_json_error() {
        let json_err = serde_json::from_str::<u32>("not a number").unwrap_err();
        let err: StoreError = json_err.into();
        assert!(matches!(err, StoreError::Serialization(_)));
    }
}
