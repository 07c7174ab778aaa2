//! Cache key fingerprints.
//!
//! A fingerprint names a guarded operation together with a digest of its
//! cache-relevant arguments. Two calls that differ only in arguments the
//! caller did not include produce the same fingerprint and therefore share a
//! cache entry. The fingerprint is the cache key, modulo namespace prefix:
//! `cache:<operation>[:<digest>]` for the data entry and the same key with
//! `extime` in place of `cache` for the freshness marker.

use std::fmt;

use serde::Serialize;
use sha2::{Digest, Sha256};

use crate::error::Result;

/// Namespace prefix for data entries.
pub const DATA_PREFIX: &str = "cache";

/// Namespace prefix for freshness markers.
pub const MARKER_PREFIX: &str = "extime";

/// Derives the marker key for a data key by swapping the namespace prefix.
///
/// Data key and marker key are always derivable from one another by this
/// fixed substitution of the leading segment.
pub fn marker_key_for(data_key: &str) -> String {
    match data_key.strip_prefix(DATA_PREFIX) {
        Some(rest) => format!("{MARKER_PREFIX}{rest}"),
        None => data_key.to_string(),
    }
}

/// Deterministic identity of a guarded call.
///
/// Built from the operation identity (`<component>:<operation>`) plus the
/// ordered list of arguments the caller marked as cache-relevant. Each
/// argument is canonicalized with `serde_json`, digested individually, and
/// the concatenation of the per-argument digests is digested again to form
/// the final argument fingerprint.
///
/// # Examples
///
/// ```
/// use stratus_core::Fingerprint;
///
/// let fp = Fingerprint::of("FileService", "list_files")
///     .arg(&"/movies")
///     .unwrap();
/// assert!(fp.data_key().starts_with("cache:FileService:list_files:"));
/// assert!(fp.marker_key().starts_with("extime:FileService:list_files:"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Fingerprint {
    operation: String,
    digests: Vec<String>,
}

impl Fingerprint {
    /// Starts a fingerprint for the given component and operation.
    pub fn of(component: impl AsRef<str>, operation: impl AsRef<str>) -> Self {
        Self {
            operation: format!("{}:{}", component.as_ref(), operation.as_ref()),
            digests: Vec::new(),
        }
    }

    /// Includes one cache-relevant argument.
    ///
    /// The argument is serialized to canonical JSON and digested. Arguments
    /// not passed through `arg`/`arg_raw` are invisible to the cache key.
    /// Determinism requires the argument's `Serialize` impl to be stable
    /// for equal values (derived impls on structs, strings and numbers are).
    pub fn arg<T: Serialize>(mut self, value: &T) -> Result<Self> {
        let canonical = serde_json::to_string(value)?;
        self.digests.push(digest128(&canonical));
        Ok(self)
    }

    /// Includes a pre-extracted string argument, such as a request host the
    /// caller explicitly opted into the key.
    pub fn arg_raw(mut self, value: &str) -> Self {
        self.digests.push(digest128(value));
        self
    }

    /// Returns the operation identity (`<component>:<operation>`).
    pub fn operation(&self) -> &str {
        &self.operation
    }

    /// Returns the combined argument digest, if any arguments were included.
    pub fn arg_digest(&self) -> Option<String> {
        if self.digests.is_empty() {
            None
        } else {
            Some(digest128(&self.digests.concat()))
        }
    }

    /// Returns the key of the cache data entry.
    pub fn data_key(&self) -> String {
        match self.arg_digest() {
            Some(digest) => format!("{DATA_PREFIX}:{}:{digest}", self.operation),
            None => format!("{DATA_PREFIX}:{}", self.operation),
        }
    }

    /// Returns the key of the freshness marker.
    pub fn marker_key(&self) -> String {
        marker_key_for(&self.data_key())
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.data_key())
    }
}

/// 128-bit content hash, hex encoded.
fn digest128(input: &str) -> String {
    let hash = Sha256::digest(input.as_bytes());
    hex::encode(&hash[..16])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_args_key_is_operation_alone() {
        let fp = Fingerprint::of("FileService", "site_list");
        assert_eq!(fp.data_key(), "cache:FileService:site_list");
        assert_eq!(fp.marker_key(), "extime:FileService:site_list");
        assert!(fp.arg_digest().is_none());
    }

    #[test]
    fn test_deterministic_across_builds() {
        let a = Fingerprint::of("FileService", "list_files")
            .arg(&"/movies")
            .unwrap()
            .arg(&3u32)
            .unwrap();
        let b = Fingerprint::of("FileService", "list_files")
            .arg(&"/movies")
            .unwrap()
            .arg(&3u32)
            .unwrap();

        assert_eq!(a, b);
        assert_eq!(a.data_key(), b.data_key());
    }

    #[test]
    fn test_different_args_different_keys() {
        let a = Fingerprint::of("FileService", "list_files")
            .arg(&"/movies")
            .unwrap();
        let b = Fingerprint::of("FileService", "list_files")
            .arg(&"/shows")
            .unwrap();

        assert_ne!(a.data_key(), b.data_key());
    }

    #[test]
    fn test_argument_order_matters() {
        let a = Fingerprint::of("Svc", "op").arg(&1).unwrap().arg(&2).unwrap();
        let b = Fingerprint::of("Svc", "op").arg(&2).unwrap().arg(&1).unwrap();

        assert_ne!(a.data_key(), b.data_key());
    }

    #[test]
    fn test_unmarked_argument_isolation() {
        // A caller-context argument that is simply never included does not
        // change the key: both calls collide on the same entry.
        let with_context = Fingerprint::of("Svc", "detail").arg(&"tid-42").unwrap();
        let other_context = Fingerprint::of("Svc", "detail").arg(&"tid-42").unwrap();

        assert_eq!(with_context.data_key(), other_context.data_key());
    }

    #[test]
    fn test_arg_raw_contributes_to_key() {
        let plain = Fingerprint::of("Svc", "detail").arg(&"tid-42").unwrap();
        let with_host = Fingerprint::of("Svc", "detail")
            .arg(&"tid-42")
            .unwrap()
            .arg_raw("example.com");

        assert_ne!(plain.data_key(), with_host.data_key());
    }

    #[test]
    fn test_marker_key_substitution_roundtrip() {
        let fp = Fingerprint::of("Svc", "op").arg(&"x").unwrap();
        let data = fp.data_key();
        let marker = fp.marker_key();

        assert_eq!(marker_key_for(&data), marker);
        assert_eq!(data.strip_prefix("cache:"), marker.strip_prefix("extime:"));
    }

    #[test]
    fn test_digest_is_128_bits() {
        let fp = Fingerprint::of("Svc", "op").arg(&"value").unwrap();
        let digest = fp.arg_digest().unwrap();
        // 16 bytes hex encoded
        assert_eq!(digest.len(), 32);
    }

    #[test]
    fn test_display_shows_data_key() {
        let fp = Fingerprint::of("Svc", "op");
        assert_eq!(fp.to_string(), "cache:Svc:op");
    }
}
