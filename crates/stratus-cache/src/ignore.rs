//! Process-wide ignore list.
//!
//! Collaborators can mark path fragments whose listings should be skipped.
//! The list is process-wide shared state with explicit initialization and an
//! explicit invalidation trigger, shared between components via `Arc` rather
//! than a static singleton.

use std::collections::HashSet;

use parking_lot::RwLock;

/// A shared set of path fragments to skip.
#[derive(Debug, Default)]
pub struct IgnoreList {
    entries: RwLock<HashSet<String>>,
    initialized: RwLock<bool>,
}

impl IgnoreList {
    /// Creates an empty, uninitialized list.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the contents and marks the list initialized.
    pub fn load<I, S>(&self, entries: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut set = self.entries.write();
        let mut initialized = self.initialized.write();
        *set = entries.into_iter().map(Into::into).collect();
        *initialized = true;
    }

    /// Adds a single entry. Returns true if it was not already present.
    pub fn add(&self, entry: impl Into<String>) -> bool {
        self.entries.write().insert(entry.into())
    }

    /// Returns true if the exact entry is present.
    pub fn contains(&self, entry: &str) -> bool {
        self.entries.read().contains(entry)
    }

    /// Returns true if any entry occurs as a substring of `candidate`.
    pub fn matches(&self, candidate: &str) -> bool {
        self.entries
            .read()
            .iter()
            .any(|entry| candidate.contains(entry))
    }

    /// Returns the number of entries.
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    /// Returns true if the list holds no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }

    /// Returns true if `load` has been called since creation or the last
    /// invalidation.
    pub fn is_initialized(&self) -> bool {
        *self.initialized.read()
    }

    /// Clears the list and marks it uninitialized, forcing a reload.
    pub fn invalidate(&self) {
        let mut set = self.entries.write();
        let mut initialized = self.initialized.write();
        set.clear();
        *initialized = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_list_is_uninitialized() {
        let list = IgnoreList::new();
        assert!(!list.is_initialized());
        assert!(list.is_empty());
    }

    #[test]
    fn test_load_initializes() {
        let list = IgnoreList::new();
        list.load(["/trash", "/recycle"]);

        assert!(list.is_initialized());
        assert_eq!(list.len(), 2);
        assert!(list.contains("/trash"));
    }

    #[test]
    fn test_add_deduplicates() {
        let list = IgnoreList::new();
        assert!(list.add("/trash"));
        assert!(!list.add("/trash"));
        assert_eq!(list.len(), 1);
    }

    #[test]
    fn test_matches_substring() {
        let list = IgnoreList::new();
        list.load(["/trash"]);

        assert!(list.matches("/media/trash/file.mkv"));
        assert!(!list.matches("/media/movies/file.mkv"));
    }

    #[test]
    fn test_invalidate_forces_reload() {
        let list = IgnoreList::new();
        list.load(["/trash"]);
        list.invalidate();

        assert!(!list.is_initialized());
        assert!(list.is_empty());

        list.load(["/other"]);
        assert!(list.is_initialized());
        assert!(list.matches("/media/other/x"));
    }

    #[test]
    fn test_load_replaces_contents() {
        let list = IgnoreList::new();
        list.load(["/a", "/b"]);
        list.load(["/c"]);

        assert_eq!(list.len(), 1);
        assert!(!list.contains("/a"));
        assert!(list.contains("/c"));
    }
}
