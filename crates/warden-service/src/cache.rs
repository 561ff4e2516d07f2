//! Process-lifetime cache of parsed setup files.
//!
//! Entries are keyed by the path string exactly as given and are never
//! invalidated or re-read. Lookups take a read lock; the first successful load
//! of a path wins.

use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

#[derive(Debug)]
pub struct FileCache<T> {
    entries: RwLock<HashMap<String, Arc<T>>>,
}

impl<T> Default for FileCache<T> {
    fn default() -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
        }
    }
}

impl<T> FileCache<T> {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn get(&self, path: &str) -> Option<Arc<T>> {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(path)
            .cloned()
    }

    /// ## Summary
    /// Returns the cached entry for `path`, calling `load` on a miss.
    ///
    /// `load` returning `None` (file unreadable) caches nothing. When two
    /// threads load the same path concurrently, both get the entry that was
    /// inserted first.
    pub fn get_or_load(&self, path: &str, load: impl FnOnce(&str) -> Option<T>) -> Option<Arc<T>> {
        if let Some(hit) = self.get(path) {
            tracing::trace!(path, "Cache hit");
            return Some(hit);
        }

        let loaded = Arc::new(load(path)?);

        let mut entries = self
            .entries
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        Some(Arc::clone(entries.entry(path.to_string()).or_insert(loaded)))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[test]
    fn second_lookup_does_not_load() {
        let cache = FileCache::new();
        let calls = Cell::new(0);

        let first = cache.get_or_load("/a", |_| {
            calls.set(calls.get() + 1);
            Some(1)
        });
        let second = cache.get_or_load("/a", |_| {
            calls.set(calls.get() + 1);
            Some(2)
        });

        assert_eq!(calls.get(), 1);
        let (first, second) = (first.expect("loaded"), second.expect("cached"));
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(*second, 1);
    }

    #[test]
    fn failed_load_is_not_cached() {
        let cache: FileCache<u8> = FileCache::new();
        assert!(cache.get_or_load("/missing", |_| None).is_none());
        assert!(cache.is_empty());
        assert_eq!(cache.get_or_load("/missing", |_| Some(3)).as_deref(), Some(&3));
    }

    #[test]
    fn keys_are_compared_verbatim() {
        let cache = FileCache::new();
        let a = cache.get_or_load("/etc/x", |_| Some(1)).expect("loaded");
        let b = cache.get_or_load("/etc//x", |_| Some(2)).expect("loaded");
        assert!(!Arc::ptr_eq(&a, &b));
        assert_eq!(cache.len(), 2);
    }
}
