use std::cell::RefCell;
use std::collections::HashMap;
use std::collections::hash_map::Entry;

use rustc_hash::{FxBuildHasher, FxHashMap};
use tracing::trace;

/// An insert-only cache from argument keys to memoized results.
///
/// Every memoized function owns exactly one cache. Entries are never updated
/// or removed: once a key has a value, that value is returned for the rest of
/// the cache's life.
///
/// The cache uses interior mutability and does not hold a borrow while a
/// result is being computed, so the computation may itself go through the
/// same cache.
pub struct Cache<T> {
    /// Maps from argument keys to memoized results.
    map: RefCell<FxHashMap<String, T>>,
}

impl<T> Cache<T> {
    /// Create an empty cache.
    pub const fn new() -> Self {
        Self { map: RefCell::new(HashMap::with_hasher(FxBuildHasher)) }
    }

    /// The number of memoized results.
    pub fn len(&self) -> usize {
        self.map.borrow().len()
    }

    /// Whether nothing was memoized yet.
    pub fn is_empty(&self) -> bool {
        self.map.borrow().is_empty()
    }

    /// Whether there is a result for the key.
    pub fn contains(&self, key: &str) -> bool {
        self.map.borrow().contains_key(key)
    }

    /// Store a result unless the key already has one.
    ///
    /// Returns whether the value was inserted.
    pub fn insert(&self, key: String, value: T) -> bool {
        let mut map = self.map.borrow_mut();
        if map.contains_key(&key) {
            return false;
        }
        map.insert(key, value);
        true
    }
}

impl<T: Clone> Cache<T> {
    /// Look for a memoized result.
    pub fn get(&self, key: &str) -> Option<T> {
        self.map.borrow().get(key).cloned()
    }

    /// Return the memoized result for the key or compute and store it.
    pub fn get_or_insert_with<F>(&self, key: String, f: F) -> T
    where
        F: FnOnce() -> T,
    {
        match self.get_or_try_insert_with(key, || Ok::<_, std::convert::Infallible>(f())) {
            Ok(output) => output,
            Err(never) => match never {},
        }
    }

    /// Return the memoized result for the key or try to compute and store it.
    ///
    /// An error is returned as is and leaves the key vacant.
    pub fn get_or_try_insert_with<F, E>(&self, key: String, f: F) -> Result<T, E>
    where
        F: FnOnce() -> Result<T, E>,
    {
        // Check if there is a cached output.
        if let Some(output) = self.get(&key) {
            trace!(key = %key, "memoized hit");

            #[cfg(feature = "testing")]
            crate::testing::register_hit();

            return Ok(output);
        }

        // The map is not borrowed here, which lets the function reenter the
        // cache. A nested call may fill the key first, in which case its
        // entry stays and is what every caller receives.
        let output = f()?;
        let output = match self.map.borrow_mut().entry(key) {
            Entry::Occupied(entry) => {
                trace!(key = %entry.key(), "key was filled by a nested call");
                entry.get().clone()
            }
            Entry::Vacant(entry) => {
                trace!(key = %entry.key(), "memoized miss");
                entry.insert(output).clone()
            }
        };

        #[cfg(feature = "testing")]
        crate::testing::register_miss();

        Ok(output)
    }
}

impl<T> Default for Cache<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;

    use super::*;

    #[test]
    fn test_cache_insert_only() {
        let cache = Cache::new();
        assert!(cache.is_empty());
        assert!(cache.insert("a".into(), 1));
        assert!(!cache.insert("a".into(), 2));
        assert_eq!(cache.get("a"), Some(1));
        assert_eq!(cache.get("b"), None);
        assert_eq!(cache.len(), 1);
        assert!(cache.contains("a"));
    }

    #[test]
    fn test_cache_computes_once() {
        let cache = Cache::new();
        let runs = Cell::new(0);
        let compute = || {
            runs.set(runs.get() + 1);
            "value"
        };
        assert_eq!(cache.get_or_insert_with("k".into(), compute), "value");
        assert_eq!(cache.get_or_insert_with("k".into(), compute), "value");
        assert_eq!(runs.get(), 1);
    }

    #[test]
    fn test_cache_error_leaves_key_vacant() {
        let cache = Cache::<u8>::new();
        let result = cache.get_or_try_insert_with("k".into(), || Err("boom"));
        assert_eq!(result, Err("boom"));
        assert!(!cache.contains("k"));
        let result = cache.get_or_try_insert_with("k".into(), || Ok::<_, &str>(3));
        assert_eq!(result, Ok(3));
        assert_eq!(cache.get("k"), Some(3));
    }

    #[test]
    fn test_cache_reentrant() {
        let cache = Cache::new();
        let output = cache.get_or_insert_with("outer".into(), || {
            cache.get_or_insert_with("inner".into(), || 1) + 1
        });
        assert_eq!(output, 2);
        assert_eq!(cache.len(), 2);
    }

    #[test]
    fn test_cache_nested_fill_wins() {
        let cache = Cache::new();
        let first = cache.get_or_insert_with("k".into(), || {
            cache.get_or_insert_with("k".into(), || 1);
            10
        });
        let second = cache.get_or_insert_with("k".into(), || 20);
        assert_eq!(first, 1);
        assert_eq!(second, 1);
        assert_eq!(cache.get("k"), Some(1));
        assert_eq!(cache.len(), 1);
    }
}
