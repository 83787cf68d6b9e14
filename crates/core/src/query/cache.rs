//! Bounded memoization of built queries.

use std::num::NonZeroUsize;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use lru::LruCache;
use tracing::debug;

use super::types::{BuiltQuery, QueryError};

/// Distinct (keywords, count-mode) pairs kept before the least recently
/// used entry is evicted.
pub const QUERY_CACHE_CAPACITY: usize = 128;

/// Cache key. Absent keywords and an empty keyword string are distinct.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    pub keywords: Option<String>,
    pub count: bool,
}

impl CacheKey {
    pub fn new(keywords: Option<&str>, count: bool) -> Self {
        Self {
            keywords: keywords.map(str::to_string),
            count,
        }
    }
}

/// LRU cache of [`BuiltQuery`] values.
///
/// Entries are shared as `Arc<BuiltQuery>` and never mutated. The cache
/// has to be cleared with [`QueryCache::invalidate_all`] whenever the
/// configuration changes, since any option can affect every build.
#[derive(Debug)]
pub struct QueryCache {
    entries: Mutex<LruCache<CacheKey, Arc<BuiltQuery>>>,
}

impl Default for QueryCache {
    fn default() -> Self {
        Self::new()
    }
}

impl QueryCache {
    pub fn new() -> Self {
        Self::with_capacity(QUERY_CACHE_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            entries: Mutex::new(LruCache::new(capacity)),
        }
    }

    /// Return the cached query for the key, or run `build` and cache its
    /// result. Build errors are returned and not cached.
    pub fn get_or_build<F>(
        &self,
        keywords: Option<&str>,
        count: bool,
        build: F,
    ) -> Result<Arc<BuiltQuery>, QueryError>
    where
        F: FnOnce() -> Result<BuiltQuery, QueryError>,
    {
        let key = CacheKey::new(keywords, count);
        let mut entries = self.lock();
        if let Some(query) = entries.get(&key) {
            debug!(?key, "Query cache hit");
            return Ok(Arc::clone(query));
        }

        debug!(?key, "Query cache miss");
        let query = Arc::new(build()?);
        entries.put(key, Arc::clone(&query));
        Ok(query)
    }

    /// Drop every entry.
    pub fn invalidate_all(&self) {
        let mut entries = self.lock();
        debug!(entries = entries.len(), "Invalidating query cache");
        entries.clear();
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    // Entries are immutable once inserted, so a panic while holding the
    // lock cannot leave a half-written value behind.
    fn lock(&self) -> MutexGuard<'_, LruCache<CacheKey, Arc<BuiltQuery>>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Configuration;
    use crate::query::build_query;
    use std::cell::Cell;

    fn build_counting<'a>(
        calls: &'a Cell<u32>,
        keywords: Option<&'a str>,
        count: bool,
    ) -> impl FnOnce() -> Result<BuiltQuery, QueryError> + 'a {
        move || {
            calls.set(calls.get() + 1);
            build_query(keywords, &Configuration::default(), count)
        }
    }

    #[test]
    fn test_second_lookup_is_a_hit() {
        let cache = QueryCache::new();
        let calls = Cell::new(0);

        let first = cache
            .get_or_build(Some("foo"), false, build_counting(&calls, Some("foo"), false))
            .unwrap();
        let second = cache
            .get_or_build(Some("foo"), false, build_counting(&calls, Some("foo"), false))
            .unwrap();

        assert_eq!(calls.get(), 1);
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_count_mode_and_absent_keywords_are_distinct_keys() {
        let cache = QueryCache::new();
        let calls = Cell::new(0);

        cache
            .get_or_build(Some("foo"), false, build_counting(&calls, Some("foo"), false))
            .unwrap();
        cache
            .get_or_build(Some("foo"), true, build_counting(&calls, Some("foo"), true))
            .unwrap();
        cache
            .get_or_build(None, true, build_counting(&calls, None, true))
            .unwrap();
        cache
            .get_or_build(Some(""), true, build_counting(&calls, Some(""), true))
            .unwrap();

        assert_eq!(calls.get(), 4);
        assert_eq!(cache.len(), 4);
    }

    #[test]
    fn test_errors_are_not_cached() {
        let cache = QueryCache::new();
        let result = cache.get_or_build(Some("a-b"), false, || {
            Err(QueryError::InvalidKeyword("a-b".to_string()))
        });
        assert!(result.is_err());
        assert!(cache.is_empty());
    }

    #[test]
    fn test_invalidate_all_forces_rebuild() {
        let cache = QueryCache::new();
        let calls = Cell::new(0);

        cache
            .get_or_build(None, true, build_counting(&calls, None, true))
            .unwrap();
        cache.invalidate_all();
        assert!(cache.is_empty());
        cache
            .get_or_build(None, true, build_counting(&calls, None, true))
            .unwrap();
        assert_eq!(calls.get(), 2);
    }

    #[test]
    fn test_least_recently_used_is_evicted() {
        let cache = QueryCache::with_capacity(2);
        let calls = Cell::new(0);

        for keywords in ["a", "b"] {
            cache
                .get_or_build(Some(keywords), true, build_counting(&calls, Some(keywords), true))
                .unwrap();
        }
        // touch "a" so "b" becomes the eviction candidate
        cache
            .get_or_build(Some("a"), true, build_counting(&calls, Some("a"), true))
            .unwrap();
        cache
            .get_or_build(Some("c"), true, build_counting(&calls, Some("c"), true))
            .unwrap();
        assert_eq!(calls.get(), 3);

        cache
            .get_or_build(Some("a"), true, build_counting(&calls, Some("a"), true))
            .unwrap();
        assert_eq!(calls.get(), 3);
        cache
            .get_or_build(Some("b"), true, build_counting(&calls, Some("b"), true))
            .unwrap();
        assert_eq!(calls.get(), 4);
    }

    #[test]
    fn test_default_capacity() {
        let cache = QueryCache::new();
        let calls = Cell::new(0);
        for i in 0..(QUERY_CACHE_CAPACITY + 10) {
            let keywords = format!("k{i}");
            cache
                .get_or_build(Some(&keywords), true, || {
                    calls.set(calls.get() + 1);
                    build_query(Some(&keywords), &Configuration::default(), true)
                })
                .unwrap();
        }
        assert_eq!(cache.len(), QUERY_CACHE_CAPACITY);
    }
}
