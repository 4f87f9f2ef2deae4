//! Route recognition caching.
//!
//! This module provides [`RecognitionCache`], an LRU cache that avoids
//! re-running the segment matcher for URLs the router has already seen
//! (back/forward between a handful of pages is the common case). It is gated
//! behind the `cache` feature flag and uses the [`lru`] crate internally.
//!
//! The cache is keyed by the full URL handed to
//! [`RouteRecognizer::recognize`](crate::recognizer::RouteRecognizer::recognize)
//! and is cleared whenever a route is added, since a new pattern can change
//! the ordered result list of any URL.
//!
//! [`CacheStats`] tracks hits, misses, and invalidations so you can monitor
//! cache effectiveness at runtime.
//!
//! # Examples
//!
//! ```
//! use navigator_pipeline::cache::RecognitionCache;
//!
//! let mut cache: RecognitionCache<u32> = RecognitionCache::new();
//! assert!(cache.get("/users/1").is_none());
//! cache.insert("/users/1".to_string(), Vec::new());
//! assert!(cache.get("/users/1").is_some());
//! assert_eq!(cache.stats().hits, 1);
//! assert_eq!(cache.stats().misses, 1);
//! ```

use crate::recognizer::RecognizedRoute;
use crate::{debug_log, trace_log};
use lru::LruCache;
use std::num::NonZeroUsize;

/// Counters tracking cache hit/miss rates and invalidations.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CacheStats {
    /// Number of lookups answered from the cache.
    pub hits: usize,
    /// Number of lookups that fell through to the matcher.
    pub misses: usize,
    /// Number of full cache invalidations (via [`RecognitionCache::clear`]).
    pub invalidations: usize,
}

impl CacheStats {
    /// Return the hit rate as a value in `0.0..=1.0`.
    ///
    /// Returns `0.0` if no lookups have been performed.
    #[allow(clippy::cast_precision_loss)]
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}

/// LRU cache of recognition results keyed by URL.
#[derive(Debug)]
pub struct RecognitionCache<H> {
    entries: LruCache<String, Vec<RecognizedRoute<H>>>,
    stats: CacheStats,
}

impl<H: Clone> RecognitionCache<H> {
    const DEFAULT_CAPACITY: NonZeroUsize = match NonZeroUsize::new(256) {
        Some(capacity) => capacity,
        None => NonZeroUsize::MIN,
    };

    /// Create a cache with the default capacity (256 URLs).
    pub fn new() -> Self {
        Self::with_capacity(Self::DEFAULT_CAPACITY)
    }

    /// Create a cache with a custom capacity.
    pub fn with_capacity(capacity: NonZeroUsize) -> Self {
        Self {
            entries: LruCache::new(capacity),
            stats: CacheStats::default(),
        }
    }

    /// Look up the cached results for `url`, updating hit/miss stats.
    pub fn get(&mut self, url: &str) -> Option<Vec<RecognizedRoute<H>>> {
        if let Some(results) = self.entries.get(url) {
            self.stats.hits += 1;
            trace_log!("Recognition cache hit for '{}'", url);
            Some(results.clone())
        } else {
            self.stats.misses += 1;
            trace_log!("Recognition cache miss for '{}'", url);
            None
        }
    }

    /// Store the results for `url`.
    pub fn insert(&mut self, url: String, results: Vec<RecognizedRoute<H>>) {
        self.entries.push(url, results);
    }

    /// Drop every entry and count an invalidation.
    pub fn clear(&mut self) {
        let removed = self.entries.len();
        self.entries.clear();
        self.stats.invalidations += 1;
        debug_log!(
            "Recognition cache cleared: {} entries removed ({} total invalidations, hit rate: {:.1}%)",
            removed,
            self.stats.invalidations,
            self.stats.hit_rate() * 100.0
        );
    }

    /// Return a reference to the current cache statistics.
    pub const fn stats(&self) -> &CacheStats {
        &self.stats
    }

    /// Number of cached URLs.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// `true` when nothing is cached.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<H: Clone> Default for RecognitionCache<H> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cache_miss_then_hit() {
        let mut cache: RecognitionCache<&'static str> = RecognitionCache::new();
        assert!(cache.get("/a").is_none());
        cache.insert("/a".to_string(), Vec::new());
        assert!(cache.get("/a").is_some());
        assert_eq!(cache.stats().hits, 1);
        assert_eq!(cache.stats().misses, 1);
        assert!((cache.stats().hit_rate() - 0.5).abs() < 0.001);
    }

    #[test]
    fn test_cache_clear() {
        let mut cache: RecognitionCache<u8> = RecognitionCache::new();
        cache.insert("/a".to_string(), Vec::new());
        assert_eq!(cache.len(), 1);

        cache.clear();
        assert!(cache.is_empty());
        assert_eq!(cache.stats().invalidations, 1);
    }

    #[test]
    fn test_cache_evicts_least_recent() {
        let mut cache: RecognitionCache<u8> =
            RecognitionCache::with_capacity(NonZeroUsize::new(2).unwrap());
        cache.insert("/a".to_string(), Vec::new());
        cache.insert("/b".to_string(), Vec::new());
        cache.get("/a");
        cache.insert("/c".to_string(), Vec::new());

        assert!(cache.get("/b").is_none());
        assert!(cache.get("/a").is_some());
    }
}
