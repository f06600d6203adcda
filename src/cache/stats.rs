//! Cache Statistics Module
//!
//! Tracks lookup hits and misses, TTL expirations, and stored entry counts.

use serde::Serialize;

// == Cache Stats ==
/// Diagnostic counters for the directory list cache.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CacheStats {
    /// Number of `get_cache_entry` lookups that found a live entry
    pub hits: u64,
    /// Number of `get_cache_entry` lookups that found nothing live
    pub misses: u64,
    /// Number of entries dropped because their existence TTL elapsed
    pub expirations: u64,
    /// Bucket entries currently stored
    pub bucket_entries: usize,
    /// Object entries currently stored
    pub object_entries: usize,
}

impl CacheStats {
    // == Constructor ==
    /// Creates a new CacheStats with all counters at zero.
    pub fn new() -> Self {
        Self::default()
    }

    // == Hit Rate ==
    /// Calculates the lookup hit rate.
    ///
    /// Returns hits / (hits + misses), or 0.0 if no lookups have been made.
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }

    pub fn record_hit(&mut self) {
        self.hits += 1;
    }

    pub fn record_miss(&mut self) {
        self.misses += 1;
    }

    /// Adds `count` expired entries to the expiration counter.
    pub fn record_expirations(&mut self, count: usize) {
        self.expirations += count as u64;
    }

    pub fn set_entry_counts(&mut self, bucket_entries: usize, object_entries: usize) {
        self.bucket_entries = bucket_entries;
        self.object_entries = object_entries;
    }
}
