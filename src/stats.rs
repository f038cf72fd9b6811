//! Statistics for the book cache.
//!
//! Counters are atomic so they can be read without taking the shelf lock.

use std::sync::atomic::{AtomicU64, Ordering};

/// Counters describing how well the cache is saving lookups.
///
/// Use `Shelf::cache_stats()` to get a snapshot.
#[derive(Debug, Default)]
pub struct CacheStats {
    /// Requests answered from a valid entry.
    hits: AtomicU64,

    /// Requests for identifiers with no entry at all.
    misses: AtomicU64,

    /// Requests that found a stale entry.
    expirations: AtomicU64,

    /// Successful lookups stored in the cache.
    fetches: AtomicU64,

    /// Lookups that failed and were not cached.
    failed_fetches: AtomicU64,

    /// Entries dropped by explicit invalidation.
    invalidations: AtomicU64,

    /// Number of times the whole cache was cleared.
    clears: AtomicU64,

    /// Current number of entries, valid or stale.
    size: AtomicU64,
}

impl CacheStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_hit(&self) {
        self.hits.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_miss(&self) {
        self.misses.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_expiration(&self) {
        self.expirations.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_fetch(&self) {
        self.fetches.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_failed_fetch(&self) {
        self.failed_fetches.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_invalidation(&self) {
        self.invalidations.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_clear(&self) {
        self.clears.fetch_add(1, Ordering::Relaxed);
    }

    pub fn set_size(&self, size: usize) {
        self.size.store(size as u64, Ordering::Relaxed);
    }

    pub fn hits(&self) -> u64 {
        self.hits.load(Ordering::Relaxed)
    }

    pub fn misses(&self) -> u64 {
        self.misses.load(Ordering::Relaxed)
    }

    pub fn expirations(&self) -> u64 {
        self.expirations.load(Ordering::Relaxed)
    }

    pub fn fetches(&self) -> u64 {
        self.fetches.load(Ordering::Relaxed)
    }

    pub fn failed_fetches(&self) -> u64 {
        self.failed_fetches.load(Ordering::Relaxed)
    }

    pub fn invalidations(&self) -> u64 {
        self.invalidations.load(Ordering::Relaxed)
    }

    pub fn clears(&self) -> u64 {
        self.clears.load(Ordering::Relaxed)
    }

    pub fn size(&self) -> u64 {
        self.size.load(Ordering::Relaxed)
    }

    /// Share of requests served without a lookup, as a percentage.
    /// Stale entries count against the hit rate.
    pub fn hit_rate(&self) -> f64 {
        let hits = self.hits();
        let total = hits + self.misses() + self.expirations();
        if total == 0 {
            0.0
        } else {
            (hits as f64 / total as f64) * 100.0
        }
    }

    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            hits: self.hits(),
            misses: self.misses(),
            expirations: self.expirations(),
            fetches: self.fetches(),
            failed_fetches: self.failed_fetches(),
            invalidations: self.invalidations(),
            clears: self.clears(),
            size: self.size(),
            hit_rate: self.hit_rate(),
        }
    }
}

/// A point-in-time copy of [`CacheStats`].
#[derive(Debug, Clone, PartialEq)]
pub struct StatsSnapshot {
    pub hits: u64,
    pub misses: u64,
    pub expirations: u64,
    pub fetches: u64,
    pub failed_fetches: u64,
    pub invalidations: u64,
    pub clears: u64,
    pub size: u64,
    pub hit_rate: f64,
}
