//! TTL cache of book records.
//!
//! The cache is a plain single-owner structure: it takes `&mut self` and the
//! caller supplies "now". [`Shelf`](crate::Shelf) owns one behind its lock, so
//! every read-then-write sequence here runs inside that critical section.
//!
//! Freshness is a fixed window. A hit never extends an entry's lifetime; only
//! a successful fetch writes a new expiry.

use indexmap::IndexMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use tracing::{debug, info};

use crate::book::{BookId, BookRecord};
use crate::config::ShelfConfig;
use crate::entry::Entry;
use crate::stats::CacheStats;

/// Maps book identifiers to fetched records with an absolute expiry.
///
/// # Example
/// ```
/// use reading_shelf::{BookId, BookRecord, TtlCache};
/// use std::time::{Duration, Instant};
///
/// let mut cache = TtlCache::new(Duration::from_secs(60));
/// let id = BookId::new("B1");
/// let now = Instant::now();
///
/// let fetched = cache
///     .get_or_fetch(&id, now, |id| Ok::<_, ()>(BookRecord::new(id.clone(), "Dune")))
///     .unwrap();
/// assert_eq!(fetched.title, "Dune");
///
/// // Served from the cache: the fetch closure is not called.
/// let cached = cache
///     .get_or_fetch(&id, now + Duration::from_secs(59), |_| Err(()))
///     .unwrap();
/// assert_eq!(cached.title, "Dune");
/// ```
#[derive(Debug)]
pub struct TtlCache {
    /// Entries in first-fetch order.
    entries: IndexMap<BookId, Entry>,

    ttl: Duration,

    stats: Arc<CacheStats>,
}

impl TtlCache {
    /// Create an empty cache whose entries live for `ttl`.
    pub fn new(ttl: Duration) -> Self {
        Self {
            entries: IndexMap::new(),
            ttl,
            stats: Arc::new(CacheStats::new()),
        }
    }

    pub fn from_config(config: &ShelfConfig) -> Self {
        Self::new(config.ttl)
    }

    /// Return the cached record for `id`, fetching it on a miss or expiry.
    ///
    /// A successful fetch is stored with expiry `now + ttl`. A failed fetch is
    /// returned unchanged, nothing is cached, and any stale entry for `id` is
    /// dropped.
    pub fn get_or_fetch<E>(
        &mut self,
        id: &BookId,
        now: Instant,
        fetch: impl FnOnce(&BookId) -> Result<BookRecord, E>,
    ) -> Result<Arc<BookRecord>, E> {
        match self.entries.get(id) {
            Some(entry) if !entry.is_expired_at(now) => {
                debug!(%id, "book served from cache");
                self.stats.record_hit();
                return Ok(Arc::clone(entry.record()));
            }
            Some(_) => {
                debug!(%id, "cached book expired");
                self.stats.record_expiration();
            }
            None => self.stats.record_miss(),
        }

        match fetch(id) {
            Ok(record) => {
                let record = Arc::new(record);
                self.entries.insert(
                    id.clone(),
                    Entry::fetched_at(Arc::clone(&record), now, self.ttl),
                );
                self.stats.record_fetch();
                self.stats.set_size(self.entries.len());
                info!(%id, "book loaded from lookup service");
                Ok(record)
            }
            Err(err) => {
                if self.entries.shift_remove(id).is_some() {
                    self.stats.set_size(self.entries.len());
                }
                self.stats.record_failed_fetch();
                Err(err)
            }
        }
    }

    /// Return a valid cached record without fetching or counting a request.
    pub fn peek(&self, id: &BookId, now: Instant) -> Option<Arc<BookRecord>> {
        self.entries
            .get(id)
            .filter(|entry| !entry.is_expired_at(now))
            .map(|entry| Arc::clone(entry.record()))
    }

    /// Drop the entry for `id`. Returns `true` if one existed.
    pub fn invalidate(&mut self, id: &BookId) -> bool {
        let existed = self.entries.shift_remove(id).is_some();
        if existed {
            self.stats.record_invalidation();
            self.stats.set_size(self.entries.len());
        }
        existed
    }

    /// Remove every entry.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.stats.record_clear();
        self.stats.set_size(0);
    }

    /// Remove entries that are stale at `now`, returning how many went.
    ///
    /// Expiry is otherwise lazy; nothing calls this in the background.
    pub fn purge_expired(&mut self, now: Instant) -> usize {
        let before = self.entries.len();
        self.entries.retain(|_, entry| !entry.is_expired_at(now));
        let removed = before - self.entries.len();
        if removed > 0 {
            self.stats.set_size(self.entries.len());
        }
        removed
    }

    /// Number of entries, including stale ones not yet touched.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Shared handle to the counters.
    pub fn stats(&self) -> Arc<CacheStats> {
        Arc::clone(&self.stats)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    const TTL: Duration = Duration::from_secs(60);

    fn fetcher<'a>(
        calls: &'a Cell<u32>,
        title: &'a str,
    ) -> impl FnOnce(&BookId) -> Result<BookRecord, String> + 'a {
        move |id: &BookId| {
            calls.set(calls.get() + 1);
            Ok(BookRecord::new(id.clone(), title))
        }
    }

    #[test]
    fn test_miss_then_hit() {
        let mut cache = TtlCache::new(TTL);
        let id = BookId::new("B1");
        let now = Instant::now();
        let calls = Cell::new(0);

        let first = cache.get_or_fetch(&id, now, fetcher(&calls, "Dune")).unwrap();
        let second = cache.get_or_fetch(&id, now, fetcher(&calls, "Dune")).unwrap();

        assert_eq!(calls.get(), 1);
        assert!(Arc::ptr_eq(&first, &second));

        let stats = cache.stats().snapshot();
        assert_eq!(stats.misses, 1);
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.fetches, 1);
        assert_eq!(stats.size, 1);
    }

    #[test]
    fn test_fresh_just_before_ttl_and_refetched_after() {
        let mut cache = TtlCache::new(TTL);
        let id = BookId::new("B1");
        let start = Instant::now();
        let epsilon = Duration::from_millis(1);
        let calls = Cell::new(0);

        cache.get_or_fetch(&id, start, fetcher(&calls, "v1")).unwrap();

        let cached = cache
            .get_or_fetch(&id, start + TTL - epsilon, fetcher(&calls, "v2"))
            .unwrap();
        assert_eq!(cached.title, "v1");
        assert_eq!(calls.get(), 1);

        let refreshed = cache
            .get_or_fetch(&id, start + TTL + epsilon, fetcher(&calls, "v2"))
            .unwrap();
        assert_eq!(refreshed.title, "v2");
        assert_eq!(calls.get(), 2);
        assert_eq!(cache.stats().expirations(), 1);
    }

    #[test]
    fn test_hit_does_not_extend_ttl() {
        let mut cache = TtlCache::new(TTL);
        let id = BookId::new("B1");
        let start = Instant::now();
        let calls = Cell::new(0);

        cache.get_or_fetch(&id, start, fetcher(&calls, "v1")).unwrap();
        cache
            .get_or_fetch(&id, start + Duration::from_secs(50), fetcher(&calls, "v1"))
            .unwrap();
        cache
            .get_or_fetch(&id, start + Duration::from_secs(61), fetcher(&calls, "v1"))
            .unwrap();

        assert_eq!(calls.get(), 2);
    }

    #[test]
    fn test_failed_fetch_is_not_cached() {
        let mut cache = TtlCache::new(TTL);
        let id = BookId::new("gone");
        let now = Instant::now();

        let result = cache.get_or_fetch(&id, now, |_| Err::<BookRecord, _>("missing"));
        assert_eq!(result.unwrap_err(), "missing");
        assert!(cache.is_empty());
        assert_eq!(cache.stats().failed_fetches(), 1);
    }

    #[test]
    fn test_failed_refresh_drops_stale_entry() {
        let mut cache = TtlCache::new(TTL);
        let id = BookId::new("B1");
        let start = Instant::now();
        let calls = Cell::new(0);

        cache.get_or_fetch(&id, start, fetcher(&calls, "v1")).unwrap();
        let later = start + TTL;
        let result = cache.get_or_fetch(&id, later, |_| Err::<BookRecord, _>("deleted"));

        assert!(result.is_err());
        assert!(cache.is_empty());
        assert_eq!(cache.stats().size(), 0);
    }

    #[test]
    fn test_peek_ignores_stale_entries() {
        let mut cache = TtlCache::new(TTL);
        let id = BookId::new("B1");
        let start = Instant::now();
        let calls = Cell::new(0);

        assert!(cache.peek(&id, start).is_none());
        cache.get_or_fetch(&id, start, fetcher(&calls, "v1")).unwrap();
        assert!(cache.peek(&id, start).is_some());
        assert!(cache.peek(&id, start + TTL).is_none());
        assert_eq!(cache.stats().hits(), 0);
    }

    #[test]
    fn test_invalidate_forces_refetch() {
        let mut cache = TtlCache::new(TTL);
        let id = BookId::new("B1");
        let now = Instant::now();
        let calls = Cell::new(0);

        cache.get_or_fetch(&id, now, fetcher(&calls, "v1")).unwrap();
        assert!(cache.invalidate(&id));
        assert!(!cache.invalidate(&id));

        cache.get_or_fetch(&id, now, fetcher(&calls, "v1")).unwrap();
        assert_eq!(calls.get(), 2);
        assert_eq!(cache.stats().invalidations(), 1);
    }

    #[test]
    fn test_clear_is_idempotent() {
        let mut cache = TtlCache::new(TTL);
        let now = Instant::now();
        let calls = Cell::new(0);

        for id in ["B1", "B2", "B3"] {
            cache
                .get_or_fetch(&BookId::new(id), now, fetcher(&calls, "t"))
                .unwrap();
        }
        assert_eq!(cache.len(), 3);

        cache.clear();
        cache.clear();
        assert!(cache.is_empty());
        assert_eq!(cache.stats().clears(), 2);
    }

    #[test]
    fn test_purge_expired() {
        let mut cache = TtlCache::new(TTL);
        let start = Instant::now();
        let calls = Cell::new(0);

        cache
            .get_or_fetch(&BookId::new("old"), start, fetcher(&calls, "t"))
            .unwrap();
        cache
            .get_or_fetch(
                &BookId::new("new"),
                start + Duration::from_secs(30),
                fetcher(&calls, "t"),
            )
            .unwrap();

        let removed = cache.purge_expired(start + Duration::from_secs(61));
        assert_eq!(removed, 1);
        assert_eq!(cache.len(), 1);
        assert!(cache
            .peek(&BookId::new("new"), start + Duration::from_secs(61))
            .is_some());
    }

    #[test]
    fn test_zero_ttl_always_fetches() {
        let mut cache = TtlCache::new(Duration::ZERO);
        let id = BookId::new("B1");
        let now = Instant::now();
        let calls = Cell::new(0);

        cache.get_or_fetch(&id, now, fetcher(&calls, "t")).unwrap();
        cache.get_or_fetch(&id, now, fetcher(&calls, "t")).unwrap();
        assert_eq!(calls.get(), 2);
    }

    #[test]
    fn test_huge_ttl_caches_without_overflow() {
        let mut cache = TtlCache::new(Duration::from_secs(u64::MAX));
        let id = BookId::new("B1");
        let now = Instant::now();
        let calls = Cell::new(0);

        cache.get_or_fetch(&id, now, fetcher(&calls, "Dune")).unwrap();
        let later = now + Duration::from_secs(10 * 365 * 24 * 3600);
        cache.get_or_fetch(&id, later, fetcher(&calls, "Dune")).unwrap();

        assert_eq!(calls.get(), 1);
        assert_eq!(cache.purge_expired(later), 0);
    }
}
