//! The shelf: three reading lists under a forward-only state machine.
//!
//! A book moves `to_be_read → currently_reading → finished`, and can be
//! removed from whichever list holds it at any point. An identifier is on at
//! most one list at a time.
//!
//! Every operation takes the shelf's single lock for its whole duration,
//! including the lookup call, so check-then-act sequences are atomic. Forward
//! moves resolve the book before touching membership; a failed lookup leaves
//! the lists exactly as they were.

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tracing::{info, warn};

use crate::book::{BookId, BookRecord};
use crate::cache::TtlCache;
use crate::clock::{Clock, SystemClock};
use crate::config::ShelfConfig;
use crate::error::{ShelfError, ShelfResult};
use crate::list::{BookStatus, ShelfList};
use crate::lookup::BookLookup;
use crate::recommend::{AffinityRecommender, RatedBook, Recommendation, RecommendationPolicy};
use crate::stats::{CacheStats, StatsSnapshot};

/// A reader's shelf, backed by a TTL cache over a lookup service.
///
/// Cloning a `Shelf` creates a new handle to the same lists and cache.
///
/// # Example
/// ```
/// use reading_shelf::{BookId, BookRecord, MemoryCatalog, Shelf, ShelfConfig, ShelfList};
/// use std::sync::Arc;
///
/// let catalog = Arc::new(MemoryCatalog::with_books([BookRecord::new("B1", "Dune")]));
/// let shelf = Shelf::new(ShelfConfig::default(), catalog);
/// let id = BookId::new("B1");
///
/// shelf.add_to_be_read(&id).unwrap();
/// shelf.begin_reading(&id).unwrap();
/// shelf.finish_reading(&id).unwrap();
///
/// let finished = shelf.get_list(ShelfList::Finished).unwrap();
/// assert_eq!(finished[0].title, "Dune");
/// assert!(shelf.get_list(ShelfList::ToBeRead).unwrap().is_empty());
/// ```
#[derive(Clone)]
pub struct Shelf {
    inner: Arc<Inner>,
}

struct Inner {
    state: Mutex<State>,
    lookup: Arc<dyn BookLookup>,
    clock: Arc<dyn Clock>,
    policy: Box<dyn RecommendationPolicy>,
    config: ShelfConfig,
    /// Shared with the cache so counters are readable without the lock.
    stats: Arc<CacheStats>,
}

/// Everything guarded by the shelf lock.
#[derive(Debug)]
struct State {
    to_be_read: Vec<BookId>,
    currently_reading: Vec<BookId>,
    finished: Vec<BookId>,
    ratings: HashMap<BookId, u8>,
    cache: TtlCache,
}

impl State {
    fn new(cache: TtlCache) -> Self {
        Self {
            to_be_read: Vec::new(),
            currently_reading: Vec::new(),
            finished: Vec::new(),
            ratings: HashMap::new(),
            cache,
        }
    }

    fn list(&self, list: ShelfList) -> &Vec<BookId> {
        match list {
            ShelfList::ToBeRead => &self.to_be_read,
            ShelfList::CurrentlyReading => &self.currently_reading,
            ShelfList::Finished => &self.finished,
        }
    }

    fn list_mut(&mut self, list: ShelfList) -> &mut Vec<BookId> {
        match list {
            ShelfList::ToBeRead => &mut self.to_be_read,
            ShelfList::CurrentlyReading => &mut self.currently_reading,
            ShelfList::Finished => &mut self.finished,
        }
    }

    fn locate(&self, id: &BookId) -> Option<ShelfList> {
        ShelfList::ALL
            .into_iter()
            .find(|list| self.list(*list).contains(id))
    }

    /// Splice `id` out of `list`. Returns `false` if it was not there.
    fn take(&mut self, id: &BookId, list: ShelfList) -> bool {
        let entries = self.list_mut(list);
        match entries.iter().position(|entry| entry == id) {
            Some(pos) => {
                entries.remove(pos);
                true
            }
            None => false,
        }
    }

    fn advance(&mut self, id: &BookId, from: ShelfList, to: ShelfList) {
        if self.take(id, from) {
            self.list_mut(to).push(id.clone());
        }
    }
}

/// Membership of all three lists at one instant, without resolving records.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ShelfSnapshot {
    pub to_be_read: Vec<BookId>,
    pub currently_reading: Vec<BookId>,
    pub finished: Vec<BookId>,
}

impl ShelfSnapshot {
    pub fn get(&self, list: ShelfList) -> &[BookId] {
        match list {
            ShelfList::ToBeRead => &self.to_be_read,
            ShelfList::CurrentlyReading => &self.currently_reading,
            ShelfList::Finished => &self.finished,
        }
    }
}

/// Assembles a [`Shelf`] with a custom clock, policy or cache.
pub struct ShelfBuilder {
    config: ShelfConfig,
    lookup: Arc<dyn BookLookup>,
    clock: Arc<dyn Clock>,
    policy: Option<Box<dyn RecommendationPolicy>>,
    cache: Option<TtlCache>,
}

impl ShelfBuilder {
    /// Read "now" from `clock` instead of the system clock.
    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Replace the default [`AffinityRecommender`].
    pub fn policy(mut self, policy: impl RecommendationPolicy + 'static) -> Self {
        self.policy = Some(Box::new(policy));
        self
    }

    /// Hand the shelf a pre-built cache. Its TTL takes precedence over the
    /// configured one.
    pub fn cache(mut self, cache: TtlCache) -> Self {
        self.cache = Some(cache);
        self
    }

    pub fn build(self) -> Shelf {
        let cache = self
            .cache
            .unwrap_or_else(|| TtlCache::from_config(&self.config));
        let policy = self.policy.unwrap_or_else(|| {
            Box::new(AffinityRecommender::new(self.config.recommendation_limit))
        });
        let stats = cache.stats();

        Shelf {
            inner: Arc::new(Inner {
                state: Mutex::new(State::new(cache)),
                lookup: self.lookup,
                clock: self.clock,
                policy,
                config: self.config,
                stats,
            }),
        }
    }
}

impl Shelf {
    /// Create an empty shelf reading books from `lookup`.
    pub fn new(config: ShelfConfig, lookup: Arc<dyn BookLookup>) -> Self {
        Self::builder(config, lookup).build()
    }

    pub fn builder(config: ShelfConfig, lookup: Arc<dyn BookLookup>) -> ShelfBuilder {
        ShelfBuilder {
            config,
            lookup,
            clock: Arc::new(SystemClock),
            policy: None,
            cache: None,
        }
    }

    /// Put a book on the to-be-read list.
    ///
    /// Fails with `AlreadyPresent` if the book is on any list, naming the list
    /// that holds it.
    pub fn add_to_be_read(&self, id: &BookId) -> ShelfResult<Arc<BookRecord>> {
        let mut state = self.lock();

        if let Some(list) = state.locate(id) {
            warn!(%id, %list, "book is already on the shelf");
            return Err(ShelfError::AlreadyPresent {
                id: id.clone(),
                list,
            });
        }

        let book = self.resolve(&mut state, id)?;
        info!(%id, title = %book.title, "adding book to to_be_read");
        state.to_be_read.push(id.clone());
        Ok(book)
    }

    /// Move a book from to-be-read to currently-reading.
    pub fn begin_reading(&self, id: &BookId) -> ShelfResult<Arc<BookRecord>> {
        self.advance(id, ShelfList::ToBeRead, ShelfList::CurrentlyReading)
    }

    /// Move a book from currently-reading to finished.
    pub fn finish_reading(&self, id: &BookId) -> ShelfResult<Arc<BookRecord>> {
        self.advance(id, ShelfList::CurrentlyReading, ShelfList::Finished)
    }

    fn advance(&self, id: &BookId, from: ShelfList, to: ShelfList) -> ShelfResult<Arc<BookRecord>> {
        let mut state = self.lock();

        match state.locate(id) {
            Some(list) if list == from => {}
            Some(list) if list == to => {
                warn!(%id, %list, "book is already on the target list");
                return Err(ShelfError::AlreadyPresent {
                    id: id.clone(),
                    list,
                });
            }
            current => {
                let status = BookStatus::from(current);
                warn!(%id, %status, required = %from, "rejected transition");
                return Err(ShelfError::InvalidTransition {
                    id: id.clone(),
                    required: from,
                    status,
                });
            }
        }

        let book = self.resolve(&mut state, id)?;
        info!(%id, title = %book.title, %from, %to, "moving book");
        state.advance(id, from, to);
        Ok(book)
    }

    /// Remove a book from `list` regardless of where it is in the lifecycle.
    ///
    /// Does not consult the lookup service, so books deleted from the store
    /// can still be removed. The book's rating is dropped with it.
    pub fn remove_from_list(&self, id: &BookId, list: ShelfList) -> ShelfResult<()> {
        let mut state = self.lock();

        if !state.take(id, list) {
            warn!(%id, %list, "book is not on the list");
            return Err(ShelfError::NotOnList {
                id: id.clone(),
                list,
            });
        }

        state.ratings.remove(id);
        info!(%id, %list, "removed book");
        Ok(())
    }

    /// Resolve every book on `list`, in list order.
    ///
    /// The first lookup failure is returned and the rest of the list is not
    /// resolved. Membership is never changed.
    pub fn get_list(&self, list: ShelfList) -> ShelfResult<Vec<Arc<BookRecord>>> {
        let mut state = self.lock();
        let ids = state.list(list).clone();

        let mut books = Vec::with_capacity(ids.len());
        for id in &ids {
            books.push(self.resolve(&mut state, id)?);
        }
        Ok(books)
    }

    /// Suggestions derived from the finished list by the configured policy.
    pub fn get_recommendations(&self) -> ShelfResult<Vec<Recommendation>> {
        let finished = {
            let mut state = self.lock();
            let ids = state.finished.clone();
            let mut finished = Vec::with_capacity(ids.len());
            for id in &ids {
                let record = self.resolve(&mut state, id)?;
                finished.push(RatedBook {
                    record,
                    shelf_rating: state.ratings.get(id).copied(),
                });
            }
            finished
        };

        if finished.is_empty() {
            return Ok(Vec::new());
        }
        Ok(self.inner.policy.recommend(&finished))
    }

    /// Empty all three lists, forget ratings, and clear the cache.
    pub fn clear_shelf(&self) {
        let mut state = self.lock();
        state.to_be_read.clear();
        state.currently_reading.clear();
        state.finished.clear();
        state.ratings.clear();
        state.cache.clear();
        info!("cleared shelf and book cache");
    }

    /// Clear the cache only. The lists are untouched.
    pub fn clear_cache(&self) {
        self.lock().cache.clear();
        info!("cleared book cache");
    }

    /// Drop the cached record for `id` so the next access refetches it.
    pub fn invalidate(&self, id: &BookId) -> bool {
        self.lock().cache.invalidate(id)
    }

    /// Remove stale cache entries now rather than on next access.
    pub fn purge_expired(&self) -> usize {
        let now = self.inner.clock.now();
        self.lock().cache.purge_expired(now)
    }

    /// Record the reader's rating for a book on any list.
    pub fn rate_book(&self, id: &BookId, rating: u8) -> ShelfResult<()> {
        if !(1..=5).contains(&rating) {
            return Err(ShelfError::InvalidRating(rating));
        }

        let mut state = self.lock();
        if state.locate(id).is_none() {
            warn!(%id, "cannot rate a book that is not on the shelf");
            return Err(ShelfError::NotOnShelf(id.clone()));
        }

        state.ratings.insert(id.clone(), rating);
        info!(%id, rating, "rated book");
        Ok(())
    }

    pub fn rating(&self, id: &BookId) -> Option<u8> {
        self.lock().ratings.get(id).copied()
    }

    pub fn status(&self, id: &BookId) -> BookStatus {
        BookStatus::from(self.locate(id))
    }

    /// The list holding `id`, if any.
    pub fn locate(&self, id: &BookId) -> Option<ShelfList> {
        self.lock().locate(id)
    }

    /// Identifiers on `list`, in order, without resolving them.
    pub fn ids(&self, list: ShelfList) -> Vec<BookId> {
        self.lock().list(list).clone()
    }

    pub fn snapshot(&self) -> ShelfSnapshot {
        let state = self.lock();
        ShelfSnapshot {
            to_be_read: state.to_be_read.clone(),
            currently_reading: state.currently_reading.clone(),
            finished: state.finished.clone(),
        }
    }

    pub fn len(&self, list: ShelfList) -> usize {
        self.lock().list(list).len()
    }

    /// True when all three lists are empty.
    pub fn is_empty(&self) -> bool {
        let state = self.lock();
        ShelfList::ALL.iter().all(|list| state.list(*list).is_empty())
    }

    /// Number of cached records, including stale ones.
    pub fn cached_len(&self) -> usize {
        self.lock().cache.len()
    }

    pub fn cache_stats(&self) -> StatsSnapshot {
        self.inner.stats.snapshot()
    }

    pub fn config(&self) -> &ShelfConfig {
        &self.inner.config
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        self.inner
            .state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// Cache-or-fetch under the already-held lock.
    fn resolve(&self, state: &mut State, id: &BookId) -> ShelfResult<Arc<BookRecord>> {
        let now = self.inner.clock.now();
        let lookup = &self.inner.lookup;
        let timeout = self.inner.config.lookup_timeout;

        state
            .cache
            .get_or_fetch(id, now, |id| lookup.lookup(id, timeout))
            .map_err(|err| {
                warn!(%id, error = %err, "book lookup failed");
                ShelfError::from_lookup(id, err)
            })
    }
}

impl fmt::Debug for Shelf {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.lock();
        f.debug_struct("Shelf")
            .field("to_be_read", &state.to_be_read)
            .field("currently_reading", &state.currently_reading)
            .field("finished", &state.finished)
            .field("cached", &state.cache.len())
            .field("config", &self.inner.config)
            .finish()
    }
}
