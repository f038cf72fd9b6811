//! The book lookup boundary and an in-memory catalog implementing it.
//!
//! The shelf only ever talks to the backing store through [`BookLookup`].
//! [`MemoryCatalog`] is the store used by the server binary and by tests.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{PoisonError, RwLock};
use std::time::Duration;

use thiserror::Error;
use tracing::debug;

use crate::book::{BookId, BookRecord};

/// Failure modes of a lookup.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LookupError {
    /// The store confirmed that no such book exists.
    #[error("book '{0}' does not exist")]
    NotFound(BookId),

    /// The store did not answer within the caller-supplied timeout.
    #[error("lookup timed out after {0:?}")]
    Timeout(Duration),

    /// Transport or store failure, distinct from a confirmed absence.
    #[error("lookup service unavailable: {0}")]
    Unavailable(String),
}

/// Authoritative source of book records.
///
/// Implementations must honour `timeout` when it is set and report expiry as
/// [`LookupError::Timeout`]. Lookups are never retried by the caller.
pub trait BookLookup: Send + Sync {
    fn lookup(&self, id: &BookId, timeout: Option<Duration>) -> Result<BookRecord, LookupError>;
}

/// Thread-safe in-memory book store.
///
/// # Example
/// ```
/// use reading_shelf::{BookId, BookLookup, BookRecord, MemoryCatalog};
///
/// let catalog = MemoryCatalog::new();
/// catalog.register(BookRecord::new("B1", "Dune"));
///
/// let book = catalog.lookup(&BookId::new("B1"), None).unwrap();
/// assert_eq!(book.title, "Dune");
/// assert_eq!(catalog.lookups(), 1);
/// ```
#[derive(Debug, Default)]
pub struct MemoryCatalog {
    books: RwLock<HashMap<BookId, BookRecord>>,
    lookups: AtomicU64,
}

impl MemoryCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a catalog pre-populated with `books`.
    pub fn with_books(books: impl IntoIterator<Item = BookRecord>) -> Self {
        let catalog = Self::new();
        for book in books {
            catalog.register(book);
        }
        catalog
    }

    /// Insert or replace a record. Returns `true` if a record was replaced.
    pub fn register(&self, book: BookRecord) -> bool {
        let mut books = self.books.write().unwrap_or_else(PoisonError::into_inner);
        books.insert(book.id.clone(), book).is_some()
    }

    /// Delete a record. Returns `true` if it existed.
    pub fn unregister(&self, id: &BookId) -> bool {
        let mut books = self.books.write().unwrap_or_else(PoisonError::into_inner);
        books.remove(id).is_some()
    }

    /// Whether the catalog holds `id`. Not counted as a lookup.
    pub fn contains(&self, id: &BookId) -> bool {
        let books = self.books.read().unwrap_or_else(PoisonError::into_inner);
        books.contains_key(id)
    }

    pub fn len(&self) -> usize {
        let books = self.books.read().unwrap_or_else(PoisonError::into_inner);
        books.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of lookups served so far, successful or not.
    pub fn lookups(&self) -> u64 {
        self.lookups.load(Ordering::Relaxed)
    }
}

impl BookLookup for MemoryCatalog {
    fn lookup(&self, id: &BookId, _timeout: Option<Duration>) -> Result<BookRecord, LookupError> {
        self.lookups.fetch_add(1, Ordering::Relaxed);
        let books = self.books.read().unwrap_or_else(PoisonError::into_inner);
        match books.get(id) {
            Some(book) => {
                debug!(%id, "catalog hit");
                Ok(book.clone())
            }
            None => Err(LookupError::NotFound(id.clone())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_missing_is_not_found() {
        let catalog = MemoryCatalog::new();
        let err = catalog.lookup(&BookId::new("nope"), None).unwrap_err();
        assert_eq!(err, LookupError::NotFound(BookId::new("nope")));
        assert_eq!(catalog.lookups(), 1);
    }

    #[test]
    fn test_register_replaces_and_unregister_removes() {
        let catalog = MemoryCatalog::new();
        assert!(!catalog.register(BookRecord::new("B1", "Draft")));
        assert!(catalog.register(BookRecord::new("B1", "Final")));
        assert_eq!(catalog.len(), 1);

        let book = catalog.lookup(&BookId::new("B1"), None).unwrap();
        assert_eq!(book.title, "Final");

        assert!(catalog.unregister(&BookId::new("B1")));
        assert!(!catalog.unregister(&BookId::new("B1")));
        assert!(catalog.is_empty());
    }

    #[test]
    fn test_contains_does_not_count_as_lookup() {
        let catalog = MemoryCatalog::with_books([BookRecord::new("B1", "Dune")]);
        assert!(catalog.contains(&BookId::new("B1")));
        assert_eq!(catalog.lookups(), 0);
    }

    #[test]
    fn test_error_display() {
        let err = LookupError::Timeout(Duration::from_millis(250));
        assert_eq!(err.to_string(), "lookup timed out after 250ms");

        let err = LookupError::NotFound(BookId::new("B9"));
        assert_eq!(err.to_string(), "book 'B9' does not exist");
    }
}
