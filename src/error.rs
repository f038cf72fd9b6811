//! Error types for shelf operations.
//!
//! Every error leaves the shelf consistent and usable; none are retried.

use thiserror::Error;

use crate::book::BookId;
use crate::list::{BookStatus, ShelfList};
use crate::lookup::LookupError;

/// The error type for shelf operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ShelfError {
    /// The identifier could not be resolved by the cache or the lookup service.
    #[error("book not found: '{0}'")]
    NotFound(BookId),

    /// The book is already on `list`.
    #[error("book '{id}' is already on {list}")]
    AlreadyPresent { id: BookId, list: ShelfList },

    /// A forward transition required the book to be on `required`.
    #[error("book '{id}' must be on {required} (currently {status})")]
    InvalidTransition {
        id: BookId,
        required: ShelfList,
        status: BookStatus,
    },

    /// Removal target is not on the named list.
    #[error("book '{id}' is not on {list}")]
    NotOnList { id: BookId, list: ShelfList },

    /// The book is on none of the lists.
    #[error("book '{0}' is not on the shelf")]
    NotOnShelf(BookId),

    /// A list name from text input did not match any list.
    #[error("invalid list name: '{0}'")]
    InvalidListName(String),

    /// Ratings run from 1 to 5.
    #[error("invalid rating {0}: must be between 1 and 5")]
    InvalidRating(u8),

    /// The lookup service failed or timed out.
    #[error("lookup for '{id}' unavailable: {reason}")]
    Unavailable { id: BookId, reason: String },
}

impl ShelfError {
    /// Translate a lookup failure for `id`.
    pub(crate) fn from_lookup(id: &BookId, err: LookupError) -> Self {
        match err {
            LookupError::NotFound(_) => ShelfError::NotFound(id.clone()),
            other @ (LookupError::Timeout(_) | LookupError::Unavailable(_)) => {
                ShelfError::Unavailable {
                    id: id.clone(),
                    reason: other.to_string(),
                }
            }
        }
    }

    /// Whether the failure came from the lookup side rather than shelf rules.
    pub fn is_lookup_failure(&self) -> bool {
        matches!(self, ShelfError::NotFound(_) | ShelfError::Unavailable { .. })
    }
}

/// A specialized Result type for shelf operations.
pub type ShelfResult<T> = Result<T, ShelfError>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_error_display() {
        let err = ShelfError::AlreadyPresent {
            id: BookId::new("B1"),
            list: ShelfList::CurrentlyReading,
        };
        assert_eq!(err.to_string(), "book 'B1' is already on currently_reading");

        let err = ShelfError::InvalidTransition {
            id: BookId::new("B1"),
            required: ShelfList::ToBeRead,
            status: BookStatus::Absent,
        };
        assert_eq!(
            err.to_string(),
            "book 'B1' must be on to_be_read (currently absent)"
        );

        let err = ShelfError::InvalidRating(7);
        assert_eq!(err.to_string(), "invalid rating 7: must be between 1 and 5");
    }

    #[test]
    fn test_lookup_error_conversion() {
        let id = BookId::new("B3");

        let err = ShelfError::from_lookup(&id, LookupError::NotFound(id.clone()));
        assert_eq!(err, ShelfError::NotFound(id.clone()));

        let err = ShelfError::from_lookup(&id, LookupError::Timeout(Duration::from_secs(1)));
        assert!(matches!(err, ShelfError::Unavailable { .. }));
        assert!(err.is_lookup_failure());

        let err = ShelfError::from_lookup(&id, LookupError::Unavailable("reset".into()));
        assert_eq!(
            err.to_string(),
            "lookup for 'B3' unavailable: lookup service unavailable: reset"
        );
    }
}
