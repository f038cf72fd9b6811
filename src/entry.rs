//! Cache entry pairing a book record with its expiry.

use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::book::BookRecord;

/// A cached record and the instant after which it is stale.
///
/// Entries are replaced wholesale on refresh, never updated in place.
#[derive(Debug, Clone)]
pub struct Entry {
    /// The cached record, shared with callers.
    pub(crate) record: Arc<BookRecord>,

    /// When this entry stops being valid. `None` if `now + ttl` does not fit
    /// in an `Instant`; such an entry never expires.
    pub(crate) expires_at: Option<Instant>,
}

impl Entry {
    /// Create an entry fetched at `now` that lives for `ttl`.
    pub fn fetched_at(record: Arc<BookRecord>, now: Instant, ttl: Duration) -> Self {
        Self {
            record,
            expires_at: now.checked_add(ttl),
        }
    }

    /// An entry is valid iff `now < expires_at`.
    pub fn is_expired_at(&self, now: Instant) -> bool {
        self.expires_at.is_some_and(|expires_at| now >= expires_at)
    }

    pub fn record(&self) -> &Arc<BookRecord> {
        &self.record
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record() -> Arc<BookRecord> {
        Arc::new(BookRecord::new("B1", "Dune"))
    }

    #[test]
    fn test_entry_valid_before_expiry() {
        let now = Instant::now();
        let entry = Entry::fetched_at(record(), now, Duration::from_secs(60));
        assert!(!entry.is_expired_at(now));
        assert!(!entry.is_expired_at(now + Duration::from_secs(59)));
    }

    #[test]
    fn test_entry_expired_at_boundary() {
        let now = Instant::now();
        let entry = Entry::fetched_at(record(), now, Duration::from_secs(60));
        assert!(entry.is_expired_at(now + Duration::from_secs(60)));
        assert!(entry.is_expired_at(now + Duration::from_secs(61)));
    }

    #[test]
    fn test_zero_ttl_is_immediately_stale() {
        let now = Instant::now();
        let entry = Entry::fetched_at(record(), now, Duration::ZERO);
        assert!(entry.is_expired_at(now));
    }

    #[test]
    fn test_unrepresentable_expiry_never_expires() {
        let now = Instant::now();
        let entry = Entry::fetched_at(record(), now, Duration::from_secs(u64::MAX));
        assert!(entry.expires_at.is_none());
        assert!(!entry.is_expired_at(now + Duration::from_secs(365 * 24 * 3600)));
    }
}
