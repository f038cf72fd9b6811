//! # Reading Shelf
//!
//! Track books through to-be-read → currently-reading → finished, with a
//! TTL cache in front of the book store so the same record is not looked up
//! over and over.
//!
//! ## Features
//!
//! - **Strict lifecycle**: a book is on at most one list, and only moves
//!   forward; removal from any list is always allowed
//! - **TTL cache**: fixed-window freshness with explicit invalidation
//! - **All-or-nothing operations**: books are resolved before membership
//!   changes, so a failed lookup changes nothing
//! - **Thread-safe**: one lock per shelf; clone a `Shelf` to share it
//!
//! ## Quick Start
//!
//! ```rust
//! use reading_shelf::{BookId, BookRecord, MemoryCatalog, Shelf, ShelfConfig, ShelfList};
//! use std::sync::Arc;
//! use std::time::Duration;
//!
//! let catalog = Arc::new(MemoryCatalog::with_books([
//!     BookRecord::new("B1", "The Dispossessed").with_authors(["Ursula K. Le Guin"]),
//! ]));
//!
//! let config = ShelfConfig::new().ttl(Duration::from_secs(300)).build();
//! let shelf = Shelf::new(config, catalog.clone());
//!
//! let id = BookId::new("B1");
//! shelf.add_to_be_read(&id).unwrap();
//! shelf.begin_reading(&id).unwrap();
//!
//! let reading = shelf.get_list(ShelfList::CurrentlyReading).unwrap();
//! assert_eq!(reading[0].title, "The Dispossessed");
//!
//! // Both the add and the move were answered by a single lookup.
//! assert_eq!(catalog.lookups(), 1);
//! ```

pub mod book;
pub mod cache;
pub mod clock;
pub mod config;
pub mod error;
pub mod list;
pub mod lookup;
pub mod recommend;
pub mod shelf;
pub mod stats;

pub use book::{BookId, BookRecord};
pub use cache::TtlCache;
pub use clock::{Clock, ManualClock, SystemClock};
pub use config::ShelfConfig;
pub use error::{ShelfError, ShelfResult};
pub use list::{BookStatus, ShelfList};
pub use lookup::{BookLookup, LookupError, MemoryCatalog};
pub use recommend::{AffinityRecommender, Basis, RatedBook, Recommendation, RecommendationPolicy};
pub use shelf::{Shelf, ShelfBuilder, ShelfSnapshot};
pub use stats::{CacheStats, StatsSnapshot};

pub(crate) mod entry;

// Server/client protocol support
pub mod cli;
pub mod command;
pub mod utils;

pub use cli::{Cli, ClientCommand, ServerArgs};
pub use command::{Command, CommandError, Request};
