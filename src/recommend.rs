//! Recommendations derived from the finished list.
//!
//! The shelf does not search for books itself. A [`Recommendation`] is a
//! query the book-search client can run, ranked by how strongly the reader's
//! finished books point at it.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::book::BookRecord;

/// Weight given to a finished book nobody has rated.
pub const UNRATED_WEIGHT: u32 = 3;

/// A finished book together with the reader's own rating, if any.
#[derive(Debug, Clone)]
pub struct RatedBook {
    pub record: Arc<BookRecord>,
    pub shelf_rating: Option<u8>,
}

impl RatedBook {
    /// The reader's rating, falling back to the store's, then to neutral.
    pub fn weight(&self) -> u32 {
        self.shelf_rating
            .or(self.record.rating)
            .map_or(UNRATED_WEIGHT, u32::from)
    }
}

/// What a recommendation is based on.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Basis {
    Genre(String),
    Author(String),
}

impl Basis {
    fn name(&self) -> &str {
        match self {
            Basis::Genre(name) | Basis::Author(name) => name,
        }
    }
}

impl fmt::Display for Basis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Basis::Genre(genre) => write!(f, "genre {genre}"),
            Basis::Author(author) => write!(f, "author {author}"),
        }
    }
}

/// A ranked search suggestion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Recommendation {
    /// Query in the search API's syntax, e.g. `subject:Fantasy`.
    pub query: String,
    pub basis: Basis,
    pub score: u32,
}

impl Recommendation {
    pub fn new(basis: Basis, score: u32) -> Self {
        let query = match &basis {
            Basis::Genre(genre) => format!("subject:{genre}"),
            Basis::Author(author) => format!("inauthor:{author}"),
        };
        Self {
            query,
            basis,
            score,
        }
    }
}

/// Turns finished books into suggestions.
pub trait RecommendationPolicy: Send + Sync {
    fn recommend(&self, finished: &[RatedBook]) -> Vec<Recommendation>;
}

/// Scores every genre and author across the finished list by rating weight.
///
/// Ties are broken by basis name so the output is deterministic.
#[derive(Debug, Clone)]
pub struct AffinityRecommender {
    limit: usize,
}

impl AffinityRecommender {
    pub fn new(limit: usize) -> Self {
        Self { limit }
    }
}

impl Default for AffinityRecommender {
    fn default() -> Self {
        Self::new(crate::config::DEFAULT_RECOMMENDATION_LIMIT)
    }
}

impl RecommendationPolicy for AffinityRecommender {
    fn recommend(&self, finished: &[RatedBook]) -> Vec<Recommendation> {
        let mut scores: HashMap<Basis, u32> = HashMap::new();

        for book in finished {
            let weight = book.weight();
            let genres = book.record.genres.iter().cloned().map(Basis::Genre);
            let authors = book.record.authors.iter().cloned().map(Basis::Author);
            for basis in genres.chain(authors) {
                *scores.entry(basis).or_insert(0) += weight;
            }
        }

        let mut ranked: Vec<_> = scores.into_iter().collect();
        ranked.sort_by(|(a, a_score), (b, b_score)| {
            b_score
                .cmp(a_score)
                .then_with(|| a.name().cmp(b.name()))
                .then_with(|| a.cmp(b))
        });

        ranked
            .into_iter()
            .take(self.limit)
            .map(|(basis, score)| Recommendation::new(basis, score))
            .collect()
    }
}
