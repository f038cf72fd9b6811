//! Book identifiers and the metadata records the shelf materializes.

use std::fmt;

/// Opaque key identifying a book in the backing store.
///
/// The shelf never interprets the identifier; it is only compared, hashed and
/// handed to the lookup service.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BookId(String);

impl BookId {
    /// Create an identifier from any string-like value.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Parse an identifier from user input.
    ///
    /// Surrounding whitespace is trimmed. Returns `None` for blank input.
    pub fn parse(input: &str) -> Option<Self> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(Self(trimmed.to_string()))
        }
    }

    /// Borrow the identifier as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for BookId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for BookId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for BookId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl AsRef<str> for BookId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Metadata for a single book as returned by the lookup service.
///
/// Records are immutable once fetched. The shelf only ever holds transient
/// copies, shared through `Arc` by the cache.
///
/// # Example
/// ```
/// use reading_shelf::BookRecord;
///
/// let book = BookRecord::new("B1", "Dune")
///     .with_authors(["Frank Herbert"])
///     .with_genres(["Science Fiction"])
///     .with_page_count(412);
///
/// assert_eq!(book.title, "Dune");
/// assert_eq!(book.page_count, Some(412));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookRecord {
    pub id: BookId,
    pub title: String,
    pub authors: Vec<String>,
    pub genres: Vec<String>,
    pub description: Option<String>,
    pub page_count: Option<u32>,
    /// Publication date or year, as free-form text.
    pub published: Option<String>,
    /// Store-side rating, 1 to 5.
    pub rating: Option<u8>,
}

impl BookRecord {
    /// Create a record with only the required fields set.
    pub fn new(id: impl Into<BookId>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            authors: Vec::new(),
            genres: Vec::new(),
            description: None,
            page_count: None,
            published: None,
            rating: None,
        }
    }

    pub fn with_authors<I, S>(mut self, authors: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.authors = authors.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_genres<I, S>(mut self, genres: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.genres = genres.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_page_count(mut self, pages: u32) -> Self {
        self.page_count = Some(pages);
        self
    }

    pub fn with_published(mut self, published: impl Into<String>) -> Self {
        self.published = Some(published.into());
        self
    }

    /// Set the store-side rating. Values outside 1..=5 are clamped.
    pub fn with_rating(mut self, rating: u8) -> Self {
        self.rating = Some(rating.clamp(1, 5));
        self
    }

    /// Authors joined for display, e.g. `"Neil Gaiman, Terry Pratchett"`.
    pub fn author_line(&self) -> String {
        self.authors.join(", ")
    }
}
