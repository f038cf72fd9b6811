//! The three shelf lists and the per-book status derived from them.

use std::fmt;
use std::str::FromStr;

use crate::error::ShelfError;

/// One of the three lists on a shelf.
///
/// Parsing accepts the canonical snake_case names and a few common aliases:
///
/// ```
/// use reading_shelf::ShelfList;
///
/// assert_eq!("tbr".parse::<ShelfList>().unwrap(), ShelfList::ToBeRead);
/// assert_eq!("currentlyReading".parse::<ShelfList>().unwrap(), ShelfList::CurrentlyReading);
/// assert!("wishlist".parse::<ShelfList>().is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ShelfList {
    ToBeRead,
    CurrentlyReading,
    Finished,
}

impl ShelfList {
    /// All lists, in lifecycle order.
    pub const ALL: [ShelfList; 3] = [
        ShelfList::ToBeRead,
        ShelfList::CurrentlyReading,
        ShelfList::Finished,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ShelfList::ToBeRead => "to_be_read",
            ShelfList::CurrentlyReading => "currently_reading",
            ShelfList::Finished => "finished",
        }
    }

    /// The status a book on this list has.
    pub fn status(&self) -> BookStatus {
        match self {
            ShelfList::ToBeRead => BookStatus::ToBeRead,
            ShelfList::CurrentlyReading => BookStatus::CurrentlyReading,
            ShelfList::Finished => BookStatus::Finished,
        }
    }
}

impl fmt::Display for ShelfList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ShelfList {
    type Err = ShelfError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "to_be_read" | "toBeRead" | "tbr" | "reading_list" => Ok(ShelfList::ToBeRead),
            "currently_reading" | "currentlyReading" | "current_reads" | "reading" => {
                Ok(ShelfList::CurrentlyReading)
            }
            "finished" | "finished_reads" | "completed" | "read" => Ok(ShelfList::Finished),
            other => Err(ShelfError::InvalidListName(other.to_string())),
        }
    }
}

/// Where a book stands relative to one shelf.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BookStatus {
    Absent,
    ToBeRead,
    CurrentlyReading,
    Finished,
}

impl BookStatus {
    /// The list holding the book, if any.
    pub fn list(&self) -> Option<ShelfList> {
        match self {
            BookStatus::Absent => None,
            BookStatus::ToBeRead => Some(ShelfList::ToBeRead),
            BookStatus::CurrentlyReading => Some(ShelfList::CurrentlyReading),
            BookStatus::Finished => Some(ShelfList::Finished),
        }
    }
}

impl From<Option<ShelfList>> for BookStatus {
    fn from(list: Option<ShelfList>) -> Self {
        list.map_or(BookStatus::Absent, |list| list.status())
    }
}

impl fmt::Display for BookStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.list() {
            Some(list) => f.write_str(list.as_str()),
            None => f.write_str("absent"),
        }
    }
}
