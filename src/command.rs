//! Commands understood by the shelf server.
//!
//! [`Command`] names the verb; [`Request`] is a verb with its arguments
//! parsed and validated.

use thiserror::Error;

use crate::book::{BookId, BookRecord};
use crate::error::ShelfError;
use crate::list::ShelfList;

/// Separator for multi-valued fields such as authors and genres.
pub const FIELD_SEPARATOR: char = ';';

/// Protocol-level failures, before the shelf is involved.
#[derive(Debug, Error)]
pub enum CommandError {
    #[error("empty command")]
    Empty,

    #[error("request exceeds {0} bytes")]
    TooLong(usize),

    #[error("failed to read request: {0}")]
    Io(#[from] std::io::Error),

    #[error("unknown command '{0}'")]
    Unknown(String),

    #[error("{command} requires {argument}")]
    MissingArgument {
        command: Command,
        argument: &'static str,
    },

    #[error("invalid {argument}: '{value}'")]
    InvalidArgument {
        argument: &'static str,
        value: String,
    },

    #[error(transparent)]
    Shelf(#[from] ShelfError),
}

/// Verbs supported by the shelf server.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Ping,
    /// Add or replace a record in the server's catalog.
    Register,
    /// Delete a record from the server's catalog.
    Unregister,
    Add,
    Begin,
    Finish,
    Remove,
    List,
    Status,
    Rate,
    Recommend,
    Invalidate,
    Clear,
    Stats,
    Invalid,
}

impl Command {
    /// Parse a verb, case-insensitively. Unknown verbs map to `Invalid`.
    pub fn get(s: &str) -> Command {
        match s.to_lowercase().as_str() {
            "ping" => Command::Ping,
            "register" => Command::Register,
            "unregister" => Command::Unregister,
            "add" | "tbr" => Command::Add,
            "begin" | "start" => Command::Begin,
            "finish" | "done" => Command::Finish,
            "remove" | "rm" => Command::Remove,
            "list" | "ls" => Command::List,
            "status" => Command::Status,
            "rate" => Command::Rate,
            "recommend" | "recs" => Command::Recommend,
            "invalidate" => Command::Invalidate,
            "clear" => Command::Clear,
            "stats" | "info" => Command::Stats,
            _ => Command::Invalid,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Command::Ping => "ping",
            Command::Register => "register",
            Command::Unregister => "unregister",
            Command::Add => "add",
            Command::Begin => "begin",
            Command::Finish => "finish",
            Command::Remove => "remove",
            Command::List => "list",
            Command::Status => "status",
            Command::Rate => "rate",
            Command::Recommend => "recommend",
            Command::Invalidate => "invalidate",
            Command::Clear => "clear",
            Command::Stats => "stats",
            Command::Invalid => "invalid",
        }
    }
}

impl std::fmt::Display for Command {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A fully parsed request.
#[derive(Debug, Clone, PartialEq)]
pub enum Request {
    Ping,
    Register(BookRecord),
    Unregister(BookId),
    Add(BookId),
    Begin(BookId),
    Finish(BookId),
    Remove(BookId, ShelfList),
    List(ShelfList),
    Status(BookId),
    Rate(BookId, u8),
    Recommend,
    Invalidate(BookId),
    Clear,
    Stats,
}

impl Request {
    /// Build a request from tokens produced by
    /// [`split_request`](crate::utils::split_request).
    pub fn parse(parts: &[String]) -> Result<Request, CommandError> {
        let (verb, args) = parts.split_first().ok_or(CommandError::Empty)?;
        let command = Command::get(verb);
        let args = Args { command, args };

        let request = match command {
            Command::Ping => Request::Ping,
            Command::Register => Request::Register(args.record()?),
            Command::Unregister => Request::Unregister(args.id()?),
            Command::Add => Request::Add(args.id()?),
            Command::Begin => Request::Begin(args.id()?),
            Command::Finish => Request::Finish(args.id()?),
            Command::Remove => Request::Remove(args.id()?, args.list(1)?),
            Command::List => Request::List(args.list(0)?),
            Command::Status => Request::Status(args.id()?),
            Command::Rate => Request::Rate(args.id()?, args.rating()?),
            Command::Recommend => Request::Recommend,
            Command::Invalidate => Request::Invalidate(args.id()?),
            Command::Clear => Request::Clear,
            Command::Stats => Request::Stats,
            Command::Invalid => return Err(CommandError::Unknown(verb.clone())),
        };
        Ok(request)
    }

    pub fn command(&self) -> Command {
        match self {
            Request::Ping => Command::Ping,
            Request::Register(_) => Command::Register,
            Request::Unregister(_) => Command::Unregister,
            Request::Add(_) => Command::Add,
            Request::Begin(_) => Command::Begin,
            Request::Finish(_) => Command::Finish,
            Request::Remove(..) => Command::Remove,
            Request::List(_) => Command::List,
            Request::Status(_) => Command::Status,
            Request::Rate(..) => Command::Rate,
            Request::Recommend => Command::Recommend,
            Request::Invalidate(_) => Command::Invalidate,
            Request::Clear => Command::Clear,
            Request::Stats => Command::Stats,
        }
    }
}

/// Positional argument access with uniform errors.
struct Args<'a> {
    command: Command,
    args: &'a [String],
}

impl Args<'_> {
    fn required(&self, index: usize, argument: &'static str) -> Result<&str, CommandError> {
        self.args
            .get(index)
            .map(String::as_str)
            .ok_or(CommandError::MissingArgument {
                command: self.command,
                argument,
            })
    }

    fn id(&self) -> Result<BookId, CommandError> {
        let raw = self.required(0, "a book id")?;
        BookId::parse(raw).ok_or_else(|| CommandError::InvalidArgument {
            argument: "book id",
            value: raw.to_string(),
        })
    }

    fn list(&self, index: usize) -> Result<ShelfList, CommandError> {
        Ok(self.required(index, "a list name")?.parse()?)
    }

    fn rating(&self) -> Result<u8, CommandError> {
        let raw = self.required(1, "a rating")?;
        raw.parse().map_err(|_| CommandError::InvalidArgument {
            argument: "rating",
            value: raw.to_string(),
        })
    }

    /// `<id> <title> [authors] [genres] [pages]`
    fn record(&self) -> Result<BookRecord, CommandError> {
        let id = self.id()?;
        let title = self.required(1, "a title")?;
        let mut record = BookRecord::new(id, title)
            .with_authors(split_field(self.args.get(2)))
            .with_genres(split_field(self.args.get(3)));

        if let Some(raw) = self.args.get(4) {
            let pages = raw.parse().map_err(|_| CommandError::InvalidArgument {
                argument: "page count",
                value: raw.clone(),
            })?;
            record = record.with_page_count(pages);
        }
        Ok(record)
    }
}

fn split_field(field: Option<&String>) -> Vec<String> {
    field
        .map(|value| {
            value
                .split(FIELD_SEPARATOR)
                .map(str::trim)
                .filter(|part| !part.is_empty())
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parts(line: &str) -> Vec<String> {
        let mut buf = bytes::BytesMut::from(line);
        crate::utils::split_request(&mut buf)
    }

    #[test]
    fn test_command_verbs() {
        assert_eq!(Command::get("ADD"), Command::Add);
        assert_eq!(Command::get("start"), Command::Begin);
        assert_eq!(Command::get("rm"), Command::Remove);
        assert_eq!(Command::get("ls"), Command::List);
        assert_eq!(Command::get("shelve"), Command::Invalid);
    }

    #[test]
    fn test_parse_simple_requests() {
        assert_eq!(
            Request::parse(&parts("add B1")).unwrap(),
            Request::Add(BookId::new("B1"))
        );
        assert_eq!(
            Request::parse(&parts("remove B1 currently_reading")).unwrap(),
            Request::Remove(BookId::new("B1"), ShelfList::CurrentlyReading)
        );
        assert_eq!(
            Request::parse(&parts("list tbr")).unwrap(),
            Request::List(ShelfList::ToBeRead)
        );
        assert_eq!(
            Request::parse(&parts("rate B1 4")).unwrap(),
            Request::Rate(BookId::new("B1"), 4)
        );
        assert_eq!(Request::parse(&parts("stats")).unwrap(), Request::Stats);
    }

    #[test]
    fn test_parse_register() {
        let request =
            Request::parse(&parts(r#"register B7 "Good Omens" "Neil Gaiman; Terry Pratchett" Fantasy 288"#))
                .unwrap();
        let Request::Register(record) = request else {
            panic!("expected register");
        };
        assert_eq!(record.title, "Good Omens");
        assert_eq!(record.authors, vec!["Neil Gaiman", "Terry Pratchett"]);
        assert_eq!(record.genres, vec!["Fantasy"]);
        assert_eq!(record.page_count, Some(288));
    }

    #[test]
    fn test_parse_errors() {
        assert!(matches!(
            Request::parse(&parts("add")),
            Err(CommandError::MissingArgument {
                command: Command::Add,
                ..
            })
        ));
        assert!(matches!(
            Request::parse(&parts("remove B1 wishlist")),
            Err(CommandError::Shelf(ShelfError::InvalidListName(_)))
        ));
        assert!(matches!(
            Request::parse(&parts("rate B1 five")),
            Err(CommandError::InvalidArgument { argument: "rating", .. })
        ));
        assert!(matches!(
            Request::parse(&parts("shelve B1")),
            Err(CommandError::Unknown(ref verb)) if verb == "shelve"
        ));
        assert!(matches!(Request::parse(&[]), Err(CommandError::Empty)));
    }

    #[test]
    fn test_request_command_round_trip() {
        let request = Request::parse(&parts("finish B3")).unwrap();
        assert_eq!(request.command(), Command::Finish);
        assert_eq!(request.command().to_string(), "finish");
    }

    #[test]
    fn test_error_display() {
        let err = CommandError::MissingArgument {
            command: Command::Remove,
            argument: "a list name",
        };
        assert_eq!(err.to_string(), "remove requires a list name");
    }
}
