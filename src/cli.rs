//! Command-line interfaces for the shelf server and client, using clap.

use clap::{Args, Parser, Subcommand};
use std::time::Duration;

use crate::config::ShelfConfig;
use crate::utils::quote;

pub const DEFAULT_HOST: &str = "127.0.0.1";
pub const DEFAULT_PORT: u16 = 3000;

/// Where the server listens and the client connects.
#[derive(Args, Debug, Clone)]
pub struct Endpoint {
    /// Host to bind or connect to.
    #[arg(long, default_value = DEFAULT_HOST)]
    pub host: String,

    /// TCP port.
    #[arg(long, short, default_value_t = DEFAULT_PORT)]
    pub port: u16,
}

impl Endpoint {
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Reading shelf server.
///
/// Holds a book catalog and one reader's shelf in memory.
#[derive(Parser, Debug)]
#[command(name = "shelf-server")]
#[command(author, version, about, long_about = None)]
pub struct ServerArgs {
    #[command(flatten)]
    pub endpoint: Endpoint,

    /// Cache TTL in seconds. Defaults to $TTL_SECONDS, then 60.
    #[arg(long)]
    pub ttl: Option<u64>,

    /// Lookup timeout in milliseconds. Defaults to $LOOKUP_TIMEOUT_MS.
    #[arg(long)]
    pub lookup_timeout_ms: Option<u64>,
}

impl ServerArgs {
    /// Environment configuration with command-line overrides applied.
    pub fn shelf_config(&self) -> ShelfConfig {
        let mut config = ShelfConfig::from_env();
        if let Some(secs) = self.ttl {
            config = config.ttl(Duration::from_secs(secs));
        }
        if let Some(ms) = self.lookup_timeout_ms {
            config = config.lookup_timeout(Duration::from_millis(ms));
        }
        config.build()
    }
}

/// Reading shelf client.
///
/// Sends one command to a running shelf server and prints the reply.
#[derive(Parser, Debug)]
#[command(name = "shelf-client")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(flatten)]
    pub endpoint: Endpoint,

    /// The command to execute.
    #[command(subcommand)]
    pub command: ClientCommand,
}

/// Available client commands.
#[derive(Subcommand, Debug)]
pub enum ClientCommand {
    /// Check that the server is up.
    Ping,

    /// Add or replace a book in the server's catalog.
    Register {
        id: String,
        title: String,
        /// Authors, separated by ';'.
        #[arg(long, default_value = "")]
        authors: String,
        /// Genres, separated by ';'.
        #[arg(long, default_value = "")]
        genres: String,
        #[arg(long)]
        pages: Option<u32>,
    },

    /// Delete a book from the server's catalog.
    Unregister { id: String },

    /// Put a book on the to-be-read list.
    Add { id: String },

    /// Start reading a book from the to-be-read list.
    Begin { id: String },

    /// Mark a book you are reading as finished.
    Finish { id: String },

    /// Remove a book from a list without finishing it.
    Remove {
        id: String,
        /// to_be_read, currently_reading or finished.
        list: String,
    },

    /// Show the books on a list.
    List {
        /// to_be_read, currently_reading or finished.
        list: String,
    },

    /// Show which list a book is on.
    Status { id: String },

    /// Rate a book on the shelf from 1 to 5.
    Rate { id: String, rating: u8 },

    /// Suggest searches based on finished books.
    Recommend,

    /// Drop a book's cached metadata.
    Invalidate { id: String },

    /// Empty every list and the cache.
    Clear,

    /// Show cache statistics.
    Stats,
}

impl ClientCommand {
    /// The request line to send to the server.
    pub fn to_request_line(&self) -> String {
        match self {
            ClientCommand::Ping => "ping".to_string(),
            ClientCommand::Register {
                id,
                title,
                authors,
                genres,
                pages,
            } => {
                let mut line = format!(
                    "register {} {} {} {}",
                    quote(id),
                    quote(title),
                    quote(authors),
                    quote(genres)
                );
                if let Some(pages) = pages {
                    line.push_str(&format!(" {pages}"));
                }
                line
            }
            ClientCommand::Unregister { id } => format!("unregister {}", quote(id)),
            ClientCommand::Add { id } => format!("add {}", quote(id)),
            ClientCommand::Begin { id } => format!("begin {}", quote(id)),
            ClientCommand::Finish { id } => format!("finish {}", quote(id)),
            ClientCommand::Remove { id, list } => {
                format!("remove {} {}", quote(id), quote(list))
            }
            ClientCommand::List { list } => format!("list {}", quote(list)),
            ClientCommand::Status { id } => format!("status {}", quote(id)),
            ClientCommand::Rate { id, rating } => format!("rate {} {rating}", quote(id)),
            ClientCommand::Recommend => "recommend".to_string(),
            ClientCommand::Invalidate { id } => format!("invalidate {}", quote(id)),
            ClientCommand::Clear => "clear".to_string(),
            ClientCommand::Stats => "stats".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::Request;
    use crate::utils::split_request;
    use crate::{BookId, ShelfList};

    fn round_trip(command: &ClientCommand) -> Request {
        let mut buf = bytes::BytesMut::from(command.to_request_line().as_str());
        Request::parse(&split_request(&mut buf)).unwrap()
    }

    #[test]
    fn test_parse_add() {
        let cli = Cli::parse_from(["test", "add", "B1"]);
        match cli.command {
            ClientCommand::Add { ref id } => assert_eq!(id, "B1"),
            _ => panic!("Expected Add command"),
        }
        assert_eq!(cli.endpoint.addr(), "127.0.0.1:3000");
    }

    #[test]
    fn test_parse_endpoint_override() {
        let cli = Cli::parse_from(["test", "--port", "4100", "stats"]);
        assert_eq!(cli.endpoint.port, 4100);
        assert!(matches!(cli.command, ClientCommand::Stats));
    }

    #[test]
    fn test_parse_register_flags() {
        let cli = Cli::parse_from([
            "test",
            "register",
            "B2",
            "Pride and Prejudice",
            "--authors",
            "Jane Austen",
            "--pages",
            "432",
        ]);
        let request = round_trip(&cli.command);
        let Request::Register(record) = request else {
            panic!("Expected Register request");
        };
        assert_eq!(record.title, "Pride and Prejudice");
        assert_eq!(record.authors, vec!["Jane Austen"]);
        assert!(record.genres.is_empty());
        assert_eq!(record.page_count, Some(432));
    }

    #[test]
    fn test_remove_request_line() {
        let command = ClientCommand::Remove {
            id: "B1".into(),
            list: "currently_reading".into(),
        };
        assert_eq!(command.to_request_line(), "remove B1 currently_reading");
        assert_eq!(
            round_trip(&command),
            Request::Remove(BookId::new("B1"), ShelfList::CurrentlyReading)
        );
    }

    #[test]
    fn test_server_args_override_ttl() {
        let args = ServerArgs::parse_from(["server", "--ttl", "5", "--lookup-timeout-ms", "250"]);
        let config = args.shelf_config();
        assert_eq!(config.get_ttl(), Duration::from_secs(5));
        assert_eq!(config.get_lookup_timeout(), Some(Duration::from_millis(250)));
    }
}
