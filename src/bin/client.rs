//! Reading shelf client.
//!
//! Sends one command to a running shelf server and prints the reply.

use bytes::BytesMut;
use clap::Parser;
use tokio::{
    io::{AsyncReadExt, AsyncWriteExt},
    net::TcpStream,
};

use reading_shelf::cli::{Cli, ClientCommand};

#[tokio::main]
pub async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Cli::parse();

    let addr = args.endpoint.addr();
    let mut stream = match TcpStream::connect(&addr).await {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Failed to connect to server at {}: {}", addr, e);
            eprintln!("Make sure the server is running with: cargo run --bin server");
            std::process::exit(1);
        }
    };

    let mut line = args.command.to_request_line();
    line.push('\n');
    stream.write_all(line.as_bytes()).await?;

    let mut buf = BytesMut::with_capacity(4096);
    while stream.read_buf(&mut buf).await? > 0 {}

    let response = match std::str::from_utf8(&buf) {
        Ok(resp) => resp,
        Err(e) => {
            eprintln!("Failed to parse response: {}", e);
            std::process::exit(1);
        }
    };

    if let Some(message) = response.strip_prefix("ERR ") {
        eprintln!("Error: {}", message);
        std::process::exit(1);
    }

    let body = response.strip_prefix("OK").map(str::trim_start).unwrap_or(response);
    render(&args.command, body);

    Ok(())
}

fn render(command: &ClientCommand, body: &str) {
    match command {
        ClientCommand::List { list } => {
            let mut lines = body.lines();
            let count = lines.next().unwrap_or("0");
            println!("{} ({} books)", list, count);
            for line in lines {
                let mut fields = line.splitn(3, '\t');
                let id = fields.next().unwrap_or_default();
                let title = fields.next().unwrap_or_default();
                let authors = fields.next().unwrap_or_default();
                if authors.is_empty() {
                    println!("  [{}] {}", id, title);
                } else {
                    println!("  [{}] {} by {}", id, title, authors);
                }
            }
        }

        ClientCommand::Recommend => {
            let mut lines = body.lines();
            if lines.next() == Some("0") {
                println!("Finish some books to get recommendations.");
                return;
            }
            println!("Try searching for:");
            for line in lines {
                let mut fields = line.splitn(3, '\t');
                let score = fields.next().unwrap_or_default();
                let query = fields.next().unwrap_or_default();
                println!("  {} (score {})", query, score);
            }
        }

        ClientCommand::Stats => {
            println!("Shelf Statistics:");
            for part in body.split_whitespace() {
                if let Some((key, value)) = part.split_once(':') {
                    println!("  {}: {}", key, value);
                }
            }
        }

        ClientCommand::Add { id } => println!("Added '{}' ({}) to to_be_read", body, id),
        ClientCommand::Begin { id } => println!("Started reading '{}' ({})", body, id),
        ClientCommand::Finish { id } => println!("Finished '{}' ({})", body, id),
        ClientCommand::Remove { id, list } => println!("Removed {} from {}", id, list),

        _ if body.is_empty() => println!("OK"),
        _ => println!("{}", body),
    }
}
