//! Reading shelf server.
//!
//! Runs a TCP server holding one book catalog and one reader's shelf. Each
//! connection carries a single request line and gets a single reply.

use bytes::BytesMut;
use clap::Parser;
use std::fmt::Write as _;
use std::sync::Arc;
use tokio::{
    io::AsyncWriteExt,
    net::{TcpListener, TcpStream},
    signal,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use reading_shelf::utils::{parse_request, read_request};
use reading_shelf::{BookLookup, CommandError, MemoryCatalog, Request, ServerArgs, Shelf, ShelfError};

#[tokio::main]
pub async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "reading_shelf=info,server=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = ServerArgs::parse();
    let config = args.shelf_config();

    let catalog = Arc::new(MemoryCatalog::new());
    let shelf = Shelf::new(config, Arc::clone(&catalog) as Arc<dyn BookLookup>);

    let addr = args.endpoint.addr();
    let listener = TcpListener::bind(&addr).await?;

    tracing::info!("Shelf server listening on {}", addr);
    tracing::info!("   Cache TTL: {:?}", shelf.config().get_ttl());
    if let Some(timeout) = shelf.config().get_lookup_timeout() {
        tracing::info!("   Lookup timeout: {:?}", timeout);
    }

    let shutdown_shelf = shelf.clone();
    tokio::spawn(async move {
        if let Ok(()) = signal::ctrl_c().await {
            let stats = shutdown_shelf.cache_stats();
            tracing::info!(
                hits = stats.hits,
                misses = stats.misses,
                fetches = stats.fetches,
                size = stats.size,
                "shutting down"
            );
            std::process::exit(0);
        }
    });

    loop {
        match listener.accept().await {
            Ok((socket, peer)) => {
                tracing::debug!(%peer, "connection accepted");

                let shelf = shelf.clone();
                let catalog = Arc::clone(&catalog);

                tokio::spawn(async move {
                    if let Err(e) = handle_connection(socket, shelf, catalog).await {
                        tracing::warn!(%peer, error = %e, "connection error");
                    }
                });
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to accept connection");
            }
        }
    }
}

/// Read one request, run it, write one reply.
async fn handle_connection(
    mut socket: TcpStream,
    shelf: Shelf,
    catalog: Arc<MemoryCatalog>,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let mut buf = BytesMut::with_capacity(1024);

    let request = match read_request(&mut socket, &mut buf).await {
        Ok(false) => return Ok(()),
        Ok(true) => parse_request(&mut buf).and_then(|parts| Request::parse(&parts)),
        Err(CommandError::Io(e)) => return Err(e.into()),
        Err(e) => Err(e),
    };

    let response = match request {
        Ok(request) => {
            tracing::debug!(command = %request.command(), "processing request");
            // Shelf operations hold a std lock across the lookup call.
            tokio::task::spawn_blocking(move || process_request(request, &shelf, &catalog))
                .await?
        }
        Err(e) => format!("ERR {e}"),
    };

    socket.write_all(response.as_bytes()).await?;

    Ok(())
}

/// Run a request against the shelf and catalog, rendering the reply.
fn process_request(request: Request, shelf: &Shelf, catalog: &MemoryCatalog) -> String {
    match request {
        Request::Ping => "PONG".to_string(),

        Request::Register(record) => {
            let id = record.id.clone();
            if catalog.register(record) {
                // Cached copies of the old record must not outlive it.
                shelf.invalidate(&id);
                "OK replaced".to_string()
            } else {
                "OK registered".to_string()
            }
        }

        Request::Unregister(id) => {
            if catalog.unregister(&id) {
                shelf.invalidate(&id);
                "OK".to_string()
            } else {
                format!("ERR {}", ShelfError::NotFound(id))
            }
        }

        Request::Add(id) => reply_title(shelf.add_to_be_read(&id)),
        Request::Begin(id) => reply_title(shelf.begin_reading(&id)),
        Request::Finish(id) => reply_title(shelf.finish_reading(&id)),

        Request::Remove(id, list) => match shelf.remove_from_list(&id, list) {
            Ok(()) => "OK".to_string(),
            Err(e) => format!("ERR {e}"),
        },

        Request::List(list) => match shelf.get_list(list) {
            Ok(books) => {
                let mut out = format!("OK {}", books.len());
                for book in books {
                    let _ = write!(out, "\n{}\t{}\t{}", book.id, book.title, book.author_line());
                }
                out
            }
            Err(e) => format!("ERR {e}"),
        },

        Request::Status(id) => {
            let status = shelf.status(&id);
            match shelf.rating(&id) {
                Some(rating) => format!("OK {status} rating:{rating}"),
                None => format!("OK {status}"),
            }
        }

        Request::Rate(id, rating) => match shelf.rate_book(&id, rating) {
            Ok(()) => "OK".to_string(),
            Err(e) => format!("ERR {e}"),
        },

        Request::Recommend => match shelf.get_recommendations() {
            Ok(recs) => {
                let mut out = format!("OK {}", recs.len());
                for rec in recs {
                    let _ = write!(out, "\n{}\t{}\t{}", rec.score, rec.query, rec.basis);
                }
                out
            }
            Err(e) => format!("ERR {e}"),
        },

        Request::Invalidate(id) => {
            if shelf.invalidate(&id) {
                "OK invalidated".to_string()
            } else {
                "OK not cached".to_string()
            }
        }

        Request::Clear => {
            shelf.clear_shelf();
            "OK".to_string()
        }

        Request::Stats => {
            let stats = shelf.cache_stats();
            let snapshot = shelf.snapshot();
            format!(
                "OK hits:{} misses:{} expirations:{} fetches:{} size:{} hit_rate:{:.1}% \
                 to_be_read:{} currently_reading:{} finished:{} catalog:{}",
                stats.hits,
                stats.misses,
                stats.expirations,
                stats.fetches,
                stats.size,
                stats.hit_rate,
                snapshot.to_be_read.len(),
                snapshot.currently_reading.len(),
                snapshot.finished.len(),
                catalog.len()
            )
        }
    }
}

fn reply_title(result: Result<Arc<reading_shelf::BookRecord>, ShelfError>) -> String {
    match result {
        Ok(book) => format!("OK {}", book.title),
        Err(e) => format!("ERR {e}"),
    }
}
