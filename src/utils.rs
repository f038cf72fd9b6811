//! Request tokenizing for the shelf server protocol.

use bytes::{Buf, BytesMut};
use tokio::io::{AsyncRead, AsyncReadExt};

use crate::command::CommandError;

/// Longest request line the server will buffer.
pub const MAX_REQUEST_LEN: usize = 64 * 1024;

/// Read one request line from `reader` into `buf`.
///
/// Keeps reading until a newline arrives or the peer stops sending, so a
/// request split across several reads is assembled whole. The newline and
/// anything after it are dropped. Returns `false` if the peer closed without
/// sending anything.
pub async fn read_request<R>(reader: &mut R, buf: &mut BytesMut) -> Result<bool, CommandError>
where
    R: AsyncRead + Unpin,
{
    loop {
        if let Some(end) = buf.iter().position(|b| *b == b'\n') {
            buf.truncate(end);
            return Ok(true);
        }
        if buf.len() > MAX_REQUEST_LEN {
            return Err(CommandError::TooLong(MAX_REQUEST_LEN));
        }
        if reader.read_buf(buf).await? == 0 {
            return Ok(!buf.is_empty());
        }
    }
}

/// Split a request buffer into tokens.
///
/// Tokens are separated by ASCII whitespace. A double-quoted run is one token
/// with the quotes removed, so titles can contain spaces. An unterminated
/// quote runs to the end of the buffer.
///
/// # Example
/// ```
/// use bytes::BytesMut;
/// use reading_shelf::utils::split_request;
///
/// let mut buf = BytesMut::from(r#"register B1 "The Left Hand of Darkness""#);
/// assert_eq!(
///     split_request(&mut buf),
///     vec!["register", "B1", "The Left Hand of Darkness"]
/// );
/// ```
pub fn split_request(buf: &mut BytesMut) -> Vec<String> {
    let bytes = buf.split_to(buf.len());
    let text = String::from_utf8_lossy(bytes.chunk());

    let mut tokens = Vec::new();
    let mut word = String::new();
    let mut quoted = false;
    let mut in_token = false;

    for ch in text.chars() {
        match ch {
            '"' => {
                quoted = !quoted;
                in_token = true;
            }
            c if c.is_ascii_whitespace() && !quoted => {
                if in_token {
                    tokens.push(std::mem::take(&mut word));
                    in_token = false;
                }
            }
            c => {
                word.push(c);
                in_token = true;
            }
        }
    }
    if in_token {
        tokens.push(word);
    }
    tokens
}

/// Split a request, rejecting an empty one.
pub fn parse_request(buf: &mut BytesMut) -> Result<Vec<String>, CommandError> {
    let parts = split_request(buf);

    if parts.is_empty() {
        return Err(CommandError::Empty);
    }

    Ok(parts)
}

/// Quote a token for the wire if it contains whitespace.
///
/// Embedded double quotes cannot be represented and are dropped.
pub fn quote(token: &str) -> String {
    let cleaned: String = token.chars().filter(|c| *c != '"').collect();
    if cleaned.is_empty() || cleaned.chars().any(|c| c.is_ascii_whitespace()) {
        format!("\"{cleaned}\"")
    } else {
        cleaned
    }
}
