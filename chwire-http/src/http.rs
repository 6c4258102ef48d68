//! Minimal HTTP/1.1 plumbing.
//!
//! One request per connection with `Connection: close`, so the response is
//! simply everything the server sends before EOF. Bodies arrive either with
//! a `Content-Length` or chunked; both are handled. This is deliberately
//! not a general HTTP client - it speaks exactly the subset the server's
//! HTTP interface uses.

use bytes::Bytes;
use chwire_core::{TransportError, TransportResult};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;

/// Parsed response: status code and decoded body.
#[derive(Debug)]
pub(crate) struct Response {
    pub status: u16,
    pub body: Bytes,
}

/// Percent-encode a query-string value.
pub(crate) fn percent_encode(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for byte in raw.bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' => {
                out.push(byte as char);
            }
            other => {
                out.push('%');
                out.push_str(&format!("{other:02X}"));
            }
        }
    }
    out
}

/// Send one request and read the whole response.
pub(crate) async fn roundtrip(
    mut stream: TcpStream,
    head: &str,
    body: &[u8],
) -> TransportResult<Response> {
    stream.write_all(head.as_bytes()).await?;
    stream.write_all(body).await?;
    stream.flush().await?;

    let mut raw = Vec::new();
    stream.read_to_end(&mut raw).await?;
    parse_response(&raw)
}

fn parse_response(raw: &[u8]) -> TransportResult<Response> {
    let head_end = find_blank_line(raw)
        .ok_or_else(|| TransportError::Connection("truncated HTTP response head".into()))?;
    let head = std::str::from_utf8(&raw[..head_end])
        .map_err(|_| TransportError::Connection("non-ASCII HTTP response head".into()))?;
    let mut lines = head.split("\r\n");
    let status_line = lines
        .next()
        .ok_or_else(|| TransportError::Connection("empty HTTP response".into()))?;
    let status = status_line
        .split_whitespace()
        .nth(1)
        .and_then(|code| code.parse::<u16>().ok())
        .ok_or_else(|| {
            TransportError::Connection(format!("malformed status line: {status_line}"))
        })?;

    let mut content_length: Option<usize> = None;
    let mut chunked = false;
    for line in lines {
        let Some((name, value)) = line.split_once(':') else {
            continue;
        };
        let name = name.trim().to_ascii_lowercase();
        let value = value.trim();
        if name == "content-length" {
            content_length = value.parse().ok();
        } else if name == "transfer-encoding" && value.eq_ignore_ascii_case("chunked") {
            chunked = true;
        }
    }

    let payload = &raw[head_end + 4..];
    let body = if chunked {
        decode_chunked(payload)?
    } else if let Some(len) = content_length {
        if payload.len() < len {
            return Err(TransportError::Connection(format!(
                "short HTTP body: {} of {len} bytes",
                payload.len()
            )));
        }
        Bytes::copy_from_slice(&payload[..len])
    } else {
        // Connection: close delimits the body.
        Bytes::copy_from_slice(payload)
    };
    Ok(Response { status, body })
}

fn find_blank_line(raw: &[u8]) -> Option<usize> {
    raw.windows(4).position(|w| w == b"\r\n\r\n")
}

fn decode_chunked(mut payload: &[u8]) -> TransportResult<Bytes> {
    let mut body = Vec::new();
    loop {
        let line_end = payload
            .windows(2)
            .position(|w| w == b"\r\n")
            .ok_or_else(|| TransportError::Connection("truncated chunk size".into()))?;
        let size_text = std::str::from_utf8(&payload[..line_end])
            .map_err(|_| TransportError::Connection("non-ASCII chunk size".into()))?;
        let size_text = size_text.split(';').next().unwrap_or("").trim();
        let size = usize::from_str_radix(size_text, 16)
            .map_err(|_| TransportError::Connection(format!("bad chunk size: {size_text}")))?;
        payload = &payload[line_end + 2..];
        if size == 0 {
            return Ok(Bytes::from(body));
        }
        if payload.len() < size + 2 {
            return Err(TransportError::Connection("truncated chunk body".into()));
        }
        body.extend_from_slice(&payload[..size]);
        payload = &payload[size + 2..];
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_percent_encode_keeps_unreserved() {
        assert_eq!(percent_encode("abc-XYZ_0.9~"), "abc-XYZ_0.9~");
        assert_eq!(
            percent_encode("INSERT INTO t FORMAT RowBinary"),
            "INSERT%20INTO%20t%20FORMAT%20RowBinary"
        );
        assert_eq!(percent_encode("a=b&c"), "a%3Db%26c");
    }

    #[test]
    fn test_parse_content_length_body() {
        let raw = b"HTTP/1.1 200 OK\r\nContent-Length: 5\r\n\r\nhello...trailing noise";
        let response = parse_response(raw).expect("parse");
        assert_eq!(response.status, 200);
        assert_eq!(response.body.as_ref(), b"hello");
    }

    #[test]
    fn test_parse_chunked_body() {
        let raw =
            b"HTTP/1.1 200 OK\r\nTransfer-Encoding: chunked\r\n\r\n4\r\nrowb\r\n3\r\nin!\r\n0\r\n\r\n";
        let response = parse_response(raw).expect("parse");
        assert_eq!(response.body.as_ref(), b"rowbin!");
    }

    #[test]
    fn test_parse_close_delimited_body() {
        let raw = b"HTTP/1.1 500 Internal Server Error\r\nX-Whatever: 1\r\n\r\nboom";
        let response = parse_response(raw).expect("parse");
        assert_eq!(response.status, 500);
        assert_eq!(response.body.as_ref(), b"boom");
    }

    #[test]
    fn test_truncated_head_rejected() {
        assert!(parse_response(b"HTTP/1.1 200 OK\r\nContent-").is_err());
    }
}
