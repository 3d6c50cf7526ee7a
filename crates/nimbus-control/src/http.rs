//! Minimal HTTP/1.1 framing for the control socket.
//!
//! One exchange per connection, no pipelining, no chunked encoding. The
//! body cap is enforced here, before any JSON parsing, so an oversized
//! request is rejected without ever allocating for its payload.

use std::collections::HashMap;

use tokio::io::{AsyncRead, AsyncReadExt};

/// Hard cap on the header block, independent of the body cap.
const MAX_HEADER_BYTES: usize = 16 * 1024;

const READ_CHUNK: usize = 4096;

/// A parsed control request.
#[derive(Debug)]
pub struct Request {
    pub method: String,
    pub path: String,
    pub query: HashMap<String, String>,
    pub body: Vec<u8>,
}

impl Request {
    pub fn body_str(&self) -> Result<&str, std::str::Utf8Error> {
        std::str::from_utf8(&self.body)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum FrameError {
    #[error("request exceeds maximum allowed size")]
    TooLarge,

    #[error("malformed request: {0}")]
    Malformed(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Read a single HTTP-style request from `reader`. Bodies larger than
/// `max_body` fail with [`FrameError::TooLarge`] as soon as the declared
/// or observed size crosses the cap.
pub async fn read_request<R: AsyncRead + Unpin>(
    reader: &mut R,
    max_body: usize,
) -> Result<Request, FrameError> {
    let mut buffer: Vec<u8> = Vec::with_capacity(READ_CHUNK);
    let mut chunk = [0u8; READ_CHUNK];

    // Headers first.
    let header_end = loop {
        if let Some(pos) = find_header_end(&buffer) {
            break pos;
        }
        if buffer.len() > MAX_HEADER_BYTES {
            return Err(FrameError::TooLarge);
        }
        let n = reader.read(&mut chunk).await?;
        if n == 0 {
            return Err(FrameError::Malformed("connection closed mid-headers".into()));
        }
        buffer.extend_from_slice(&chunk[..n]);
    };

    let header_text = std::str::from_utf8(&buffer[..header_end])
        .map_err(|_| FrameError::Malformed("headers are not valid UTF-8".into()))?;
    let mut lines = header_text.split("\r\n");
    let request_line = lines
        .next()
        .ok_or_else(|| FrameError::Malformed("empty request".into()))?;
    let (method, path, query) = parse_request_line(request_line)?;

    let content_length = parse_content_length(lines)?;
    if content_length > max_body {
        return Err(FrameError::TooLarge);
    }

    // Body: whatever followed the headers plus the remainder on the wire.
    let body_start = header_end + 4;
    let mut body = buffer.split_off(body_start.min(buffer.len()));
    while body.len() < content_length {
        let n = reader.read(&mut chunk).await?;
        if n == 0 {
            return Err(FrameError::Malformed("connection closed mid-body".into()));
        }
        body.extend_from_slice(&chunk[..n]);
        if body.len() > max_body {
            return Err(FrameError::TooLarge);
        }
    }
    body.truncate(content_length);

    Ok(Request {
        method,
        path,
        query,
        body,
    })
}

fn find_header_end(buffer: &[u8]) -> Option<usize> {
    buffer.windows(4).position(|w| w == b"\r\n\r\n")
}

fn parse_request_line(line: &str) -> Result<(String, String, HashMap<String, String>), FrameError> {
    let mut parts = line.split(' ');
    let method = parts
        .next()
        .filter(|m| !m.is_empty())
        .ok_or_else(|| FrameError::Malformed("missing method".into()))?;
    let target = parts
        .next()
        .ok_or_else(|| FrameError::Malformed("missing request target".into()))?;
    if parts.next().is_none() {
        return Err(FrameError::Malformed("missing HTTP version".into()));
    }

    let (path, query) = match target.split_once('?') {
        Some((path, raw)) => (path, parse_query(raw)),
        None => (target, HashMap::new()),
    };
    Ok((method.to_string(), path.to_string(), query))
}

fn parse_query(raw: &str) -> HashMap<String, String> {
    raw.split('&')
        .filter(|pair| !pair.is_empty())
        .map(|pair| match pair.split_once('=') {
            Some((k, v)) => (k.to_string(), v.to_string()),
            None => (pair.to_string(), String::new()),
        })
        .collect()
}

fn parse_content_length<'a>(lines: impl Iterator<Item = &'a str>) -> Result<usize, FrameError> {
    for line in lines {
        if let Some((name, value)) = line.split_once(':') {
            if name.trim().eq_ignore_ascii_case("content-length") {
                return value
                    .trim()
                    .parse::<usize>()
                    .map_err(|_| FrameError::Malformed("invalid Content-Length".into()));
            }
        }
    }
    Ok(0)
}

/// Serialize a JSON response with the fixed header set the control plane
/// always uses. Connections are single-exchange, so `Connection: close`.
pub fn format_response(status: u16, body: &str) -> String {
    format!(
        "HTTP/1.1 {} {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
        status,
        status_text(status),
        body.len(),
        body
    )
}

fn status_text(status: u16) -> &'static str {
    match status {
        200 => "OK",
        400 => "Bad Request",
        404 => "Not Found",
        413 => "Payload Too Large",
        500 => "Internal Server Error",
        _ => "Unknown",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn parse(raw: &[u8], max_body: usize) -> Result<Request, FrameError> {
        let (mut client, mut server) = tokio::io::duplex(64 * 1024);
        tokio::io::AsyncWriteExt::write_all(&mut client, raw)
            .await
            .unwrap();
        drop(client);
        read_request(&mut server, max_body).await
    }

    #[tokio::test]
    async fn parses_get_without_body() {
        let req = parse(b"GET /internal/tab_info HTTP/1.1\r\nHost: x\r\n\r\n", 1024)
            .await
            .unwrap();
        assert_eq!(req.method, "GET");
        assert_eq!(req.path, "/internal/tab_info");
        assert!(req.query.is_empty());
        assert!(req.body.is_empty());
    }

    #[tokio::test]
    async fn parses_post_with_body() {
        let body = br#"{"url":"https://example.com"}"#;
        let raw = format!(
            "POST /internal/navigate HTTP/1.1\r\nContent-Length: {}\r\n\r\n",
            body.len()
        );
        let mut bytes = raw.into_bytes();
        bytes.extend_from_slice(body);
        let req = parse(&bytes, 1024).await.unwrap();
        assert_eq!(req.method, "POST");
        assert_eq!(req.body_str().unwrap(), r#"{"url":"https://example.com"}"#);
    }

    #[tokio::test]
    async fn parses_query_string() {
        let req = parse(
            b"GET /internal/screenshot?tabIndex=1&fullPage=true HTTP/1.1\r\n\r\n",
            1024,
        )
        .await
        .unwrap();
        assert_eq!(req.path, "/internal/screenshot");
        assert_eq!(req.query.get("tabIndex").unwrap(), "1");
        assert_eq!(req.query.get("fullPage").unwrap(), "true");
    }

    #[tokio::test]
    async fn declared_oversize_body_rejected_before_read() {
        let raw = b"POST /internal/execute_js HTTP/1.1\r\nContent-Length: 2048\r\n\r\n";
        let err = parse(raw, 1024).await.unwrap_err();
        assert!(matches!(err, FrameError::TooLarge));
    }

    #[tokio::test]
    async fn truncated_request_is_malformed() {
        let err = parse(b"POST /internal/navigate HTTP/1.1\r\nContent-Length: 10\r\n\r\nabc", 1024)
            .await
            .unwrap_err();
        assert!(matches!(err, FrameError::Malformed(_)));
    }

    #[tokio::test]
    async fn garbage_request_line_is_malformed() {
        let err = parse(b"NONSENSE\r\n\r\n", 1024).await.unwrap_err();
        assert!(matches!(err, FrameError::Malformed(_)));
    }

    #[tokio::test]
    async fn bad_content_length_is_malformed() {
        let err = parse(
            b"POST /internal/reload HTTP/1.1\r\nContent-Length: banana\r\n\r\n",
            1024,
        )
        .await
        .unwrap_err();
        assert!(matches!(err, FrameError::Malformed(_)));
    }

    #[test]
    fn response_has_fixed_headers() {
        let out = format_response(200, r#"{"success":true}"#);
        assert!(out.starts_with("HTTP/1.1 200 OK\r\n"));
        assert!(out.contains("Content-Type: application/json\r\n"));
        assert!(out.contains("Content-Length: 16\r\n"));
        assert!(out.contains("Connection: close\r\n"));
        assert!(out.ends_with(r#"{"success":true}"#));
    }
}
