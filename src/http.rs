//! Minimal HTTP/1.1 head handling over raw sockets.
//!
//! The proxy never frames bodies: it reads a request or response head off
//! the wire, routes on it, and hands the socket over to the byte relay.
//! Bytes that arrive past the blank line are kept as `leftover` so nothing
//! already buffered is lost when the relay takes over.

use crate::error::{ProxyError, Result};
use std::fmt;
use tokio::io::{AsyncRead, AsyncReadExt};

const MAX_HEAD: usize = 8 * 1024;

/// Parsed request head plus any bytes read past it.
#[derive(Debug)]
pub struct RequestHead {
    pub method: String,
    pub target: String,
    pub version: String,
    /// Headers in wire order, names as received.
    pub headers: Vec<(String, String)>,
    /// Bytes that arrived after the terminating blank line.
    pub leftover: Vec<u8>,
}

impl RequestHead {
    /// Case-insensitive header lookup. The last occurrence wins when a
    /// header is repeated.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .rev()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Whether this request carries an HTTP upgrade signal: an `Upgrade`
    /// header plus an `upgrade` token in the `Connection` header.
    pub fn is_upgrade(&self) -> bool {
        if self.header("upgrade").is_none() {
            return false;
        }
        self.header("connection")
            .map(|v| v.split(',').any(|t| t.trim().eq_ignore_ascii_case("upgrade")))
            .unwrap_or(false)
    }
}

/// Destination for an outbound dial.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Target {
    pub host: String,
    pub port: u16,
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.host, self.port)
    }
}

/// Read one request head from the stream, leaving any surplus bytes in
/// `leftover`.
pub async fn read_request_head<S>(stream: &mut S) -> Result<RequestHead>
where
    S: AsyncRead + Unpin,
{
    let (buf, end) = read_head(stream).await?;
    let head = &buf[..end];
    let leftover = buf[end..].to_vec();

    let text = std::str::from_utf8(head)
        .map_err(|_| ProxyError::BadRequest("request head is not valid UTF-8".into()))?;
    let mut lines = text.split("\r\n");

    let request_line = lines
        .next()
        .ok_or_else(|| ProxyError::BadRequest("missing request line".into()))?;
    let (method, target, version) = parse_request_line(request_line)?;

    let mut headers = Vec::new();
    for line in lines {
        if line.is_empty() {
            break;
        }
        let (name, value) = line
            .split_once(':')
            .ok_or_else(|| ProxyError::BadRequest(format!("bad header line: {line}")))?;
        headers.push((name.trim().to_string(), value.trim().to_string()));
    }

    Ok(RequestHead {
        method,
        target,
        version,
        headers,
        leftover,
    })
}

/// Read one response head from the stream and return its status code plus
/// any surplus bytes already received past the blank line.
pub async fn read_response_head<S>(stream: &mut S) -> Result<(u16, Vec<u8>)>
where
    S: AsyncRead + Unpin,
{
    let (buf, end) = read_head(stream).await?;
    let leftover = buf[end..].to_vec();

    let line_end = buf
        .windows(2)
        .position(|w| w == b"\r\n")
        .unwrap_or(end);
    let line = std::str::from_utf8(&buf[..line_end])
        .map_err(|_| ProxyError::BadRequest("status line is not valid UTF-8".into()))?;

    let status = line
        .split_whitespace()
        .nth(1)
        .and_then(|s| s.parse::<u16>().ok())
        .ok_or_else(|| ProxyError::BadRequest(format!("bad status line: {line}")))?;

    Ok((status, leftover))
}

/// Accumulate bytes until the terminating blank line; returns the buffer
/// and the offset just past `\r\n\r\n`.
async fn read_head<S>(stream: &mut S) -> Result<(Vec<u8>, usize)>
where
    S: AsyncRead + Unpin,
{
    let mut buf = Vec::with_capacity(1024);
    let mut tmp = [0u8; 512];
    loop {
        let n = stream.read(&mut tmp).await?;
        if n == 0 {
            return Err(ProxyError::BadRequest(
                "connection closed while reading head".into(),
            ));
        }
        buf.extend_from_slice(&tmp[..n]);
        if buf.len() > MAX_HEAD {
            return Err(ProxyError::BadRequest("head too large".into()));
        }
        if let Some(end) = find_head_end(&buf) {
            return Ok((buf, end));
        }
    }
}

fn find_head_end(buf: &[u8]) -> Option<usize> {
    buf.windows(4).position(|w| w == b"\r\n\r\n").map(|i| i + 4)
}

fn parse_request_line(line: &str) -> Result<(String, String, String)> {
    let mut parts = line.split_whitespace();
    let method = parts
        .next()
        .filter(|m| !m.is_empty())
        .ok_or_else(|| ProxyError::BadRequest("no method in request line".into()))?
        .to_string();
    let target = parts
        .next()
        .ok_or_else(|| ProxyError::BadRequest("no target in request line".into()))?
        .to_string();
    let version = parts.next().unwrap_or("HTTP/1.1").to_string();
    Ok((method, target, version))
}

/// Parse `host`, `host:port` or `[v6]:port`, filling in `default_port`
/// when the port is absent.
pub fn parse_authority(s: &str, default_port: u16) -> Result<Target> {
    let (host, port) = if let Some(rest) = s.strip_prefix('[') {
        let (host, rest) = rest
            .split_once(']')
            .ok_or_else(|| ProxyError::BadRequest(format!("bad IPv6 authority: {s}")))?;
        match rest.strip_prefix(':') {
            Some(p) => (
                host,
                p.parse()
                    .map_err(|_| ProxyError::BadRequest(format!("bad port in {s}")))?,
            ),
            None => (host, default_port),
        }
    } else if let Some((host, p)) = s.rsplit_once(':') {
        (
            host,
            p.parse()
                .map_err(|_| ProxyError::BadRequest(format!("bad port in {s}")))?,
        )
    } else {
        (s, default_port)
    };

    if host.is_empty() {
        return Err(ProxyError::BadRequest(format!("empty host in {s}")));
    }
    Ok(Target {
        host: host.to_string(),
        port,
    })
}

/// Resolve an upgrade request's target and path. Accepts absolute-form
/// targets (`http://host:port/path`), origin-form targets (`/path` with a
/// `Host` header) and bare authorities.
pub fn parse_target_url(
    target: &str,
    host_header: Option<&str>,
    default_port: u16,
) -> Result<(Target, String)> {
    if let Some(idx) = target.find("://") {
        let rest = &target[idx + 3..];
        let (authority, path) = match rest.split_once('/') {
            Some((a, p)) => (a, format!("/{p}")),
            None => (rest, "/".to_string()),
        };
        Ok((parse_authority(authority, default_port)?, path))
    } else if target.starts_with('/') {
        let authority = host_header
            .ok_or_else(|| ProxyError::BadRequest("origin-form target without Host".into()))?;
        Ok((parse_authority(authority, default_port)?, target.to_string()))
    } else {
        Ok((parse_authority(target, default_port)?, "/".to_string()))
    }
}
