//! CONNECT tunnel establishment.
//!
//! Parses the CONNECT authority, dials the origin once with a bounded
//! timeout, acknowledges with `200 Connection Established` and hands both
//! sockets to the byte relay. Bytes the client sent past the request head
//! are forwarded to the origin before the relay starts.

use crate::error::{ProxyError, Result};
use crate::http::{parse_authority, RequestHead, Target};
use crate::relay;
use std::time::Duration;
use tokio::io::{AsyncRead, AsyncWrite, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::time::timeout;
use tracing::{debug, info};

const CONNECT_DEFAULT_PORT: u16 = 443;

const ESTABLISHED: &[u8] = b"HTTP/1.1 200 Connection Established\r\n\
    Proxy-agent: htproxy\r\n\
    \r\n";

/// Run a CONNECT tunnel over an already-authenticated inbound connection.
/// Any error closes the inbound side; there is no retry.
pub async fn run<S>(mut client: S, req: RequestHead, connect_timeout: Duration) -> Result<()>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    let target = parse_authority(&req.target, CONNECT_DEFAULT_PORT)?;
    info!(%target, "tunneling");

    let mut origin = dial(&target, connect_timeout).await?;

    client.write_all(ESTABLISHED).await?;
    client.flush().await?;
    if !req.leftover.is_empty() {
        origin.write_all(&req.leftover).await?;
    }

    let (up, down) = relay::splice(&mut client, &mut origin).await?;
    debug!(%target, up, down, "tunnel closed");
    Ok(())
}

/// Single dial attempt with a bounded timeout.
pub(crate) async fn dial(target: &Target, connect_timeout: Duration) -> Result<TcpStream> {
    let attempt = TcpStream::connect((target.host.as_str(), target.port));
    match timeout(connect_timeout, attempt).await {
        Ok(Ok(stream)) => Ok(stream),
        Ok(Err(source)) => Err(ProxyError::Dial {
            host: target.host.clone(),
            port: target.port,
            source,
        }),
        Err(_) => Err(ProxyError::Dial {
            host: target.host.clone(),
            port: target.port,
            source: std::io::Error::new(std::io::ErrorKind::TimedOut, "connect timed out"),
        }),
    }
}
