//! WebSocket upgrade passthrough.
//!
//! Replays the inbound upgrade request against the origin with the
//! inbound headers forwarded verbatim, checks that the origin actually
//! switches protocols, answers the client with a fixed `101 Switching
//! Protocols` block and splices the two raw sockets.

use crate::error::{ProxyError, Result};
use crate::http::{parse_target_url, read_response_head, RequestHead};
use crate::relay;
use crate::tunnel::dial;
use std::time::Duration;
use tokio::io::{AsyncRead, AsyncWrite, AsyncWriteExt};
use tracing::{debug, info};

const UPGRADE_DEFAULT_PORT: u16 = 80;

const SWITCHING: &[u8] = b"HTTP/1.1 101 Switching Protocols\r\n\
    Upgrade: websocket\r\n\
    Connection: Upgrade\r\n\
    \r\n";

/// Relay an upgrade handshake over an already-authenticated inbound
/// connection, then splice the raw sockets. Any error closes the inbound
/// side; there is no retry.
pub async fn run<S>(mut client: S, req: RequestHead, connect_timeout: Duration) -> Result<()>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    let (target, path) =
        parse_target_url(&req.target, req.header("host"), UPGRADE_DEFAULT_PORT)?;
    info!(%target, %path, "upgrade passthrough");

    let mut origin = dial(&target, connect_timeout).await?;

    // Replay the request with the inbound headers verbatim, in order,
    // Upgrade and Connection included.
    let mut outbound = format!("GET {path} HTTP/1.1\r\n");
    for (name, value) in &req.headers {
        outbound.push_str(&format!("{name}: {value}\r\n"));
    }
    outbound.push_str("\r\n");
    origin.write_all(outbound.as_bytes()).await?;
    if !req.leftover.is_empty() {
        origin.write_all(&req.leftover).await?;
    }
    origin.flush().await?;

    let (status, origin_leftover) = read_response_head(&mut origin).await?;
    if status != 101 {
        return Err(ProxyError::UpgradeRefused(status));
    }

    // Fixed response to the client regardless of what the origin's own
    // response head carried.
    client.write_all(SWITCHING).await?;
    if !origin_leftover.is_empty() {
        client.write_all(&origin_leftover).await?;
    }
    client.flush().await?;

    let (up, down) = relay::splice(&mut client, &mut origin).await?;
    debug!(%target, up, down, "upgrade relay closed");
    Ok(())
}
