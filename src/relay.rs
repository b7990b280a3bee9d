//! Full-duplex byte relay between two paired sockets.
//!
//! Both copy directions run concurrently. EOF in one direction propagates
//! a write-shutdown to the opposite side, and the relay only returns once
//! both directions have stopped. Whatever the outcome, both streams are
//! shut down before returning; shutting down an already-closed stream is
//! harmless.

use std::io;
use tokio::io::{copy_bidirectional, AsyncRead, AsyncWrite, AsyncWriteExt};

/// Splice two streams together until both directions finish or either
/// errors. Returns (client→origin, origin→client) byte counts.
pub async fn splice<A, B>(client: &mut A, origin: &mut B) -> io::Result<(u64, u64)>
where
    A: AsyncRead + AsyncWrite + Unpin,
    B: AsyncRead + AsyncWrite + Unpin,
{
    let result = copy_bidirectional(client, origin).await;
    let _ = client.shutdown().await;
    let _ = origin.shutdown().await;
    result
}
