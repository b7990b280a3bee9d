//! Plain (non-tunnel) request handling and shared canned responses.

use crate::error::{ProxyError, Result};
use crate::http::RequestHead;
use tokio::io::{AsyncWrite, AsyncWriteExt};

const PLAIN_BODY: &str = "This is an authenticated HTTP proxy server";
const AUTH_BODY: &str = "Authentication required.";

/// Answer a plain HTTP request that is neither CONNECT nor an upgrade.
/// GET gets the fixed informational body; any other shape is unhandled
/// and the connection is closed without a response.
pub async fn respond_plain<S>(stream: &mut S, req: &RequestHead) -> Result<()>
where
    S: AsyncWrite + Unpin,
{
    if req.method != "GET" {
        return Err(ProxyError::Unsupported(req.method.clone()));
    }

    let response = format!(
        "HTTP/1.1 200 OK\r\n\
         Content-Type: text/plain\r\n\
         Content-Length: {}\r\n\
         Connection: close\r\n\
         \r\n\
         {}",
        PLAIN_BODY.len(),
        PLAIN_BODY
    );
    stream.write_all(response.as_bytes()).await?;
    stream.flush().await?;
    let _ = stream.shutdown().await;
    Ok(())
}

/// Reject an unauthenticated request and close the connection.
pub async fn respond_401<S>(stream: &mut S) -> Result<()>
where
    S: AsyncWrite + Unpin,
{
    let response = format!(
        "HTTP/1.1 401 Unauthorized\r\n\
         WWW-Authenticate: Basic realm=\"Proxy\"\r\n\
         Content-Length: {}\r\n\
         Connection: close\r\n\
         \r\n\
         {}",
        AUTH_BODY.len(),
        AUTH_BODY
    );
    stream.write_all(response.as_bytes()).await?;
    stream.flush().await?;
    let _ = stream.shutdown().await;
    Ok(())
}
