//! Error types for htproxy.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, ProxyError>;

/// Per-connection error. None of these ever escape the connection task;
/// the server loop logs them and moves on.
#[derive(Debug, Error)]
pub enum ProxyError {
    #[error("no Proxy-Authorization header provided")]
    AuthMissing,

    #[error("malformed Proxy-Authorization header: {0}")]
    AuthMalformed(String),

    #[error("credentials do not match")]
    AuthRejected,

    #[error("failed to connect to {host}:{port}: {source}")]
    Dial {
        host: String,
        port: u16,
        source: std::io::Error,
    },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("bad request: {0}")]
    BadRequest(String),

    #[error("unsupported request: {0}")]
    Unsupported(String),

    #[error("origin declined upgrade with status {0}")]
    UpgradeRefused(u16),
}
