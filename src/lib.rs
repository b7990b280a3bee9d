//! htproxy library
//!
//! A forward HTTP proxy: plaintext HTTP, CONNECT tunneling for arbitrary
//! TCP, and WebSocket upgrade passthrough, optionally gated by a static
//! Basic-auth credential.

pub mod auth;
pub mod config;
pub mod error;
pub mod handler;
pub mod http;
pub mod relay;
pub mod server;
pub mod tunnel;
pub mod upgrade;

pub use config::{Credential, ProxyConfig};
pub use error::{ProxyError, Result};
