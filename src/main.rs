use anyhow::Result;
use clap::Parser;
use htproxy::{config::Credential, server, ProxyConfig};
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Parser)]
#[command(name = "htproxy")]
#[command(version)]
#[command(about = "Forward HTTP proxy with CONNECT tunneling and WebSocket upgrade passthrough", long_about = None)]
struct Cli {
    /// Proxy username; enables authentication together with PASSWORD
    username: Option<String>,

    /// Proxy password; enables authentication together with USERNAME
    password: Option<String>,

    /// Listen port
    #[arg(short, long)]
    port: Option<u16>,

    /// Configuration file (YAML)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    if cli.verbose {
        tracing_subscriber::fmt()
            .with_max_level(tracing::Level::DEBUG)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_max_level(tracing::Level::INFO)
            .init();
    }

    let config = assemble_config(cli)?;
    server::run(Arc::new(config)).await
}

/// Start from the config file when given, then apply CLI overrides.
fn assemble_config(cli: Cli) -> Result<ProxyConfig> {
    let mut config = match &cli.config {
        Some(path) => ProxyConfig::load(path)?,
        None => ProxyConfig::default(),
    };

    if let Some(port) = cli.port {
        config.port = port;
    }

    match (cli.username, cli.password) {
        (Some(username), Some(password)) => {
            config.credential = Some(Credential { username, password });
        }
        (None, None) => {}
        _ => anyhow::bail!("username and password must be supplied together"),
    }

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cli(args: &[&str]) -> Cli {
        Cli::parse_from(std::iter::once("htproxy").chain(args.iter().copied()))
    }

    #[test]
    fn test_credentials_enable_auth() {
        let config = assemble_config(cli(&["alice", "wonderland"])).unwrap();
        let cred = config.credential.unwrap();
        assert_eq!(cred.username, "alice");
        assert_eq!(cred.password, "wonderland");
    }

    #[test]
    fn test_no_credentials_disable_auth() {
        let config = assemble_config(cli(&[])).unwrap();
        assert!(config.credential.is_none());
        assert_eq!(config.port, 3000);
    }

    #[test]
    fn test_lone_username_is_an_error() {
        assert!(assemble_config(cli(&["alice"])).is_err());
    }

    #[test]
    fn test_port_override() {
        let config = assemble_config(cli(&["--port", "8118"])).unwrap();
        assert_eq!(config.port, 8118);
    }
}
