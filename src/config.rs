//! Configuration for htproxy.
//!
//! Settings come from an optional YAML file plus CLI overrides. The
//! credential is set once at startup and never mutated afterwards.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Static proxy credential. Configured as a unit or not at all; a
/// username without a password (or vice versa) is rejected at startup.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Credential {
    pub username: String,
    pub password: String,
}

/// Proxy configuration, immutable for the process lifetime.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProxyConfig {
    /// Listen port
    #[serde(default = "default_port")]
    pub port: u16,

    /// Optional Basic-auth credential; absence disables authentication
    pub credential: Option<Credential>,

    /// Outbound dial timeout in seconds
    #[serde(default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,
}

impl Default for ProxyConfig {
    fn default() -> Self {
        Self {
            port: default_port(),
            credential: None,
            connect_timeout_secs: default_connect_timeout_secs(),
        }
    }
}

fn default_port() -> u16 {
    3000
}

fn default_connect_timeout_secs() -> u64 {
    5
}

impl ProxyConfig {
    /// Load configuration from a YAML file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: ProxyConfig = serde_yaml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.connect_timeout_secs == 0 {
            anyhow::bail!("connect_timeout_secs must be at least 1");
        }
        if let Some(cred) = &self.credential {
            if cred.username.is_empty() || cred.password.is_empty() {
                anyhow::bail!("credential requires both a username and a password");
            }
        }
        Ok(())
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_config() {
        let yaml = r#"
port: 8118
credential:
  username: alice
  password: wonderland
connect_timeout_secs: 3
"#;
        let config: ProxyConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.port, 8118);
        assert_eq!(config.connect_timeout_secs, 3);
        let cred = config.credential.unwrap();
        assert_eq!(cred.username, "alice");
        assert_eq!(cred.password, "wonderland");
    }

    #[test]
    fn test_defaults() {
        let config: ProxyConfig = serde_yaml::from_str("credential: null").unwrap();
        assert_eq!(config.port, 3000);
        assert_eq!(config.connect_timeout_secs, 5);
        assert!(config.credential.is_none());
    }

    #[test]
    fn test_partial_credential_rejected() {
        let yaml = r#"
credential:
  username: alice
"#;
        // Missing password is a deserialization error, not a half-configured pair.
        assert!(serde_yaml::from_str::<ProxyConfig>(yaml).is_err());
    }

    #[test]
    fn test_empty_credential_field_rejected() {
        let config = ProxyConfig {
            credential: Some(Credential {
                username: "alice".into(),
                password: String::new(),
            }),
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }
}
