//! Configuration module
//!
//! Connection settings for the hub API, collected from flags and
//! environment variables.

use anyhow::{Result, bail};
use hubctl_client::{HttpTransport, HubClient};
use std::sync::Arc;
use std::time::Duration;

/// Default hub API endpoint
pub const DEFAULT_API: &str = "https://api.agilestacks.io";

/// CLI configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Base URL of the hub API
    pub api_url: String,

    /// Bearer token sent with every request
    pub api_token: Option<String>,

    /// Per-request timeout
    pub timeout: Duration,

    /// How often `--wait` polls the instance
    pub poll_interval: Duration,

    /// Print informational messages
    pub verbose: bool,
}

impl Config {
    /// Creates a configuration with defaults for everything but the URL
    pub fn new(api_url: impl Into<String>) -> Self {
        Self {
            api_url: api_url.into(),
            api_token: None,
            timeout: Duration::from_secs(30),
            poll_interval: Duration::from_secs(5),
            verbose: false,
        }
    }

    /// Check that the settings are usable
    pub fn validate(&self) -> Result<()> {
        if !(self.api_url.starts_with("http://") || self.api_url.starts_with("https://")) {
            bail!(
                "API URL `{}` must start with http:// or https://",
                self.api_url
            );
        }
        if self.timeout.is_zero() {
            bail!("Timeout must be greater than zero");
        }
        if self.api_token.as_deref().is_some_and(str::is_empty) {
            bail!("API token is set but empty");
        }
        Ok(())
    }

    /// Build a hub client from these settings
    pub fn client(&self) -> Result<HubClient> {
        let mut transport = HttpTransport::with_timeout(&self.api_url, self.timeout)?;
        if let Some(token) = &self.api_token {
            transport = transport.with_token(token);
        }
        Ok(HubClient::with_transport(Arc::new(transport)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = Config::new(DEFAULT_API);

        assert!(config.validate().is_ok());
        assert_eq!(config.timeout, Duration::from_secs(30));
        assert!(config.api_token.is_none());
    }

    #[test]
    fn test_rejects_url_without_scheme() {
        let config = Config::new("api.example.com");

        let err = config.validate().unwrap_err();

        assert!(err.to_string().contains("http://"));
    }

    #[test]
    fn test_rejects_zero_timeout() {
        let mut config = Config::new(DEFAULT_API);
        config.timeout = Duration::ZERO;

        assert!(config.validate().is_err());
    }

    #[test]
    fn test_rejects_empty_token() {
        let mut config = Config::new("http://localhost:8080");
        config.api_token = Some(String::new());

        assert!(config.validate().is_err());
    }

    #[test]
    fn test_client_from_config() {
        let mut config = Config::new("http://localhost:8080");
        config.api_token = Some("secret".to_string());

        assert!(config.client().is_ok());
    }
}
