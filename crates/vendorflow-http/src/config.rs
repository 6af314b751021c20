//! Client configuration.

use std::time::Duration;

use vendorflow_core::error::InvalidInputError;
use vendorflow_core::{ApiUrl, Result};

/// Environment variable holding the API base URL.
pub const API_URL_ENV: &str = "VENDORFLOW_API_URL";

/// Environment variable holding the transport timeout in seconds.
pub const TIMEOUT_ENV: &str = "VENDORFLOW_TIMEOUT_SECS";

/// Base URL used when the environment does not provide one.
pub const DEFAULT_API_URL: &str = "http://localhost:3001";

/// Settings fixed at client construction.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// API base URL, already ending in `/api`.
    pub api_url: ApiUrl,
    /// Transport timeout. `None` leaves reqwest's default (no timeout).
    pub timeout: Option<Duration>,
    pub user_agent: String,
}

impl ClientConfig {
    pub fn new(api_url: ApiUrl) -> Self {
        Self {
            api_url,
            timeout: None,
            user_agent: concat!("vendorflow/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }

    /// Load the configuration from the process environment.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load the configuration from an arbitrary variable lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let api_url = lookup(API_URL_ENV)
            .filter(|value| !value.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_API_URL.to_string());
        let mut config = Self::new(ApiUrl::new(&api_url)?);

        if let Some(raw) = lookup(TIMEOUT_ENV) {
            let secs: u64 = raw.trim().parse().map_err(|_| InvalidInputError::Other {
                message: format!("{} must be a whole number of seconds, got '{}'", TIMEOUT_ENV, raw),
            })?;
            config.timeout = Some(Duration::from_secs(secs));
        }

        Ok(config)
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn defaults_to_localhost() {
        let config = ClientConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config.api_url.as_str(), "http://localhost:3001/api");
        assert!(config.timeout.is_none());
        assert!(config.user_agent.starts_with("vendorflow/"));
    }

    #[test]
    fn reads_url_and_timeout() {
        let config = ClientConfig::from_lookup(lookup(&[
            (API_URL_ENV, "https://api.example.com/api"),
            (TIMEOUT_ENV, "30"),
        ]))
        .unwrap();
        assert_eq!(config.api_url.endpoint_url("orders"), "https://api.example.com/api/orders");
        assert_eq!(config.timeout, Some(Duration::from_secs(30)));
    }

    #[test]
    fn rejects_bad_timeout() {
        assert!(ClientConfig::from_lookup(lookup(&[(TIMEOUT_ENV, "soon")])).is_err());
    }
}
