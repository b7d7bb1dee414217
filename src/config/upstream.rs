//! CoinGecko gateway configuration

use std::time::Duration;

use super::credentials::Credentials;
use crate::error::ProviderError;

/// Default CoinGecko API base URL
pub const DEFAULT_BASE_URL: &str = "https://api.coingecko.com/api/v3";

/// Upstream gateway configuration
///
/// ## Environment Variables
///
/// - `COINGECKO_API_KEY`: API key (optional, sent as a header only when set)
/// - `COINGECKO_API_PLAN`: `demo` or `pro` (default: demo)
/// - `COINGECKO_BASE_URL`: API base URL (default: https://api.coingecko.com/api/v3)
/// - `COINGECKO_TIMEOUT_SECS`: Request timeout in seconds (default: 30)
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    pub base_url: String,
    pub credentials: Option<Credentials>,
    pub timeout: Duration,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            credentials: None,
            timeout: Duration::from_secs(30),
        }
    }
}

impl GatewayConfig {
    pub fn from_env() -> Result<Self, ProviderError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ProviderError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let credentials = Credentials::from_lookup(&lookup)?;

        let base_url = lookup("COINGECKO_BASE_URL")
            .map(|url| url.trim().trim_end_matches('/').to_string())
            .filter(|url| !url.is_empty())
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());

        let timeout_secs: u64 = match lookup("COINGECKO_TIMEOUT_SECS") {
            Some(raw) => raw.trim().parse().map_err(|_| {
                ProviderError::Config(format!("COINGECKO_TIMEOUT_SECS is not a number: {}", raw))
            })?,
            None => 30,
        };
        if timeout_secs == 0 {
            return Err(ProviderError::Config(
                "COINGECKO_TIMEOUT_SECS must be greater than zero".to_string(),
            ));
        }

        Ok(Self {
            base_url,
            credentials,
            timeout: Duration::from_secs(timeout_secs),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_values() {
        let config = GatewayConfig::from_lookup(|_| None).unwrap();

        assert_eq!(config.base_url, DEFAULT_BASE_URL);
        assert!(config.credentials.is_none());
        assert_eq!(config.timeout, Duration::from_secs(30));
    }

    #[test]
    fn test_overrides() {
        let config = GatewayConfig::from_lookup(|key| match key {
            "COINGECKO_BASE_URL" => Some("http://localhost:9000/api/v3/".to_string()),
            "COINGECKO_TIMEOUT_SECS" => Some("5".to_string()),
            "COINGECKO_API_KEY" => Some("CG-test".to_string()),
            _ => None,
        })
        .unwrap();

        assert_eq!(config.base_url, "http://localhost:9000/api/v3");
        assert_eq!(config.timeout, Duration::from_secs(5));
        assert!(config.credentials.is_some());
    }

    #[test]
    fn test_zero_timeout_rejected() {
        let result = GatewayConfig::from_lookup(|key| {
            (key == "COINGECKO_TIMEOUT_SECS").then(|| "0".to_string())
        });
        assert!(result.is_err());
    }
}
