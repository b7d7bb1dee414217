//! HTTP Server Configuration
//!
//! Configuration for the SSE front door: bind address, service identity and
//! session limits.

use std::net::SocketAddr;

use super::parse_flag;
use crate::error::ProviderError;

/// Name reported by the liveness probe and during initialization
pub const DEFAULT_SERVICE_NAME: &str = "crypto-mcp-server";

/// HTTP server configuration
///
/// ## Environment Variables
///
/// - `HOST`: Server bind address (default: 127.0.0.1)
/// - `PORT`: Server port (default: 8000)
/// - `DEBUG`: Verbose logging (default: false)
/// - `SERVICE_NAME`: Reported service name (default: crypto-mcp-server)
/// - `MAX_SESSIONS`: Max concurrent SSE sessions (default: 50)
#[derive(Debug, Clone)]
pub struct HttpConfig {
    pub host: String,
    pub port: u16,
    pub debug: bool,
    pub service_name: String,
    pub max_sessions: usize,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8000,
            debug: false,
            service_name: DEFAULT_SERVICE_NAME.to_string(),
            max_sessions: 50,
        }
    }
}

impl HttpConfig {
    /// Load HTTP configuration from environment variables
    ///
    /// # Errors
    ///
    /// Returns error if a variable is set to an unparsable value
    pub fn from_env() -> Result<Self, ProviderError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ProviderError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let host = lookup("HOST")
            .map(|h| h.trim().to_string())
            .filter(|h| !h.is_empty())
            .unwrap_or(defaults.host);

        let port = match lookup("PORT") {
            Some(raw) => raw
                .trim()
                .parse()
                .map_err(|_| ProviderError::Config(format!("PORT is not a valid port: {}", raw)))?,
            None => defaults.port,
        };

        let debug = match lookup("DEBUG") {
            Some(raw) => parse_flag(&raw)
                .ok_or_else(|| ProviderError::Config(format!("DEBUG is not a boolean: {}", raw)))?,
            None => defaults.debug,
        };

        let service_name = lookup("SERVICE_NAME")
            .map(|n| n.trim().to_string())
            .filter(|n| !n.is_empty())
            .unwrap_or(defaults.service_name);

        let max_sessions: usize = match lookup("MAX_SESSIONS") {
            Some(raw) => raw.trim().parse().map_err(|_| {
                ProviderError::Config(format!("MAX_SESSIONS is not a number: {}", raw))
            })?,
            None => defaults.max_sessions,
        };
        if max_sessions == 0 {
            return Err(ProviderError::Config(
                "MAX_SESSIONS must be greater than zero".to_string(),
            ));
        }

        Ok(Self {
            host,
            port,
            debug,
            service_name,
            max_sessions,
        })
    }

    /// Resolved socket address to bind
    pub fn addr(&self) -> Result<SocketAddr, ProviderError> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .map_err(|e| ProviderError::Config(format!("Invalid bind address: {}", e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_values() {
        let config = HttpConfig::from_lookup(|_| None).expect("Failed to load config");

        assert_eq!(config.addr().unwrap().to_string(), "127.0.0.1:8000");
        assert!(!config.debug);
        assert_eq!(config.service_name, "crypto-mcp-server");
        assert_eq!(config.max_sessions, 50);
    }

    #[test]
    fn test_port_from_env() {
        let config = HttpConfig::from_lookup(|key| match key {
            "PORT" => Some("9100".to_string()),
            "DEBUG" => Some("true".to_string()),
            _ => None,
        })
        .unwrap();

        assert_eq!(config.port, 9100);
        assert!(config.debug);
    }

    #[test]
    fn test_invalid_port() {
        let result = HttpConfig::from_lookup(|key| (key == "PORT").then(|| "eighty".to_string()));
        assert!(matches!(result, Err(ProviderError::Config(_))));
    }
}
