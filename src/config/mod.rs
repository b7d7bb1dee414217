//! Configuration Management
//!
//! This module handles loading the HTTP server settings and the upstream
//! CoinGecko settings (including the optional API key) from the environment.

pub mod credentials;
pub mod http;
pub mod upstream;

// Re-export
pub use credentials::{ApiPlan, Credentials, SecretString};
pub use http::HttpConfig;
pub use upstream::GatewayConfig;

/// Parses a boolean environment value (`1`, `true`, `yes`, `on`)
pub(crate) fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" | "" => Some(false),
        _ => None,
    }
}
