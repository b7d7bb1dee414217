//! API Credential Management
//!
//! Secure handling of the CoinGecko API key loaded from environment variables.
//! The key is never logged at INFO/WARN levels and is masked when displayed.

use std::fmt;

use crate::error::ProviderError;

/// Secure string wrapper that masks sensitive data in logs
///
/// Debug output shows only `SecretString(***)` and Display shows the
/// truncated form `first4...last4`.
#[derive(Clone, PartialEq, Eq)]
pub struct SecretString(String);

impl SecretString {
    pub fn new(value: String) -> Self {
        SecretString(value)
    }

    /// Returns a reference to the inner string
    ///
    /// Only use this when building the upstream request headers.
    pub fn expose_secret(&self) -> &str {
        &self.0
    }

    /// Returns a masked version of the secret for safe logging
    pub fn masked(&self) -> String {
        let chars: Vec<char> = self.0.chars().collect();
        if chars.len() <= 8 {
            return "***".to_string();
        }
        let head: String = chars[..4].iter().collect();
        let tail: String = chars[chars.len() - 4..].iter().collect();
        format!("{}...{}", head, tail)
    }
}

impl fmt::Debug for SecretString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SecretString(***)")
    }
}

impl fmt::Display for SecretString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.masked())
    }
}

impl From<String> for SecretString {
    fn from(s: String) -> Self {
        SecretString::new(s)
    }
}

/// CoinGecko subscription plan, selects the API key header name
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ApiPlan {
    #[default]
    Demo,
    Pro,
}

impl ApiPlan {
    pub fn header_name(&self) -> &'static str {
        match self {
            ApiPlan::Demo => "x-cg-demo-api-key",
            ApiPlan::Pro => "x-cg-pro-api-key",
        }
    }
}

impl std::str::FromStr for ApiPlan {
    type Err = ProviderError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "" | "demo" => Ok(ApiPlan::Demo),
            "pro" => Ok(ApiPlan::Pro),
            other => Err(ProviderError::Config(format!(
                "COINGECKO_API_PLAN must be 'demo' or 'pro', got '{}'",
                other
            ))),
        }
    }
}

/// CoinGecko API key together with the plan it belongs to
#[derive(Clone, Debug)]
pub struct Credentials {
    pub api_key: SecretString,
    pub plan: ApiPlan,
}

impl Credentials {
    /// Reads `COINGECKO_API_KEY` and `COINGECKO_API_PLAN`.
    ///
    /// Returns `Ok(None)` when no key is configured (or it is blank), in which
    /// case requests go out without the key header.
    pub fn from_lookup<F>(lookup: F) -> Result<Option<Self>, ProviderError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let plan: ApiPlan = lookup("COINGECKO_API_PLAN")
            .unwrap_or_default()
            .parse()?;

        let api_key = match lookup("COINGECKO_API_KEY") {
            Some(key) => key.trim().to_string(),
            None => return Ok(None),
        };

        if api_key.is_empty() {
            return Ok(None);
        }

        Ok(Some(Self {
            api_key: SecretString::new(api_key),
            plan,
        }))
    }

    /// Header name and value to attach to every upstream request
    pub fn header(&self) -> (&'static str, &str) {
        (self.plan.header_name(), self.api_key.expose_secret())
    }
}
