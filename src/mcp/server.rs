//! MCP Server Implementation
//!
//! This module contains the CryptoServer struct which bundles the tool and
//! prompt registries with the identity reported during initialization.

use std::sync::Arc;

use crate::coingecko::MarketGateway;
use crate::error::ProviderError;
use crate::mcp::prompts::PromptRegistry;
use crate::mcp::tools::OperationRegistry;

/// Protocol revisions this server speaks, newest first
pub const SUPPORTED_PROTOCOL_VERSIONS: &[&str] = &["2025-06-18", "2025-03-26", "2024-11-05"];

/// Main crypto MCP server
///
/// Cheap to clone; every session holds a clone and reads the registries
/// without synchronization.
#[derive(Clone)]
pub struct CryptoServer {
    pub operations: Arc<OperationRegistry>,
    pub prompts: Arc<PromptRegistry>,
    service_name: Arc<str>,
}

impl CryptoServer {
    /// Creates the server with the built-in tools and prompts
    pub fn new(
        gateway: Arc<dyn MarketGateway>,
        service_name: impl Into<String>,
    ) -> Result<Self, ProviderError> {
        Ok(Self::from_parts(
            OperationRegistry::builtin(gateway)?,
            PromptRegistry::builtin()?,
            service_name,
        ))
    }

    pub fn from_parts(
        operations: OperationRegistry,
        prompts: PromptRegistry,
        service_name: impl Into<String>,
    ) -> Self {
        Self {
            operations: Arc::new(operations),
            prompts: Arc::new(prompts),
            service_name: Arc::from(service_name.into()),
        }
    }

    pub fn service_name(&self) -> &str {
        &self.service_name
    }

    pub fn version(&self) -> &'static str {
        env!("CARGO_PKG_VERSION")
    }

    pub fn instructions(&self) -> &'static str {
        "Crypto MCP server backed by CoinGecko. Use get_coin_list to discover coin ids, \
         get_price for spot prices by id or ticker symbol, get_market_data for market \
         cap and volume rankings, and get_trending for coins trending in the last 24 hours."
    }

    /// Picks the protocol revision to answer `initialize` with.
    ///
    /// The client's revision when supported, otherwise the newest one.
    pub fn negotiate_protocol_version(&self, requested: Option<&str>) -> &'static str {
        requested
            .and_then(|req| {
                SUPPORTED_PROTOCOL_VERSIONS
                    .iter()
                    .find(|v| **v == req)
                    .copied()
            })
            .unwrap_or(SUPPORTED_PROTOCOL_VERSIONS[0])
    }
}
