//! CoinGecko API Gateway
//!
//! This module contains the upstream market data boundary: the gateway trait,
//! its reqwest-backed client, the request/response types and the symbol resolver.

pub mod client;
pub mod resolver;
pub mod types;

// Re-export commonly used types
pub use client::{CoinGeckoClient, MarketGateway};
pub use resolver::SymbolResolver;
pub use types::{CoinCatalogEntry, MarketsQuery, SimplePriceQuery};

#[cfg(test)]
pub(crate) mod test_support;
