// Library exports for crypto-provider

pub mod error;

pub mod coingecko; // CoinGecko API client and symbol resolution
pub mod config; // Configuration management

pub mod mcp; // Tool and prompt registries
pub mod transport; // MCP transport layer (SSE)
