//! Ticker symbol to coin id resolution
//!
//! The catalog is fetched fresh for every resolution; there is no caching
//! across calls.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use super::client::MarketGateway;
use super::types::CoinCatalogEntry;
use crate::error::GatewayError;

/// Maps ticker symbols to canonical CoinGecko ids
#[derive(Clone)]
pub struct SymbolResolver {
    gateway: Arc<dyn MarketGateway>,
}

impl SymbolResolver {
    pub fn new(gateway: Arc<dyn MarketGateway>) -> Self {
        Self { gateway }
    }

    /// Resolves `symbols` against a freshly fetched catalog.
    ///
    /// Unknown symbols are dropped. An empty result is not an error.
    pub async fn resolve(&self, symbols: &[String]) -> Result<Vec<String>, GatewayError> {
        let catalog = self.gateway.fetch_coin_list().await?;
        let ids = resolve_against(&catalog, symbols);

        tracing::debug!(
            requested = symbols.len(),
            resolved = ids.len(),
            catalog_size = catalog.len(),
            "Resolved symbols"
        );

        Ok(ids)
    }
}

/// Resolves symbols against a catalog snapshot.
///
/// Duplicate catalog symbols resolve to the last entry. Output keeps request
/// order with duplicates removed.
pub fn resolve_against(catalog: &[CoinCatalogEntry], symbols: &[String]) -> Vec<String> {
    let symbol_to_id: HashMap<&str, &str> = catalog
        .iter()
        .map(|coin| (coin.symbol.as_str(), coin.id.as_str()))
        .collect();

    let mut seen = HashSet::new();
    symbols
        .iter()
        .filter_map(|symbol| symbol_to_id.get(symbol.as_str()))
        .filter(|id| seen.insert(**id))
        .map(|id| id.to_string())
        .collect()
}
