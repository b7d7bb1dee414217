//! CoinGecko API Type Definitions
//!
//! Request descriptions for the endpoints the gateway calls, and the coin
//! catalog entry used for symbol resolution.

use serde::{Deserialize, Serialize};

/// Default sort order for `/coins/markets`
pub const DEFAULT_MARKET_ORDER: &str = "market_cap_desc";

/// Default page size for `/coins/markets`
pub const DEFAULT_PER_PAGE: u32 = 100;

/// Largest page size CoinGecko accepts
pub const MAX_PER_PAGE: u32 = 250;

/// One entry of `/coins/list`
///
/// # Example Response
/// ```json
/// [{ "id": "bitcoin", "symbol": "btc", "name": "Bitcoin" }]
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoinCatalogEntry {
    pub id: String,
    pub symbol: String,
    pub name: String,
}

/// Parameters of `/simple/price`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SimplePriceQuery {
    /// Coin ids to price
    pub ids: Vec<String>,
    /// Comma-separated quote currencies as supplied by the caller (e.g. "usd,eur")
    pub vs_currencies: String,
}

impl SimplePriceQuery {
    pub fn to_query_pairs(&self) -> Vec<(&'static str, String)> {
        vec![
            ("vs_currencies", self.vs_currencies.clone()),
            ("ids", self.ids.join(",")),
        ]
    }
}

/// Parameters of `/coins/markets`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarketsQuery {
    pub vs_currency: String,
    pub ids: Option<String>,
    pub category: Option<String>,
    pub order: String,
    pub per_page: u32,
    pub page: u32,
    pub sparkline: bool,
}

impl Default for MarketsQuery {
    fn default() -> Self {
        Self {
            vs_currency: "usd".to_string(),
            ids: None,
            category: None,
            order: DEFAULT_MARKET_ORDER.to_string(),
            per_page: DEFAULT_PER_PAGE,
            page: 1,
            sparkline: false,
        }
    }
}

impl MarketsQuery {
    /// Query string pairs; `ids` and `category` only when supplied.
    ///
    /// CoinGecko expects `sparkline` as the lowercase text `true`/`false`.
    pub fn to_query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = vec![
            ("vs_currency", self.vs_currency.clone()),
            ("order", self.order.clone()),
            ("per_page", self.per_page.to_string()),
            ("page", self.page.to_string()),
            ("sparkline", self.sparkline.to_string()),
        ];

        if let Some(ids) = &self.ids {
            pairs.push(("ids", ids.clone()));
        }
        if let Some(category) = &self.category {
            pairs.push(("category", category.clone()));
        }

        pairs
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalog_entry_deserialization() {
        let json = r#"[{"id": "bitcoin", "symbol": "btc", "name": "Bitcoin"}]"#;
        let entries: Vec<CoinCatalogEntry> = serde_json::from_str(json).unwrap();

        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].id, "bitcoin");
        assert_eq!(entries[0].symbol, "btc");
    }

    #[test]
    fn test_markets_query_defaults() {
        let pairs = MarketsQuery::default().to_query_pairs();

        assert!(pairs.contains(&("order", "market_cap_desc".to_string())));
        assert!(pairs.contains(&("per_page", "100".to_string())));
        assert!(pairs.contains(&("page", "1".to_string())));
        assert!(pairs.contains(&("sparkline", "false".to_string())));
        assert!(!pairs.iter().any(|(k, _)| *k == "ids" || *k == "category"));
    }

    #[test]
    fn test_markets_query_optional_filters() {
        let query = MarketsQuery {
            ids: Some("bitcoin,ethereum".to_string()),
            category: Some("layer-1".to_string()),
            sparkline: true,
            ..Default::default()
        };
        let pairs = query.to_query_pairs();

        assert!(pairs.contains(&("ids", "bitcoin,ethereum".to_string())));
        assert!(pairs.contains(&("category", "layer-1".to_string())));
        assert!(pairs.contains(&("sparkline", "true".to_string())));
    }

    #[test]
    fn test_simple_price_query_joins_ids() {
        let query = SimplePriceQuery {
            ids: vec!["bitcoin".to_string(), "ethereum".to_string()],
            vs_currencies: "usd,eur".to_string(),
        };

        assert_eq!(
            query.to_query_pairs(),
            vec![
                ("vs_currencies", "usd,eur".to_string()),
                ("ids", "bitcoin,ethereum".to_string()),
            ]
        );
    }
}
