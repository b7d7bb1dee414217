//! In-memory gateway used by unit tests

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use serde_json::{json, Value};

use super::client::MarketGateway;
use super::types::{CoinCatalogEntry, MarketsQuery, SimplePriceQuery};
use crate::error::GatewayError;

/// Canned gateway that records what it was asked for
pub(crate) struct StubGateway {
    pub catalog: Vec<CoinCatalogEntry>,
    pub payload: Value,
    pub failure: Option<GatewayError>,
    pub calls: AtomicUsize,
    pub price_queries: Mutex<Vec<SimplePriceQuery>>,
    pub market_queries: Mutex<Vec<MarketsQuery>>,
}

impl StubGateway {
    pub fn new(catalog: &[(&str, &str)]) -> Self {
        Self {
            catalog: catalog
                .iter()
                .map(|(symbol, id)| CoinCatalogEntry {
                    id: id.to_string(),
                    symbol: symbol.to_string(),
                    name: id.to_string(),
                })
                .collect(),
            payload: json!({ "stub": true }),
            failure: None,
            calls: AtomicUsize::new(0),
            price_queries: Mutex::new(Vec::new()),
            market_queries: Mutex::new(Vec::new()),
        }
    }

    pub fn failing(failure: GatewayError) -> Self {
        Self {
            failure: Some(failure),
            ..Self::new(&[])
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn record(&self) -> Result<(), GatewayError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match &self.failure {
            Some(err) => Err(err.clone()),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl MarketGateway for StubGateway {
    async fn fetch_coin_list(&self) -> Result<Vec<CoinCatalogEntry>, GatewayError> {
        self.record()?;
        Ok(self.catalog.clone())
    }

    async fn fetch_simple_price(&self, query: &SimplePriceQuery) -> Result<Value, GatewayError> {
        self.record()?;
        self.price_queries.lock().unwrap().push(query.clone());
        Ok(self.payload.clone())
    }

    async fn fetch_markets(&self, query: &MarketsQuery) -> Result<Value, GatewayError> {
        self.record()?;
        self.market_queries.lock().unwrap().push(query.clone());
        Ok(self.payload.clone())
    }

    async fn fetch_trending(&self) -> Result<Value, GatewayError> {
        self.record()?;
        Ok(self.payload.clone())
    }
}
