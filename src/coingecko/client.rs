//! CoinGecko HTTP Client
//!
//! HTTP client wrapper for making requests to the CoinGecko REST API.
//! Provides timeout configuration, user-agent and accept headers, and the
//! optional API key header.

use async_trait::async_trait;
use reqwest::header::ACCEPT;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::coingecko::types::{CoinCatalogEntry, MarketsQuery, SimplePriceQuery};
use crate::config::{Credentials, GatewayConfig};
use crate::error::{GatewayError, ProviderError};

/// Read-only market data endpoints the tools call into.
///
/// Every method makes exactly one upstream attempt and converts any failure
/// into a [`GatewayError`].
#[async_trait]
pub trait MarketGateway: Send + Sync {
    /// GET /coins/list
    async fn fetch_coin_list(&self) -> Result<Vec<CoinCatalogEntry>, GatewayError>;

    /// GET /simple/price
    async fn fetch_simple_price(&self, query: &SimplePriceQuery) -> Result<Value, GatewayError>;

    /// GET /coins/markets
    async fn fetch_markets(&self, query: &MarketsQuery) -> Result<Value, GatewayError>;

    /// GET /search/trending
    async fn fetch_trending(&self) -> Result<Value, GatewayError>;
}

/// CoinGecko REST API HTTP client
///
/// Wraps reqwest::Client with CoinGecko-specific configuration including
/// timeout, base URL and the API key header.
#[derive(Clone)]
pub struct CoinGeckoClient {
    pub(crate) client: Client,
    pub(crate) base_url: String,
    pub(crate) credentials: Option<Credentials>,
}

impl std::fmt::Debug for CoinGeckoClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CoinGeckoClient")
            .field("base_url", &self.base_url)
            .field("api_key", &self.credentials.as_ref().map(|_| "***"))
            .finish()
    }
}

impl CoinGeckoClient {
    /// Creates a client from gateway configuration
    ///
    /// # Errors
    /// Returns `Initialization` if the underlying HTTP client cannot be built
    pub fn new(config: &GatewayConfig) -> Result<Self, ProviderError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .user_agent(concat!("crypto-provider/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| {
                ProviderError::Initialization(format!("Failed to create HTTP client: {}", e))
            })?;

        Ok(Self {
            client,
            base_url: config.base_url.clone(),
            credentials: config.credentials.clone(),
        })
    }

    /// Returns the configured base URL
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Builds a GET request with the fixed header set
    fn build_request(
        &self,
        path: &str,
        query: &[(&'static str, String)],
    ) -> Result<reqwest::Request, GatewayError> {
        let url = format!("{}{}", self.base_url, path);

        let mut request = self.client.get(&url).header(ACCEPT, "application/json");

        if !query.is_empty() {
            request = request.query(query);
        }
        if let Some(credentials) = &self.credentials {
            let (name, value) = credentials.header();
            request = request.header(name, value);
        }

        request.build().map_err(GatewayError::from)
    }

    /// Executes a GET request and decodes the JSON body
    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&'static str, String)],
    ) -> Result<T, GatewayError> {
        let request = self.build_request(path, query)?;

        let response = self.client.execute(request).await.map_err(|e| {
            tracing::warn!(path = %path, "CoinGecko request error: {}", e);
            GatewayError::from(e)
        })?;

        let response = response.error_for_status().map_err(|e| {
            tracing::warn!(path = %path, "CoinGecko HTTP error: {}", e);
            GatewayError::from(e)
        })?;

        response.json::<T>().await.map_err(|e| {
            tracing::warn!(path = %path, "CoinGecko response decode error: {}", e);
            GatewayError::Decode(e.to_string())
        })
    }
}

#[async_trait]
impl MarketGateway for CoinGeckoClient {
    async fn fetch_coin_list(&self) -> Result<Vec<CoinCatalogEntry>, GatewayError> {
        self.get_json("/coins/list", &[]).await
    }

    async fn fetch_simple_price(&self, query: &SimplePriceQuery) -> Result<Value, GatewayError> {
        self.get_json("/simple/price", &query.to_query_pairs()).await
    }

    async fn fetch_markets(&self, query: &MarketsQuery) -> Result<Value, GatewayError> {
        self.get_json("/coins/markets", &query.to_query_pairs())
            .await
    }

    async fn fetch_trending(&self) -> Result<Value, GatewayError> {
        self.get_json("/search/trending", &[]).await
    }
}
