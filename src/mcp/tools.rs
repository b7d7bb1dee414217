//! Tool registry and the four built-in CoinGecko tools

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{json, Value};

use super::types::{bind_arguments, BoundArguments, OperationDescriptor, ParamSpec, ParamType};
use crate::coingecko::types::{
    MarketsQuery, SimplePriceQuery, DEFAULT_MARKET_ORDER, DEFAULT_PER_PAGE, MAX_PER_PAGE,
};
use crate::coingecko::{MarketGateway, SymbolResolver};
use crate::error::{DispatchError, ProviderError, ToolError};

pub const GET_COIN_LIST: &str = "get_coin_list";
pub const GET_PRICE: &str = "get_price";
pub const GET_MARKET_DATA: &str = "get_market_data";
pub const GET_TRENDING: &str = "get_trending";

/// Executes one tool with already bound arguments
#[async_trait]
pub trait OperationHandler: Send + Sync {
    async fn call(&self, args: BoundArguments) -> Result<Value, ToolError>;
}

struct Operation {
    descriptor: OperationDescriptor,
    handler: Arc<dyn OperationHandler>,
}

/// Name → tool table. Built once at startup, read-only afterwards.
#[derive(Default)]
pub struct OperationRegistry {
    operations: Vec<Operation>,
    index: HashMap<&'static str, usize>,
}

impl OperationRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry holding the four CoinGecko tools
    pub fn builtin(gateway: Arc<dyn MarketGateway>) -> Result<Self, ProviderError> {
        let resolver = SymbolResolver::new(gateway.clone());
        let mut registry = Self::new();

        registry.register(
            get_coin_list_descriptor(),
            Arc::new(ListCoins {
                gateway: gateway.clone(),
            }),
        )?;
        registry.register(
            get_price_descriptor(),
            Arc::new(GetPrice {
                gateway: gateway.clone(),
                resolver,
            }),
        )?;
        registry.register(
            get_market_data_descriptor(),
            Arc::new(GetMarketData {
                gateway: gateway.clone(),
            }),
        )?;
        registry.register(get_trending_descriptor(), Arc::new(GetTrending { gateway }))?;

        Ok(registry)
    }

    /// Adds a tool; names must be unique
    pub fn register(
        &mut self,
        descriptor: OperationDescriptor,
        handler: Arc<dyn OperationHandler>,
    ) -> Result<(), ProviderError> {
        if self.index.contains_key(descriptor.name) {
            return Err(ProviderError::DuplicateTool(descriptor.name.to_string()));
        }

        self.index.insert(descriptor.name, self.operations.len());
        self.operations.push(Operation {
            descriptor,
            handler,
        });
        Ok(())
    }

    /// Tool metadata in registration order
    pub fn list(&self) -> Vec<&OperationDescriptor> {
        self.operations.iter().map(|op| &op.descriptor).collect()
    }

    pub fn descriptor(&self, name: &str) -> Option<&OperationDescriptor> {
        self.index
            .get(name)
            .map(|&i| &self.operations[i].descriptor)
    }

    /// Looks up `name`, binds `arguments` and runs the handler.
    ///
    /// Missing required arguments fail before the handler is invoked.
    pub async fn dispatch(&self, name: &str, arguments: &Value) -> Result<Value, DispatchError> {
        let operation = self
            .index
            .get(name)
            .map(|&i| &self.operations[i])
            .ok_or_else(|| DispatchError::ToolNotFound(name.to_string()))?;

        let args = bind_arguments(&operation.descriptor.params, arguments)?;

        tracing::info!(tool_name = %name, "Executing tool");

        let result = operation.handler.call(args).await;
        if let Err(err) = &result {
            tracing::warn!(tool_name = %name, kind = err.kind(), "Tool failed: {}", err);
        }
        Ok(result?)
    }
}

// ========== Descriptors ==========

pub fn get_coin_list_descriptor() -> OperationDescriptor {
    OperationDescriptor {
        name: GET_COIN_LIST,
        description: "Fetch list of available coins from CoinGecko",
        params: vec![],
    }
}

pub fn get_price_descriptor() -> OperationDescriptor {
    OperationDescriptor {
        name: GET_PRICE,
        description: "Get the price of selected coins by CoinGecko id or ticker symbol",
        params: vec![
            ParamSpec::optional(
                "vs_currencies",
                ParamType::String,
                "Comma-separated list of currencies (e.g., \"usd,eur\")",
            )
            .with_default(json!("usd")),
            ParamSpec::optional(
                "ids",
                ParamType::String,
                "Comma-separated list of coin IDs (e.g., \"bitcoin,ethereum\")",
            ),
            ParamSpec::optional(
                "symbols",
                ParamType::String,
                "Comma-separated list of coin symbols (e.g., \"btc,eth\")",
            ),
        ],
    }
}

pub fn get_market_data_descriptor() -> OperationDescriptor {
    OperationDescriptor {
        name: GET_MARKET_DATA,
        description: "Get cryptocurrency market data",
        params: vec![
            ParamSpec::optional(
                "vs_currency",
                ParamType::String,
                "The target currency (e.g., usd, eur)",
            )
            .with_default(json!("usd")),
            ParamSpec::optional("ids", ParamType::String, "Comma-separated list of coin IDs"),
            ParamSpec::optional("category", ParamType::String, "Filter by category"),
            ParamSpec::optional(
                "order",
                ParamType::String,
                "Sort by field (market_cap_desc, volume_asc, etc.)",
            )
            .with_default(json!(DEFAULT_MARKET_ORDER)),
            ParamSpec::optional("per_page", ParamType::Integer, "Number of results per page")
                .with_default(json!(DEFAULT_PER_PAGE)),
            ParamSpec::optional("page", ParamType::Integer, "Page number").with_default(json!(1)),
            ParamSpec::optional("sparkline", ParamType::Boolean, "Include sparkline data")
                .with_default(json!(false)),
        ],
    }
}

pub fn get_trending_descriptor() -> OperationDescriptor {
    OperationDescriptor {
        name: GET_TRENDING,
        description: "Get trending coins in the last 24 hours",
        params: vec![],
    }
}

// ========== Argument helpers ==========

/// Splits a comma-separated argument, dropping blank items
pub(crate) fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(str::to_string)
        .collect()
}

/// Selection of coins for `get_price`; ids win over symbols
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum CoinSelection {
    Ids(Vec<String>),
    Symbols(Vec<String>),
}

pub(crate) fn coin_selection(args: &BoundArguments) -> Result<CoinSelection, ToolError> {
    let ids = args.str("ids").map(split_list).unwrap_or_default();
    if !ids.is_empty() {
        return Ok(CoinSelection::Ids(ids));
    }

    let symbols: Vec<String> = args
        .str("symbols")
        .map(split_list)
        .unwrap_or_default()
        .into_iter()
        .map(|s| s.to_lowercase())
        .collect();
    if !symbols.is_empty() {
        return Ok(CoinSelection::Symbols(symbols));
    }

    Err(ToolError::Validation(
        "Please provide at least one coin id or symbol".to_string(),
    ))
}

pub(crate) fn markets_query(args: &BoundArguments) -> Result<MarketsQuery, ToolError> {
    let per_page = args.integer("per_page").unwrap_or(DEFAULT_PER_PAGE as i64);
    if !(1..=MAX_PER_PAGE as i64).contains(&per_page) {
        return Err(ToolError::Validation(format!(
            "per_page must be between 1 and {}, got {}",
            MAX_PER_PAGE, per_page
        )));
    }

    let page = args.integer("page").unwrap_or(1);
    if !(1..=u32::MAX as i64).contains(&page) {
        return Err(ToolError::Validation(format!(
            "page must be between 1 and {}, got {}",
            u32::MAX,
            page
        )));
    }

    Ok(MarketsQuery {
        vs_currency: args.str("vs_currency").unwrap_or("usd").to_string(),
        ids: args.str("ids").map(str::to_string),
        category: args.str("category").map(str::to_string),
        order: args
            .str("order")
            .unwrap_or(DEFAULT_MARKET_ORDER)
            .to_string(),
        per_page: per_page as u32,
        page: page as u32,
        sparkline: args.boolean("sparkline").unwrap_or(false),
    })
}

// ========== Tool Handlers ==========

struct ListCoins {
    gateway: Arc<dyn MarketGateway>,
}

#[async_trait]
impl OperationHandler for ListCoins {
    async fn call(&self, _args: BoundArguments) -> Result<Value, ToolError> {
        let coins = self.gateway.fetch_coin_list().await?;
        serde_json::to_value(coins)
            .map_err(|e| ToolError::UpstreamFetch(format!("invalid coin list: {}", e)))
    }
}

struct GetPrice {
    gateway: Arc<dyn MarketGateway>,
    resolver: SymbolResolver,
}

#[async_trait]
impl OperationHandler for GetPrice {
    async fn call(&self, args: BoundArguments) -> Result<Value, ToolError> {
        let ids = match coin_selection(&args)? {
            CoinSelection::Ids(ids) => ids,
            CoinSelection::Symbols(symbols) => {
                let ids = self.resolver.resolve(&symbols).await?;
                if ids.is_empty() {
                    return Err(ToolError::Resolution("No valid symbols provided".to_string()));
                }
                ids
            }
        };

        let query = SimplePriceQuery {
            ids,
            vs_currencies: args.str("vs_currencies").unwrap_or("usd").to_string(),
        };

        Ok(self.gateway.fetch_simple_price(&query).await?)
    }
}

struct GetMarketData {
    gateway: Arc<dyn MarketGateway>,
}

#[async_trait]
impl OperationHandler for GetMarketData {
    async fn call(&self, args: BoundArguments) -> Result<Value, ToolError> {
        let query = markets_query(&args)?;
        Ok(self.gateway.fetch_markets(&query).await?)
    }
}

struct GetTrending {
    gateway: Arc<dyn MarketGateway>,
}

#[async_trait]
impl OperationHandler for GetTrending {
    async fn call(&self, _args: BoundArguments) -> Result<Value, ToolError> {
        Ok(self.gateway.fetch_trending().await?)
    }
}
