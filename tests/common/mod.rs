// Shared fixtures for integration tests: an in-memory CoinGecko gateway and
// helpers to open sessions without a network listener.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use futures::StreamExt;
use serde_json::{json, Value};
use tokio::sync::Semaphore;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crypto_provider::coingecko::{CoinCatalogEntry, MarketGateway, MarketsQuery, SimplePriceQuery};
use crypto_provider::error::GatewayError;
use crypto_provider::mcp::CryptoServer;
use crypto_provider::transport::http::connection::run_session;
use crypto_provider::transport::http::jsonrpc::JsonRpcResponse;
use crypto_provider::transport::http::session::{Session, SessionChannels, SessionStore};
use crypto_provider::transport::http::stream::{OutboundFrame, SessionStream};

/// Gateway answering from fixed data.
///
/// When `gate` is set, each `fetch_trending` call consumes one permit from it
/// before answering.
pub struct FakeGateway {
    pub catalog: Vec<CoinCatalogEntry>,
    pub gate: Option<Arc<Semaphore>>,
}

impl FakeGateway {
    pub fn new() -> Self {
        Self {
            catalog: vec![
                coin("bitcoin", "btc", "Bitcoin"),
                coin("ethereum", "eth", "Ethereum"),
                coin("solana", "sol", "Solana"),
            ],
            gate: None,
        }
    }

    pub fn gated(gate: Arc<Semaphore>) -> Self {
        Self {
            gate: Some(gate),
            ..Self::new()
        }
    }
}

fn coin(id: &str, symbol: &str, name: &str) -> CoinCatalogEntry {
    CoinCatalogEntry {
        id: id.to_string(),
        symbol: symbol.to_string(),
        name: name.to_string(),
    }
}

#[async_trait]
impl MarketGateway for FakeGateway {
    async fn fetch_coin_list(&self) -> Result<Vec<CoinCatalogEntry>, GatewayError> {
        Ok(self.catalog.clone())
    }

    async fn fetch_simple_price(&self, query: &SimplePriceQuery) -> Result<Value, GatewayError> {
        let prices: serde_json::Map<String, Value> = query
            .ids
            .iter()
            .map(|id| {
                let mut quote = serde_json::Map::new();
                quote.insert(query.vs_currencies.clone(), json!(1.0));
                (id.clone(), Value::Object(quote))
            })
            .collect();
        Ok(Value::Object(prices))
    }

    async fn fetch_markets(&self, query: &MarketsQuery) -> Result<Value, GatewayError> {
        Ok(json!([{ "id": "bitcoin", "current_price": 1.0, "vs": query.vs_currency }]))
    }

    async fn fetch_trending(&self) -> Result<Value, GatewayError> {
        if let Some(gate) = &self.gate {
            if let Ok(permit) = gate.acquire().await {
                permit.forget();
            }
        }
        Ok(json!({ "coins": [{ "item": { "id": "solana" } }] }))
    }
}

pub fn server_with(gateway: FakeGateway) -> CryptoServer {
    CryptoServer::new(Arc::new(gateway), "crypto-mcp-server").unwrap()
}

pub fn server() -> CryptoServer {
    server_with(FakeGateway::new())
}

/// A session whose loop runs on a spawned task
pub struct TestSession {
    pub session: Arc<Session>,
    pub stream: SessionStream,
    pub handle: JoinHandle<()>,
}

impl TestSession {
    pub fn id(&self) -> uuid::Uuid {
        self.session.session_id
    }

    /// Next frame from the event stream, failing the test after 5 s
    pub async fn next_frame(&mut self) -> OutboundFrame {
        tokio::time::timeout(Duration::from_secs(5), self.stream.next())
            .await
            .expect("timed out waiting for a frame")
            .expect("event stream ended")
    }

    pub async fn next_response(&mut self) -> JsonRpcResponse {
        match self.next_frame().await {
            OutboundFrame::Message(response) => response,
            other => panic!("expected a message frame, got {:?}", other),
        }
    }
}

/// Accepts a session and starts its loop, consuming the endpoint event
pub async fn open_session(
    server: &CryptoServer,
    store: &SessionStore,
    shutdown: &CancellationToken,
) -> TestSession {
    let SessionChannels {
        session,
        inbound,
        outbound,
        stream,
    } = store.accept(HashMap::new()).unwrap();

    let handle = tokio::spawn(run_session(
        server.clone(),
        store.clone(),
        session.clone(),
        inbound,
        outbound,
        shutdown.child_token(),
    ));

    let mut test_session = TestSession {
        session,
        stream,
        handle,
    };

    match test_session.next_frame().await {
        OutboundFrame::Endpoint(uri) => {
            assert_eq!(
                uri,
                format!("/messages/?session_id={}", test_session.id().simple())
            );
        }
        other => panic!("expected the endpoint frame first, got {:?}", other),
    }

    test_session
}

pub fn request(id: i64, method: &str, params: Value) -> String {
    json!({ "jsonrpc": "2.0", "id": id, "method": method, "params": params }).to_string()
}

/// Decodes the JSON text carried by a tools/call result
pub fn tool_payload(response: &JsonRpcResponse) -> Value {
    let result = response.result.as_ref().expect("tools/call result");
    serde_json::from_str(result["content"][0]["text"].as_str().unwrap()).unwrap()
}
