//! JSON-RPC method routing for one session
//!
//! Implements:
//! - initialize: Record client options, report capabilities
//! - ping
//! - tools/list, tools/call
//! - prompts/list, prompts/get
//! - notifications/initialized (no response)

use serde_json::{json, Value};

use super::error::{HttpTransportError, Result};
use super::jsonrpc::{
    InitializeParams, InitializeResult, JsonRpcRequest, JsonRpcResponse, ListChangedCapability,
    ServerCapabilities, ServerInfo,
};
use super::session::Session;
use crate::error::{DispatchError, PromptError};
use crate::mcp::CryptoServer;

/// Answers one request frame. Always produces exactly one response.
pub async fn handle_request(
    server: &CryptoServer,
    session: &Session,
    request: JsonRpcRequest,
) -> JsonRpcResponse {
    let id = request.id.clone().unwrap_or(Value::Null);

    tracing::debug!(
        session_id = %session.session_id,
        method = %request.method,
        "Received JSON-RPC request"
    );

    let result = match request.method.as_str() {
        "initialize" => handle_initialize(server, session, request.params),
        "ping" => Ok(json!({})),
        "tools/list" => Ok(handle_tools_list(server)),
        "tools/call" => handle_tools_call(server, request.params).await,
        "prompts/list" => Ok(handle_prompts_list(server)),
        "prompts/get" => handle_prompts_get(server, request.params),
        _ => Err(HttpTransportError::MethodNotFound(request.method.clone())),
    };

    match result {
        Ok(value) => JsonRpcResponse::success(value, id),
        Err(err) => {
            tracing::debug!(
                session_id = %session.session_id,
                method = %request.method,
                error = %err,
                "Request failed"
            );
            JsonRpcResponse::error(err.to_jsonrpc_error(), id)
        }
    }
}

/// Handles a frame without id; never answered
pub fn handle_notification(session: &Session, notification: &JsonRpcRequest) {
    match notification.method.as_str() {
        "notifications/initialized" => {
            tracing::info!(session_id = %session.session_id, "Client initialized");
        }
        other => {
            tracing::debug!(
                session_id = %session.session_id,
                method = %other,
                "Ignoring notification"
            );
        }
    }
}

/// Handle initialize method
///
/// Records the client's options on the session and negotiates the revision
fn handle_initialize(
    server: &CryptoServer,
    session: &Session,
    params: Option<Value>,
) -> Result<Value> {
    let params: InitializeParams = match params {
        Some(params) => serde_json::from_value(params)
            .map_err(|e| HttpTransportError::InvalidParams(e.to_string()))?,
        None => InitializeParams::default(),
    };

    let protocol_version = server.negotiate_protocol_version(params.protocol_version.as_deref());

    tracing::info!(
        session_id = %session.session_id,
        requested = ?params.protocol_version,
        negotiated = %protocol_version,
        "Initializing session"
    );

    session.record_initialize(params);

    let result = InitializeResult {
        protocol_version: protocol_version.to_string(),
        capabilities: ServerCapabilities {
            tools: Some(ListChangedCapability {
                list_changed: Some(false),
            }),
            prompts: Some(ListChangedCapability {
                list_changed: Some(false),
            }),
        },
        server_info: ServerInfo {
            name: server.service_name().to_string(),
            version: server.version().to_string(),
        },
        instructions: Some(server.instructions().to_string()),
    };

    Ok(serde_json::to_value(result)?)
}

/// Handle tools/list method
fn handle_tools_list(server: &CryptoServer) -> Value {
    let tools: Vec<Value> = server
        .operations
        .list()
        .iter()
        .map(|descriptor| descriptor.to_tool_json())
        .collect();

    json!({ "tools": tools })
}

/// Handle tools/call method
///
/// Tool failures become an `isError` result; only an unknown tool name is a
/// protocol error.
async fn handle_tools_call(server: &CryptoServer, params: Option<Value>) -> Result<Value> {
    let params =
        params.ok_or_else(|| HttpTransportError::InvalidParams("Missing params".to_string()))?;

    let tool_name = params["name"]
        .as_str()
        .ok_or_else(|| HttpTransportError::InvalidParams("Missing tool name".to_string()))?;

    let arguments = params.get("arguments").cloned().unwrap_or(Value::Null);

    match server.operations.dispatch(tool_name, &arguments).await {
        Ok(value) => Ok(tool_result(&value, false)),
        Err(DispatchError::Tool(err)) => Ok(tool_result(&err.to_payload(), true)),
        Err(DispatchError::ToolNotFound(name)) => Err(HttpTransportError::ToolNotFound(name)),
    }
}

fn tool_result(payload: &Value, is_error: bool) -> Value {
    json!({
        "content": [{
            "type": "text",
            "text": payload.to_string()
        }],
        "isError": is_error
    })
}

/// Handle prompts/list method
fn handle_prompts_list(server: &CryptoServer) -> Value {
    json!({ "prompts": server.prompts.list() })
}

/// Handle prompts/get method
fn handle_prompts_get(server: &CryptoServer, params: Option<Value>) -> Result<Value> {
    let params =
        params.ok_or_else(|| HttpTransportError::InvalidParams("Missing params".to_string()))?;

    let name = params["name"]
        .as_str()
        .ok_or_else(|| HttpTransportError::InvalidParams("Missing prompt name".to_string()))?;

    let arguments = params.get("arguments").cloned().unwrap_or(Value::Null);

    server
        .prompts
        .get_prompt(name, &arguments)
        .map(|rendered| rendered.to_json())
        .map_err(|err| match err {
            PromptError::PromptNotFound(name) => HttpTransportError::PromptNotFound(name),
            PromptError::Invalid(err) => HttpTransportError::InvalidParams(err.to_string()),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coingecko::test_support::StubGateway;
    use crate::error::GatewayError;
    use crate::transport::http::session::SessionStore;
    use std::collections::HashMap;
    use std::sync::Arc;

    fn server_with(gateway: StubGateway) -> CryptoServer {
        CryptoServer::new(Arc::new(gateway), "crypto-mcp-server").unwrap()
    }

    fn server() -> CryptoServer {
        server_with(StubGateway::new(&[("btc", "bitcoin"), ("eth", "ethereum")]))
    }

    fn session() -> Arc<Session> {
        SessionStore::new(4).accept(HashMap::new()).unwrap().session
    }

    fn request(method: &str, params: Value) -> JsonRpcRequest {
        JsonRpcRequest::new(method, Some(params), Some(json!(7)))
    }

    #[tokio::test]
    async fn test_initialize_records_options() {
        let session = session();
        let response = handle_request(
            &server(),
            &session,
            request(
                "initialize",
                json!({
                    "protocolVersion": "2024-11-05",
                    "capabilities": {},
                    "clientInfo": { "name": "inspector", "version": "1.0" }
                }),
            ),
        )
        .await;

        let result = response.result.unwrap();
        assert_eq!(result["protocolVersion"], "2024-11-05");
        assert_eq!(result["capabilities"]["tools"]["listChanged"], false);
        assert_eq!(result["capabilities"]["prompts"]["listChanged"], false);
        assert_eq!(result["serverInfo"]["name"], "crypto-mcp-server");
        assert!(result["instructions"].is_string());

        let options = session.initialize_options().unwrap();
        assert_eq!(options.protocol_version.as_deref(), Some("2024-11-05"));
        assert_eq!(options.client_info.unwrap()["name"], "inspector");
    }

    #[tokio::test]
    async fn test_initialize_unknown_revision_gets_newest() {
        let response = handle_request(
            &server(),
            &session(),
            request("initialize", json!({ "protocolVersion": "1999-01-01" })),
        )
        .await;

        assert_eq!(response.result.unwrap()["protocolVersion"], "2025-06-18");
    }

    #[tokio::test]
    async fn test_ping() {
        let response = handle_request(&server(), &session(), request("ping", json!({}))).await;
        assert_eq!(response.result, Some(json!({})));
        assert_eq!(response.id, json!(7));
    }

    #[tokio::test]
    async fn test_tools_list() {
        let response =
            handle_request(&server(), &session(), request("tools/list", json!({}))).await;

        let result = response.result.unwrap();
        let names: Vec<&str> = result["tools"]
            .as_array()
            .unwrap()
            .iter()
            .map(|t| t["name"].as_str().unwrap())
            .collect();
        assert_eq!(
            names,
            vec!["get_coin_list", "get_price", "get_market_data", "get_trending"]
        );
        assert_eq!(result["tools"][1]["inputSchema"]["type"], "object");
    }

    #[tokio::test]
    async fn test_tools_call_success() {
        let response = handle_request(
            &server(),
            &session(),
            request("tools/call", json!({ "name": "get_trending" })),
        )
        .await;

        let result = response.result.unwrap();
        assert_eq!(result["isError"], false);
        assert_eq!(result["content"][0]["type"], "text");
        let text: Value =
            serde_json::from_str(result["content"][0]["text"].as_str().unwrap()).unwrap();
        assert_eq!(text, json!({ "stub": true }));
    }

    #[tokio::test]
    async fn test_tools_call_unknown_tool_is_protocol_error() {
        let response = handle_request(
            &server(),
            &session(),
            request("tools/call", json!({ "name": "get_weather", "arguments": {} })),
        )
        .await;

        assert!(response.result.is_none());
        assert_eq!(response.error.unwrap().code, -32601);
        assert_eq!(response.id, json!(7));
    }

    #[tokio::test]
    async fn test_tools_call_failure_is_error_result() {
        let server = server_with(StubGateway::failing(GatewayError::Status {
            status: 429,
            message: "Too many requests to CoinGecko API".to_string(),
        }));

        let response = handle_request(
            &server,
            &session(),
            request("tools/call", json!({ "name": "get_coin_list" })),
        )
        .await;

        let result = response.result.unwrap();
        assert_eq!(result["isError"], true);
        let payload: Value =
            serde_json::from_str(result["content"][0]["text"].as_str().unwrap()).unwrap();
        assert_eq!(payload["error"]["kind"], "upstream_status_error");
        assert_eq!(payload["error"]["status"], 429);
    }

    #[tokio::test]
    async fn test_tools_call_missing_name() {
        let response =
            handle_request(&server(), &session(), request("tools/call", json!({}))).await;
        assert_eq!(response.error.unwrap().code, -32602);
    }

    #[tokio::test]
    async fn test_prompts_list_and_get() {
        let server = server();
        let session = session();

        let listed = handle_request(&server, &session, request("prompts/list", json!({}))).await;
        let prompts = listed.result.unwrap();
        assert_eq!(prompts["prompts"].as_array().unwrap().len(), 4);
        assert_eq!(prompts["prompts"][1]["name"], "get_price");
        assert_eq!(prompts["prompts"][1]["arguments"][2]["name"], "symbols");

        let rendered = handle_request(
            &server,
            &session,
            request(
                "prompts/get",
                json!({ "name": "get_price", "arguments": { "symbols": "btc,eth" } }),
            ),
        )
        .await;
        let result = rendered.result.unwrap();
        assert_eq!(result["messages"][0]["role"], "user");
        assert!(result["messages"][0]["content"]["text"]
            .as_str()
            .unwrap()
            .contains("btc,eth"));
    }

    #[tokio::test]
    async fn test_prompts_get_errors() {
        let server = server();
        let session = session();

        let unknown = handle_request(
            &server,
            &session,
            request("prompts/get", json!({ "name": "get_weather" })),
        )
        .await;
        assert_eq!(unknown.error.unwrap().code, -32602);

        let invalid = handle_request(
            &server,
            &session,
            request(
                "prompts/get",
                json!({ "name": "get_market_data", "arguments": { "per_page": 0 } }),
            ),
        )
        .await;
        assert_eq!(invalid.error.unwrap().code, -32602);
    }

    #[tokio::test]
    async fn test_unknown_method() {
        let response =
            handle_request(&server(), &session(), request("resources/list", json!({}))).await;

        let error = response.error.unwrap();
        assert_eq!(error.code, -32601);
        assert!(error.message.contains("resources/list"));
    }
}
