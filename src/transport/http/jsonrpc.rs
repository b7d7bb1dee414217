//! JSON-RPC 2.0 frames for the MCP SSE transport
//!
//! Implements JSON-RPC 2.0 specification:
//! - Request: { jsonrpc: "2.0", method, params, id }
//! - Response: { jsonrpc: "2.0", result, id } OR { jsonrpc: "2.0", error, id }
//! - Notification: { jsonrpc: "2.0", method, params } (no id)

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// JSON-RPC 2.0 request message
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonRpcRequest {
    /// JSON-RPC version (always "2.0")
    pub jsonrpc: String,

    /// Method name (e.g., "initialize", "tools/list", "tools/call")
    pub method: String,

    /// Method parameters (optional)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub params: Option<Value>,

    /// Request ID (optional for notifications)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<Value>,
}

impl JsonRpcRequest {
    /// Create a new JSON-RPC request
    pub fn new(method: impl Into<String>, params: Option<Value>, id: Option<Value>) -> Self {
        Self {
            jsonrpc: "2.0".to_string(),
            method: method.into(),
            params,
            id,
        }
    }

    /// Check if this is a notification (no id)
    pub fn is_notification(&self) -> bool {
        self.id.is_none()
    }
}

/// JSON-RPC 2.0 response message (success)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonRpcResponse {
    /// JSON-RPC version (always "2.0")
    pub jsonrpc: String,

    /// Result value (present on success)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,

    /// Error object (present on failure)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<JsonRpcError>,

    /// Request ID (matches request, or null)
    pub id: Value,
}

impl JsonRpcResponse {
    /// Create a successful response
    pub fn success(result: Value, id: Value) -> Self {
        Self {
            jsonrpc: "2.0".to_string(),
            result: Some(result),
            error: None,
            id,
        }
    }

    /// Create an error response
    pub fn error(error: JsonRpcError, id: Value) -> Self {
        Self {
            jsonrpc: "2.0".to_string(),
            result: None,
            error: Some(error),
            id,
        }
    }
}

/// JSON-RPC 2.0 error object
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonRpcError {
    /// Error code (integer)
    pub code: i32,

    /// Error message (string)
    pub message: String,

    /// Additional error data (optional)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

impl JsonRpcError {
    /// Create a new JSON-RPC error
    pub fn new(code: i32, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            data: None,
        }
    }

    // Standard JSON-RPC 2.0 error codes
    pub fn parse_error() -> Self {
        Self::new(-32700, "Parse error")
    }

    pub fn invalid_request(reason: &str) -> Self {
        Self::new(-32600, format!("Invalid Request: {}", reason))
    }

    pub fn method_not_found(method: &str) -> Self {
        Self::new(-32601, format!("Method not found: {}", method))
    }

    pub fn invalid_params(reason: &str) -> Self {
        Self::new(-32602, format!("Invalid params: {}", reason))
    }

    pub fn internal_error(reason: &str) -> Self {
        Self::new(-32603, format!("Internal error: {}", reason))
    }
}

/// MCP initialization result
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InitializeResult {
    pub protocol_version: String,

    pub capabilities: ServerCapabilities,

    pub server_info: ServerInfo,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub instructions: Option<String>,
}

/// Server capabilities
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerCapabilities {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tools: Option<ListChangedCapability>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub prompts: Option<ListChangedCapability>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListChangedCapability {
    /// Whether the server notifies clients when the list changes
    #[serde(skip_serializing_if = "Option::is_none")]
    pub list_changed: Option<bool>,
}

/// Server information
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerInfo {
    pub name: String,

    pub version: String,
}

/// Parameters of an `initialize` request, as far as the server records them
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InitializeParams {
    #[serde(default)]
    pub protocol_version: Option<String>,

    #[serde(default)]
    pub capabilities: Value,

    #[serde(default)]
    pub client_info: Option<Value>,
}

/// A decoded inbound frame
#[derive(Debug, Clone)]
pub enum InboundFrame {
    /// Carries an id and expects exactly one response
    Request(JsonRpcRequest),

    /// No id, never answered
    Notification(JsonRpcRequest),

    /// A response sent by the client; the server issues no requests, so it is ignored
    Response(Value),
}

/// Decodes one raw frame.
///
/// On failure returns the error response to send back: `-32700` with a null
/// id for invalid JSON, `-32600` (id echoed when usable) for JSON that is not
/// a JSON-RPC 2.0 message. An explicit `"id": null` is rejected rather than
/// read as a notification.
pub fn decode_frame(raw: &str) -> Result<InboundFrame, JsonRpcResponse> {
    let value: Value = serde_json::from_str(raw)
        .map_err(|_| JsonRpcResponse::error(JsonRpcError::parse_error(), Value::Null))?;

    let id = match value.get("id") {
        Some(id @ (Value::String(_) | Value::Number(_))) => id.clone(),
        _ => Value::Null,
    };
    let invalid = |reason: &str| {
        JsonRpcResponse::error(JsonRpcError::invalid_request(reason), id.clone())
    };

    let object = value
        .as_object()
        .ok_or_else(|| invalid("expected a JSON object"))?;

    if !object.contains_key("method") {
        if object.contains_key("result") || object.contains_key("error") {
            return Ok(InboundFrame::Response(value));
        }
        return Err(invalid("missing field 'method'"));
    }

    if let Some(raw_id) = object.get("id") {
        if !matches!(raw_id, Value::String(_) | Value::Number(_)) {
            return Err(invalid("id must be a string or a number"));
        }
    }

    let request: JsonRpcRequest =
        serde_json::from_value(value.clone()).map_err(|e| invalid(&e.to_string()))?;

    if request.jsonrpc != "2.0" {
        return Err(invalid("jsonrpc must be \"2.0\""));
    }

    if request.is_notification() {
        Ok(InboundFrame::Notification(request))
    } else {
        Ok(InboundFrame::Request(request))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_jsonrpc_request() {
        let req = JsonRpcRequest::new("tools/list", None, Some(serde_json::json!(1)));

        assert_eq!(req.jsonrpc, "2.0");
        assert_eq!(req.method, "tools/list");
        assert!(!req.is_notification());

        let json = serde_json::to_string(&req).unwrap();
        assert!(json.contains("\"jsonrpc\":\"2.0\""));
        assert!(json.contains("\"method\":\"tools/list\""));
    }

    #[test]
    fn test_jsonrpc_notification() {
        let notif = JsonRpcRequest::new("notifications/initialized", None, None);
        assert!(notif.is_notification());
    }

    #[test]
    fn test_jsonrpc_success_response() {
        let resp =
            JsonRpcResponse::success(serde_json::json!({"status": "ok"}), serde_json::json!(1));

        assert_eq!(resp.jsonrpc, "2.0");
        assert!(resp.result.is_some());
        assert!(resp.error.is_none());
    }

    #[test]
    fn test_jsonrpc_error_response() {
        let error = JsonRpcError::method_not_found("tools/run");
        let resp = JsonRpcResponse::error(error, serde_json::json!(1));

        assert_eq!(resp.jsonrpc, "2.0");
        assert!(resp.result.is_none());
        assert!(resp.error.is_some());

        let err = resp.error.unwrap();
        assert_eq!(err.code, -32601);
        assert_eq!(err.message, "Method not found: tools/run");
    }

    #[test]
    fn test_decode_request() {
        let frame = decode_frame(r#"{"jsonrpc":"2.0","id":7,"method":"tools/list"}"#).unwrap();
        match frame {
            InboundFrame::Request(req) => {
                assert_eq!(req.method, "tools/list");
                assert_eq!(req.id, Some(serde_json::json!(7)));
            }
            other => panic!("unexpected frame: {:?}", other),
        }
    }

    #[test]
    fn test_decode_notification() {
        let frame =
            decode_frame(r#"{"jsonrpc":"2.0","method":"notifications/initialized"}"#).unwrap();
        assert!(matches!(frame, InboundFrame::Notification(_)));
    }

    #[test]
    fn test_decode_client_response() {
        let frame = decode_frame(r#"{"jsonrpc":"2.0","id":"s-1","result":{}}"#).unwrap();
        assert!(matches!(frame, InboundFrame::Response(_)));
    }

    #[test]
    fn test_decode_invalid_json() {
        let err = decode_frame("{not json").unwrap_err();
        assert_eq!(err.error.as_ref().unwrap().code, -32700);
        assert_eq!(err.id, Value::Null);
    }

    #[test]
    fn test_decode_invalid_request_keeps_id() {
        let err = decode_frame(r#"{"jsonrpc":"2.0","id":"abc","params":{}}"#).unwrap_err();
        assert_eq!(err.error.as_ref().unwrap().code, -32600);
        assert_eq!(err.id, serde_json::json!("abc"));

        let err = decode_frame(r#"{"jsonrpc":"1.0","id":3,"method":"ping"}"#).unwrap_err();
        assert_eq!(err.error.as_ref().unwrap().code, -32600);
        assert_eq!(err.id, serde_json::json!(3));

        let err = decode_frame("[1, 2]").unwrap_err();
        assert_eq!(err.error.as_ref().unwrap().code, -32600);
    }

    #[test]
    fn test_decode_null_id_is_invalid_request() {
        let err = decode_frame(r#"{"jsonrpc":"2.0","id":null,"method":"ping"}"#).unwrap_err();
        let error = err.error.as_ref().unwrap();
        assert_eq!(error.code, -32600);
        assert!(error.message.contains("id must be a string or a number"));
        assert_eq!(err.id, Value::Null);

        // Omitting the id entirely still makes a notification
        let frame = decode_frame(r#"{"jsonrpc":"2.0","method":"ping"}"#).unwrap();
        assert!(matches!(frame, InboundFrame::Notification(_)));
    }

    #[test]
    fn test_initialize_result_is_camel_case() {
        let result = InitializeResult {
            protocol_version: "2024-11-05".to_string(),
            capabilities: ServerCapabilities {
                tools: Some(ListChangedCapability {
                    list_changed: Some(false),
                }),
                prompts: None,
            },
            server_info: ServerInfo {
                name: "crypto-mcp-server".to_string(),
                version: "0.1.0".to_string(),
            },
            instructions: None,
        };

        let json = serde_json::to_value(result).unwrap();
        assert_eq!(json["protocolVersion"], "2024-11-05");
        assert_eq!(json["capabilities"]["tools"]["listChanged"], false);
        assert_eq!(json["serverInfo"]["name"], "crypto-mcp-server");
    }
}
