//! HTTP transport error handling
//!
//! Converts transport and protocol failures to JSON-RPC error objects and,
//! for the HTTP endpoints themselves, to status codes.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};

use super::jsonrpc::{JsonRpcError, JsonRpcResponse};
use super::session::SessionError;

/// HTTP transport errors
#[derive(Debug, thiserror::Error)]
pub enum HttpTransportError {
    #[error("Session error: {0}")]
    Session(#[from] SessionError),

    #[error("JSON parse error: {0}")]
    JsonParse(#[from] serde_json::Error),

    #[error("Method not found: {0}")]
    MethodNotFound(String),

    #[error("Tool not found: {0}")]
    ToolNotFound(String),

    #[error("Prompt not found: {0}")]
    PromptNotFound(String),

    #[error("Invalid parameters: {0}")]
    InvalidParams(String),

    #[error("Internal server error: {0}")]
    Internal(String),
}

impl HttpTransportError {
    /// Convert to JSON-RPC error code
    pub fn to_jsonrpc_error(&self) -> JsonRpcError {
        match self {
            HttpTransportError::Session(err) => JsonRpcError::new(-32000, err.to_string()),
            HttpTransportError::JsonParse(_) => JsonRpcError::parse_error(),
            HttpTransportError::MethodNotFound(method) => JsonRpcError::method_not_found(method),
            HttpTransportError::ToolNotFound(name) => {
                JsonRpcError::new(-32601, format!("Tool not found: {}", name))
            }
            HttpTransportError::PromptNotFound(name) => {
                JsonRpcError::new(-32602, format!("Prompt not found: {}", name))
            }
            HttpTransportError::InvalidParams(msg) => JsonRpcError::invalid_params(msg),
            HttpTransportError::Internal(msg) => JsonRpcError::internal_error(msg),
        }
    }

    /// Get HTTP status code for error
    pub fn status_code(&self) -> StatusCode {
        match self {
            HttpTransportError::Session(SessionError::SessionLimitExceeded(_)) => {
                StatusCode::TOO_MANY_REQUESTS
            }
            HttpTransportError::Session(SessionError::SessionNotFound(_)) => StatusCode::NOT_FOUND,
            HttpTransportError::Session(SessionError::SessionClosed(_)) => StatusCode::GONE,
            HttpTransportError::Session(
                SessionError::MissingSessionId | SessionError::InvalidSessionId,
            ) => StatusCode::BAD_REQUEST,
            HttpTransportError::JsonParse(_) => StatusCode::BAD_REQUEST,
            HttpTransportError::MethodNotFound(_)
            | HttpTransportError::ToolNotFound(_)
            | HttpTransportError::PromptNotFound(_) => StatusCode::NOT_FOUND,
            HttpTransportError::InvalidParams(_) => StatusCode::BAD_REQUEST,
            HttpTransportError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for HttpTransportError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let jsonrpc_error = self.to_jsonrpc_error();

        // No request context at the HTTP layer, so the id is null
        let response = JsonRpcResponse::error(jsonrpc_error, serde_json::json!(null));

        (status, Json(response)).into_response()
    }
}

/// Result type for HTTP transport operations
pub type Result<T> = std::result::Result<T, HttpTransportError>;
