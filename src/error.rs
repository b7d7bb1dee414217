use serde_json::json;
use thiserror::Error;

/// Startup, registry and configuration faults.
///
/// These never cross into a live session; they abort process start.
#[derive(Error, Debug)]
pub enum ProviderError {
    #[error("Tool already registered: {0}")]
    DuplicateTool(String),

    #[error("Prompt already registered: {0}")]
    DuplicatePrompt(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Initialization error: {0}")]
    Initialization(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, ProviderError>;

/// Failure of a single upstream call made by the market data gateway
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GatewayError {
    /// The request never produced a response (DNS, connect, timeout)
    #[error("Request error: {0}")]
    Fetch(String),

    /// The provider answered with a non-success HTTP status
    #[error("HTTP error {status}: {message}")]
    Status { status: u16, message: String },

    /// The provider answered 2xx but the body was not the expected JSON
    #[error("Invalid response body: {0}")]
    Decode(String),
}

impl From<reqwest::Error> for GatewayError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            GatewayError::Fetch("Request to CoinGecko API timed out".to_string())
        } else if err.is_connect() {
            GatewayError::Fetch(
                "Failed to connect to CoinGecko API. Please check your internet connection."
                    .to_string(),
            )
        } else if let Some(status) = err.status() {
            let message = match status.as_u16() {
                429 => "Too many requests to CoinGecko API".to_string(),
                401 | 403 => "CoinGecko API rejected the request credentials".to_string(),
                500..=599 => "CoinGecko server error. Please try again later.".to_string(),
                _ => status
                    .canonical_reason()
                    .unwrap_or("unexpected status")
                    .to_string(),
            };
            GatewayError::Status {
                status: status.as_u16(),
                message,
            }
        } else if err.is_decode() {
            GatewayError::Decode(err.to_string())
        } else {
            GatewayError::Fetch(err.to_string())
        }
    }
}

/// Structured failure of a registered tool.
///
/// Returned to the caller as an error payload, never raised into the transport.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ToolError {
    #[error("{0}")]
    Validation(String),

    #[error("Missing required argument: {0}")]
    MissingArgument(String),

    #[error("{0}")]
    Resolution(String),

    #[error("Request error: {0}")]
    UpstreamFetch(String),

    #[error("HTTP error {status}: {message}")]
    UpstreamStatus { status: u16, message: String },
}

impl ToolError {
    pub fn kind(&self) -> &'static str {
        match self {
            ToolError::Validation(_) => "validation_error",
            ToolError::MissingArgument(_) => "missing_argument",
            ToolError::Resolution(_) => "resolution_error",
            ToolError::UpstreamFetch(_) => "upstream_fetch_error",
            ToolError::UpstreamStatus { .. } => "upstream_status_error",
        }
    }

    /// Error payload as delivered to the caller
    pub fn to_payload(&self) -> serde_json::Value {
        let mut error = json!({
            "kind": self.kind(),
            "message": self.to_string(),
        });
        if let ToolError::UpstreamStatus { status, .. } = self {
            error["status"] = json!(status);
        }
        json!({ "error": error })
    }
}

impl From<GatewayError> for ToolError {
    fn from(err: GatewayError) -> Self {
        match err {
            GatewayError::Fetch(msg) => ToolError::UpstreamFetch(msg),
            GatewayError::Decode(msg) => {
                ToolError::UpstreamFetch(format!("invalid response body: {}", msg))
            }
            GatewayError::Status { status, message } => {
                ToolError::UpstreamStatus { status, message }
            }
        }
    }
}

/// Outcome of looking up and running a tool by name
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DispatchError {
    #[error("Tool not found: {0}")]
    ToolNotFound(String),

    #[error(transparent)]
    Tool(#[from] ToolError),
}

/// Outcome of looking up and rendering a prompt by name
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PromptError {
    #[error("Prompt not found: {0}")]
    PromptNotFound(String),

    #[error(transparent)]
    Invalid(#[from] ToolError),
}
