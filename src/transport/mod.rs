//! MCP transport layer
//!
//! Remote clients connect over HTTP: server-sent events for responses and a
//! POST side channel for requests.

pub mod http;

pub use http::{router, start_sse_server, AppState};
