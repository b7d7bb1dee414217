//! Model Context Protocol (MCP) server capabilities for the crypto provider
//!
//! This module provides:
//! - Tool invocation (coin list, prices, market data, trending coins)
//! - Prompt templates mirroring each tool
//!
//! Both registries are built once at startup and shared read-only by all sessions.

pub mod prompts;
pub mod server;
pub mod tools;
pub mod types;

// Re-exports
pub use prompts::PromptRegistry;
pub use server::CryptoServer;
pub use tools::OperationRegistry;
