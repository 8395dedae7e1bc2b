//! # Calculator MCP
//!
//! A tutorial Model Context Protocol (MCP) project: a trivial calculator tool
//! ("add two integers") served over three transports (stdio, SSE, Streamable
//! HTTP), plus a small weather demo, with a matching command-line client.
//!
//! ## Architecture
//!
//! The library is organized into several modules:
//!
//! - [`tools`]: Tool descriptors, handlers and the tool registry
//! - [`mcp`]: MCP server wrapper around the pmcp SDK
//! - [`client`]: Client dispatcher with stdio, SSE and Streamable HTTP transports
//! - [`ui`]: Terminal output helpers
//! - [`utils`]: HTTP client and retry utilities
//! - [`config`]: Configuration management

pub mod client;
pub mod config;
pub mod mcp;
pub mod tools;
pub mod ui;
pub mod utils;

// Re-export commonly used types
pub use client::McpClient;
pub use tools::{Tool, ToolRegistry};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
