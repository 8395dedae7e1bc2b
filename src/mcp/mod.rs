//! MCP server implementation.

pub mod server;

pub use server::McpServer;
