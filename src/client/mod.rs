//! MCP client dispatcher supporting stdio, SSE and Streamable HTTP targets.
//!
//! The dispatcher is deliberately simple: classify the target, open the
//! matching transport, run the initialize handshake, then either list tools
//! or make a single `tools/call`. No retries, no concurrency, no state
//! beyond the one connection.

pub mod args;
pub mod protocol;
pub mod transport;

pub use args::{coerce, parse_invocation};
pub use protocol::{CallToolResult, InitializeResult, ServerInfo, ToolDescriptor};

use jsonschema::JSONSchema;
use serde_json::{json, Map, Value};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;
use url::Url;

use protocol::{ToolListResult, PROTOCOL_VERSION};
use transport::{SseTransport, StdioTransport, StreamableHttpTransport, Transport};

/// Errors surfaced by the client dispatcher
#[derive(Debug, Error)]
pub enum ClientError {
    /// The target is neither a script path nor a recognized MCP URL
    #[error("Invalid target: {0}")]
    InvalidTarget(String),

    /// A CLI argument token was not in key=value form
    #[error("Bad parameter '{0}': use key=value format")]
    BadParameter(String),

    /// Could not establish the connection
    #[error("Connection failed: {0}")]
    Connect(String),

    /// The connection broke mid-exchange
    #[error("Transport error: {0}")]
    Transport(String),

    /// The server answered with a JSON-RPC error
    #[error("Server error {code}: {message}")]
    Rpc { code: i64, message: String },

    /// No response within the configured deadline
    #[error("Request timed out after {0:?}")]
    Timeout(Duration),

    /// Arguments rejected by the tool's input schema before any call
    #[error("Invalid arguments for tool '{tool}': {reason}")]
    InvalidArguments { tool: String, reason: String },

    /// The server sent something we could not make sense of
    #[error("Protocol error: {0}")]
    Protocol(String),
}

/// How a CLI target string maps onto a transport
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TargetKind {
    /// Local server script or binary, spawned as a subprocess
    Stdio(PathBuf),
    /// Remote SSE dual-endpoint server (URL ends in `/sse`)
    Sse(Url),
    /// Remote Streamable HTTP server (URL ends in `/mcp`)
    StreamableHttp(Url),
}

impl TargetKind {
    /// Classify a target string without touching the network or filesystem
    /// beyond an existence check for local paths.
    pub fn classify(target: &str) -> Result<Self, ClientError> {
        if let Ok(url) = Url::parse(target) {
            if matches!(url.scheme(), "http" | "https") {
                let path = url.path().trim_end_matches('/');
                if path.ends_with("/sse") {
                    return Ok(TargetKind::Sse(url));
                }
                if path.ends_with("/mcp") {
                    return Ok(TargetKind::StreamableHttp(url));
                }
                return Err(ClientError::InvalidTarget(
                    "remote URL must end with /sse or /mcp".to_string(),
                ));
            }
        }

        let path = Path::new(target);
        if path.exists() {
            return Ok(TargetKind::Stdio(path.to_path_buf()));
        }

        Err(ClientError::InvalidTarget(format!(
            "'{}' is neither an existing server script nor a URL ending in /sse or /mcp",
            target
        )))
    }
}

async fn open_transport(
    target: &str,
    timeout: Duration,
) -> Result<Box<dyn Transport>, ClientError> {
    match TargetKind::classify(target)? {
        TargetKind::Stdio(path) => Ok(Box::new(StdioTransport::spawn(&path, timeout).await?)),
        TargetKind::Sse(url) => Ok(Box::new(SseTransport::connect(url, timeout).await?)),
        TargetKind::StreamableHttp(url) => {
            Ok(Box::new(StreamableHttpTransport::new(url, timeout)?))
        }
    }
}

/// MCP client wrapping one transport and one session
pub struct McpClient {
    transport: Box<dyn Transport>,
    server: ServerInfo,
    tools: Vec<ToolDescriptor>,
}

impl McpClient {
    /// Connect to the target, run the initialize handshake and fetch the
    /// tool list.
    pub async fn connect(target: &str, timeout: Duration) -> Result<Self, ClientError> {
        let mut transport = open_transport(target, timeout).await?;

        let params = json!({
            "protocolVersion": PROTOCOL_VERSION,
            "capabilities": { "tools": {} },
            "clientInfo": {
                "name": env!("CARGO_PKG_NAME"),
                "version": env!("CARGO_PKG_VERSION"),
            },
        });
        let result = transport.request("initialize", params).await?;
        let init: InitializeResult = serde_json::from_value(result)
            .map_err(|e| ClientError::Protocol(format!("bad initialize result: {}", e)))?;

        transport
            .notify("notifications/initialized", json!({}))
            .await?;

        tracing::info!(
            "Connected to {} v{} (protocol {})",
            init.server_info.name,
            init.server_info.version,
            init.protocol_version
        );

        let listed = transport.request("tools/list", json!({})).await?;
        let tools: ToolListResult = serde_json::from_value(listed)
            .map_err(|e| ClientError::Protocol(format!("bad tools/list result: {}", e)))?;

        Ok(Self {
            transport,
            server: init.server_info,
            tools: tools.tools,
        })
    }

    /// The server's advertised identity
    pub fn server_info(&self) -> &ServerInfo {
        &self.server
    }

    /// Tools advertised by the server
    pub fn tools(&self) -> &[ToolDescriptor] {
        &self.tools
    }

    /// Validate arguments against the tool's declared input schema.
    ///
    /// Unknown tools pass through so the server's own error is what the
    /// user sees.
    fn validate_arguments(&self, name: &str, arguments: &Value) -> Result<(), ClientError> {
        let Some(tool) = self.tools.iter().find(|t| t.name == name) else {
            return Ok(());
        };
        if tool.input_schema.is_null() {
            return Ok(());
        }

        let schema = JSONSchema::compile(&tool.input_schema)
            .map_err(|e| ClientError::Protocol(format!("tool '{}' has a bad schema: {}", name, e)))?;

        if let Err(errors) = schema.validate(arguments) {
            let reasons: Vec<String> = errors.map(|e| e.to_string()).collect();
            return Err(ClientError::InvalidArguments {
                tool: name.to_string(),
                reason: reasons.join("; "),
            });
        }
        Ok(())
    }

    /// Invoke a tool with the given arguments
    pub async fn call_tool(
        &mut self,
        name: &str,
        arguments: Map<String, Value>,
    ) -> Result<CallToolResult, ClientError> {
        let arguments = Value::Object(arguments);
        self.validate_arguments(name, &arguments)?;

        let result = self
            .transport
            .request("tools/call", json!({ "name": name, "arguments": arguments }))
            .await?;

        serde_json::from_value(result)
            .map_err(|e| ClientError::Protocol(format!("bad tools/call result: {}", e)))
    }

    /// Release the transport; always called, even after failures.
    pub async fn close(&mut self) -> Result<(), ClientError> {
        self.transport.close().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_sse_url() {
        let kind = TargetKind::classify("http://localhost:8000/sse").unwrap();
        assert!(matches!(kind, TargetKind::Sse(_)));

        // Trailing slash is tolerated
        let kind = TargetKind::classify("https://example.com/sse/").unwrap();
        assert!(matches!(kind, TargetKind::Sse(_)));
    }

    #[test]
    fn test_classify_streamable_http_url() {
        let kind = TargetKind::classify("http://localhost:8000/mcp").unwrap();
        assert!(matches!(kind, TargetKind::StreamableHttp(_)));
    }

    #[test]
    fn test_classify_rejects_other_urls() {
        let err = TargetKind::classify("http://localhost:8000/rpc").unwrap_err();
        assert!(matches!(err, ClientError::InvalidTarget(_)));
    }

    #[test]
    fn test_classify_existing_script() {
        let dir = std::env::temp_dir();
        let script = dir.join("calculator_mcp_classify_test.py");
        std::fs::write(&script, "print('hi')").unwrap();

        let kind = TargetKind::classify(&script.to_string_lossy()).unwrap();
        assert!(matches!(kind, TargetKind::Stdio(_)));

        let _ = std::fs::remove_file(&script);
    }

    #[test]
    fn test_classify_missing_path() {
        let err = TargetKind::classify("./no-such-server.py").unwrap_err();
        assert!(matches!(err, ClientError::InvalidTarget(_)));
    }
}
