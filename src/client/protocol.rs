//! Client-side MCP wire types.
//!
//! Only the handful of result shapes the dispatcher actually touches are
//! modelled here; requests are assembled with `serde_json::json!` and
//! everything else passes through as raw [`Value`].

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// MCP protocol revision this client advertises
pub const PROTOCOL_VERSION: &str = "2025-03-26";

/// Tool descriptor as returned by `tools/list`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolDescriptor {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(rename = "inputSchema", default)]
    pub input_schema: Value,
}

impl ToolDescriptor {
    /// Parameter names listed as required by the input schema
    pub fn required_params(&self) -> Vec<&str> {
        self.input_schema
            .get("required")
            .and_then(|v| v.as_array())
            .map(|params| params.iter().filter_map(|p| p.as_str()).collect())
            .unwrap_or_default()
    }
}

/// Result of `tools/list`
#[derive(Debug, Clone, Deserialize)]
pub struct ToolListResult {
    #[serde(default)]
    pub tools: Vec<ToolDescriptor>,
}

/// Server identity from the `initialize` handshake
#[derive(Debug, Clone, Deserialize)]
pub struct ServerInfo {
    pub name: String,
    #[serde(default)]
    pub version: String,
}

/// Result of the `initialize` handshake
#[derive(Debug, Clone, Deserialize)]
pub struct InitializeResult {
    #[serde(rename = "protocolVersion")]
    pub protocol_version: String,
    #[serde(rename = "serverInfo")]
    pub server_info: ServerInfo,
    #[serde(default)]
    pub capabilities: Value,
}

/// One content block in a tool call result
#[derive(Debug, Clone, Deserialize)]
pub struct ToolContent {
    #[serde(rename = "type", default)]
    pub content_type: String,
    #[serde(default)]
    pub text: String,
}

/// Result of `tools/call`
#[derive(Debug, Clone, Deserialize)]
pub struct CallToolResult {
    #[serde(default)]
    pub content: Vec<ToolContent>,
    #[serde(rename = "isError", default)]
    pub is_error: Option<bool>,
}

impl CallToolResult {
    /// Concatenated text content, the part a human wants to see
    pub fn text(&self) -> String {
        self.content
            .iter()
            .filter(|c| c.content_type == "text" || c.content_type.is_empty())
            .map(|c| c.text.as_str())
            .collect::<Vec<_>>()
            .join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_tool_list_parsing() {
        let payload = json!({
            "tools": [
                {
                    "name": "add",
                    "description": "Add two integers",
                    "inputSchema": {
                        "type": "object",
                        "properties": {
                            "a": {"type": "integer"},
                            "b": {"type": "integer"}
                        },
                        "required": ["a", "b"]
                    }
                }
            ]
        });

        let listed: ToolListResult = serde_json::from_value(payload).unwrap();
        assert_eq!(listed.tools.len(), 1);
        assert_eq!(listed.tools[0].name, "add");
        assert_eq!(listed.tools[0].required_params(), vec!["a", "b"]);
    }

    #[test]
    fn test_call_result_text() {
        let payload = json!({
            "content": [
                {"type": "text", "text": "8"}
            ]
        });
        let result: CallToolResult = serde_json::from_value(payload).unwrap();
        assert_eq!(result.text(), "8");
        assert!(result.is_error.is_none());
    }

    #[test]
    fn test_initialize_result_parsing() {
        let payload = json!({
            "protocolVersion": "2025-03-26",
            "serverInfo": {"name": "calculator-mcp", "version": "0.1.0"},
            "capabilities": {"tools": {}}
        });
        let init: InitializeResult = serde_json::from_value(payload).unwrap();
        assert_eq!(init.server_info.name, "calculator-mcp");
    }
}
