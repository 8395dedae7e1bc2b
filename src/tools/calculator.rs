//! The calculator tool: add two integers.
//!
//! This is the only logic original to the tutorial. The handler is a pure,
//! deterministic function with no side effects; native integer semantics
//! apply (no overflow checks beyond wrapping).

use serde_json::Value;
use std::sync::Arc;

use super::{Tool, ToolError, ToolHandler};

/// Handler for the `add` tool
#[derive(Debug, Clone, Default)]
pub struct AddHandler;

fn require_i64(args: &Value, name: &str) -> Result<i64, ToolError> {
    let value = args
        .get(name)
        .ok_or_else(|| ToolError::InvalidArguments(format!("Missing '{}' parameter", name)))?;

    value.as_i64().ok_or_else(|| {
        ToolError::InvalidArguments(format!("Parameter '{}' must be an integer, got {}", name, value))
    })
}

#[async_trait::async_trait]
impl ToolHandler for AddHandler {
    async fn execute(&self, args: Value) -> Result<Value, ToolError> {
        let a = require_i64(&args, "a")?;
        let b = require_i64(&args, "b")?;
        Ok(Value::from(a.wrapping_add(b)))
    }
}

/// Build the `add` tool descriptor
pub fn add_tool() -> Tool {
    Tool {
        name: "add".to_string(),
        description: "Add two integers".to_string(),
        input_schema: serde_json::json!({
            "type": "object",
            "properties": {
                "a": {
                    "type": "integer",
                    "description": "First addend"
                },
                "b": {
                    "type": "integer",
                    "description": "Second addend"
                }
            },
            "required": ["a", "b"]
        }),
        handler: Arc::new(AddHandler),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_add() {
        let handler = AddHandler;
        let result = handler.execute(json!({"a": 5, "b": 3})).await.unwrap();
        assert_eq!(result, json!(8));
    }

    #[tokio::test]
    async fn test_add_examples() {
        let handler = AddHandler;
        for (a, b, sum) in [(10i64, 20i64, 30i64), (100, 200, 300), (-7, 7, 0)] {
            let result = handler.execute(json!({"a": a, "b": b})).await.unwrap();
            assert_eq!(result, json!(sum));
        }
    }

    #[tokio::test]
    async fn test_add_missing_parameter() {
        let handler = AddHandler;
        let err = handler.execute(json!({"a": 5})).await.unwrap_err();
        assert!(matches!(err, ToolError::InvalidArguments(_)));
    }

    #[tokio::test]
    async fn test_add_rejects_non_integer() {
        let handler = AddHandler;
        let err = handler.execute(json!({"a": "foo", "b": 3})).await.unwrap_err();
        assert!(matches!(err, ToolError::InvalidArguments(_)));
    }

    #[test]
    fn test_add_tool_descriptor() {
        let tool = add_tool();
        assert_eq!(tool.name, "add");
        let required = tool.input_schema["required"].as_array().unwrap();
        assert_eq!(required.len(), 2);
        assert_eq!(tool.input_schema["properties"]["a"]["type"], "integer");
        assert_eq!(tool.input_schema["properties"]["b"]["type"], "integer");
    }
}
