//! Tool descriptors, handlers and the registry exposed over MCP.
//!
//! This module defines the [`ToolHandler`] trait that all tools implement.
//! New tools can be added by implementing the trait and registering a
//! [`Tool`] descriptor with the [`ToolRegistry`]. The registry constructors
//! select which demo toolset is served:
//!
//! - [`ToolRegistry::calculator`] - the single `add` tool
//! - [`ToolRegistry::weather`] - the weather demo tools
//! - [`ToolRegistry::all`] - everything

pub mod calculator;
pub mod weather;

use std::collections::HashMap;
use std::sync::Arc;

use serde_json::Value;
use thiserror::Error;

pub use calculator::add_tool;
pub use weather::{get_alerts_tool, get_forecast_tool, WeatherService};

/// Errors that can occur while executing a tool
#[derive(Debug, Error)]
pub enum ToolError {
    /// Missing or malformed arguments
    #[error("Invalid arguments: {0}")]
    InvalidArguments(String),

    /// Tool not registered
    #[error("Tool not found: {0}")]
    NotFound(String),

    /// Network or HTTP error
    #[error("Network error: {0}")]
    Network(String),

    /// Rate limit exceeded
    #[error("Rate limit exceeded")]
    RateLimit,

    /// API error from an upstream service
    #[error("API error: {0}")]
    Api(String),

    /// Parsing error (JSON payloads)
    #[error("Parse error: {0}")]
    Parse(String),
}

/// An MCP tool that can be called by the client
#[derive(Clone)]
pub struct Tool {
    /// Tool name (e.g., "add")
    pub name: String,

    /// Human-readable description
    pub description: String,

    /// JSON Schema for input parameters
    pub input_schema: Value,

    /// Handler function to execute the tool
    pub handler: Arc<dyn ToolHandler>,
}

impl std::fmt::Debug for Tool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Tool")
            .field("name", &self.name)
            .field("description", &self.description)
            .field("input_schema", &self.input_schema)
            .finish()
    }
}

/// Handler for executing a tool
#[async_trait::async_trait]
pub trait ToolHandler: Send + Sync + std::fmt::Debug {
    /// Execute the tool with the given arguments
    async fn execute(&self, args: Value) -> Result<Value, ToolError>;
}

/// Registry for all MCP tools served by this process
#[derive(Debug, Clone, Default)]
pub struct ToolRegistry {
    tools: HashMap<String, Tool>,
}

impl ToolRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self {
            tools: HashMap::new(),
        }
    }

    /// Registry with only the calculator tool
    pub fn calculator() -> Self {
        let mut registry = Self::new();
        registry.register(add_tool());
        registry
    }

    /// Registry with the weather demo tools
    pub fn weather() -> Self {
        let mut registry = Self::new();
        registry.register_weather_tools(Arc::new(WeatherService::new()));
        registry
    }

    /// Registry with every available tool
    pub fn all() -> Self {
        let mut registry = Self::calculator();
        registry.register_weather_tools(Arc::new(WeatherService::new()));
        registry
    }

    /// Registry with the weather demo tools against a configured API base
    pub fn weather_from(config: &crate::config::WeatherConfig) -> Self {
        let mut registry = Self::new();
        registry.register_weather_tools(Arc::new(WeatherService::with_api_base(&config.api_base)));
        registry
    }

    /// Registry with every available tool against a configured API base
    pub fn all_from(config: &crate::config::WeatherConfig) -> Self {
        let mut registry = Self::calculator();
        registry.register_weather_tools(Arc::new(WeatherService::with_api_base(&config.api_base)));
        registry
    }

    fn register_weather_tools(&mut self, service: Arc<WeatherService>) {
        self.register(get_forecast_tool(Arc::clone(&service)));
        self.register(get_alerts_tool(service));
    }

    /// Register a tool
    pub fn register(&mut self, tool: Tool) {
        self.tools.insert(tool.name.clone(), tool);
    }

    /// Get a tool by name
    pub fn get(&self, name: &str) -> Option<&Tool> {
        self.tools.get(name)
    }

    /// Whether a tool is registered
    pub fn has(&self, name: &str) -> bool {
        self.tools.contains_key(name)
    }

    /// Get all tools
    pub fn all_tools(&self) -> Vec<&Tool> {
        self.tools.values().collect()
    }

    /// Number of registered tools
    pub fn len(&self) -> usize {
        self.tools.len()
    }

    /// Whether the registry is empty
    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    /// Execute a tool by name
    pub async fn execute(&self, name: &str, args: Value) -> Result<Value, ToolError> {
        let tool = self
            .get(name)
            .ok_or_else(|| ToolError::NotFound(name.to_string()))?;

        tool.handler.execute(args).await
    }
}
