//! Configuration management.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Server settings
    #[serde(default)]
    pub server: ServerConfig,

    /// Client settings
    #[serde(default)]
    pub client: ClientConfig,

    /// Weather demo settings
    #[serde(default)]
    pub weather: WeatherConfig,
}

/// MCP server settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Host to bind in HTTP modes
    #[serde(default = "default_host")]
    pub host: String,

    /// Port to bind in HTTP modes
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8000
}

/// Client dispatcher settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Per-request deadline in seconds
    #[serde(default = "default_timeout_secs")]
    pub request_timeout_secs: u64,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            request_timeout_secs: default_timeout_secs(),
        }
    }
}

fn default_timeout_secs() -> u64 {
    30
}

/// Weather demo settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeatherConfig {
    /// Base URL for the National Weather Service API
    #[serde(default = "default_weather_api_base")]
    pub api_base: String,
}

impl Default for WeatherConfig {
    fn default() -> Self {
        Self {
            api_base: default_weather_api_base(),
        }
    }
}

fn default_weather_api_base() -> String {
    "https://api.weather.gov".to_string()
}

/// Load configuration from a file, with environment overrides
pub fn load_config(path: &PathBuf) -> Result<Config, config::ConfigError> {
    let settings = config::Config::builder()
        .add_source(config::File::from(path.as_path()))
        .add_source(config::Environment::with_prefix("CALCULATOR_MCP").separator("__"))
        .build()?;

    settings.try_deserialize()
}

/// Look for a config file in the conventional locations
pub fn find_config_file() -> Option<PathBuf> {
    let local = PathBuf::from("calculator-mcp.toml");
    if local.exists() {
        return Some(local);
    }

    if let Ok(home) = std::env::var("HOME") {
        let user = PathBuf::from(home)
            .join(".config")
            .join("calculator-mcp")
            .join("config.toml");
        if user.exists() {
            return Some(user);
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.server.port, 8000);
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.client.request_timeout_secs, 30);
        assert_eq!(config.weather.api_base, "https://api.weather.gov");
    }

    #[test]
    fn test_config_deserializes_partial_toml() {
        let config: Config = toml::from_str("[server]\nport = 9000\n").unwrap();
        assert_eq!(config.server.port, 9000);
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.client.request_timeout_secs, 30);
    }
}
