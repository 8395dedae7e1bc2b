//! Weather demo tools backed by the National Weather Service API.
//!
//! Uses the free api.weather.gov endpoints (no API key). The NWS asks for a
//! descriptive User-Agent on every request.
//! API documentation: https://www.weather.gov/documentation/services-web-api

use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;

use super::{Tool, ToolError, ToolHandler};
use crate::utils::{api_retry_config, with_retry, HttpClient};

const NWS_API_BASE: &str = "https://api.weather.gov";
const MAX_FORECAST_PERIODS: usize = 5;

/// Client for the National Weather Service API
#[derive(Debug, Clone)]
pub struct WeatherService {
    client: Arc<HttpClient>,
    api_base: String,
}

impl WeatherService {
    pub fn new() -> Self {
        Self::with_api_base(NWS_API_BASE)
    }

    /// Use a custom API base URL (tests point this at a local mock)
    pub fn with_api_base(api_base: &str) -> Self {
        Self {
            client: Arc::new(HttpClient::new()),
            api_base: api_base.trim_end_matches('/').to_string(),
        }
    }

    async fn fetch_json(&self, url: &str) -> Result<Value, ToolError> {
        let client = Arc::clone(&self.client);
        let url = url.to_string();

        with_retry(api_retry_config(), || {
            let client = Arc::clone(&client);
            let url = url.clone();
            async move {
                let response = client
                    .get(&url)
                    .header("Accept", "application/geo+json")
                    .send()
                    .await
                    .map_err(|e| ToolError::Network(format!("Failed to reach NWS: {}", e)))?;

                let status = response.status();
                if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
                    return Err(ToolError::RateLimit);
                }
                if !status.is_success() {
                    let text = response.text().await.unwrap_or_default();
                    return Err(ToolError::Api(format!(
                        "NWS API returned status {}: {}",
                        status, text
                    )));
                }

                response
                    .json()
                    .await
                    .map_err(|e| ToolError::Parse(format!("Failed to parse NWS response: {}", e)))
            }
        })
        .await
    }

    /// Forecast periods for a coordinate pair.
    ///
    /// The NWS API is a two-step lookup: `/points/{lat},{lon}` resolves the
    /// forecast office, whose payload carries the actual forecast URL.
    pub async fn forecast(&self, latitude: f64, longitude: f64) -> Result<Vec<ForecastPeriod>, ToolError> {
        if !(-90.0..=90.0).contains(&latitude) || !(-180.0..=180.0).contains(&longitude) {
            return Err(ToolError::InvalidArguments(format!(
                "Coordinates out of range: {},{}",
                latitude, longitude
            )));
        }

        let points_url = format!("{}/points/{:.4},{:.4}", self.api_base, latitude, longitude);
        let points: PointsResponse = serde_json::from_value(self.fetch_json(&points_url).await?)
            .map_err(|e| ToolError::Parse(format!("Unexpected /points payload: {}", e)))?;

        let forecast: ForecastResponse =
            serde_json::from_value(self.fetch_json(&points.properties.forecast).await?)
                .map_err(|e| ToolError::Parse(format!("Unexpected forecast payload: {}", e)))?;

        let mut periods = forecast.properties.periods;
        periods.truncate(MAX_FORECAST_PERIODS);
        Ok(periods)
    }

    /// Active alerts for a two-letter US state code.
    pub async fn alerts(&self, state: &str) -> Result<Vec<AlertProperties>, ToolError> {
        if state.len() != 2 || !state.chars().all(|c| c.is_ascii_alphabetic()) {
            return Err(ToolError::InvalidArguments(format!(
                "State must be a two-letter code, got '{}'",
                state
            )));
        }

        let url = format!("{}/alerts/active/area/{}", self.api_base, state.to_uppercase());
        let alerts: AlertsResponse = serde_json::from_value(self.fetch_json(&url).await?)
            .map_err(|e| ToolError::Parse(format!("Unexpected alerts payload: {}", e)))?;

        Ok(alerts.features.into_iter().map(|f| f.properties).collect())
    }
}

impl Default for WeatherService {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Deserialize)]
struct PointsResponse {
    properties: PointsProperties,
}

#[derive(Debug, Deserialize)]
struct PointsProperties {
    forecast: String,
}

#[derive(Debug, Deserialize)]
struct ForecastResponse {
    properties: ForecastProperties,
}

#[derive(Debug, Deserialize)]
struct ForecastProperties {
    periods: Vec<ForecastPeriod>,
}

/// One forecast period as reported by the NWS
#[derive(Debug, Clone, Deserialize, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ForecastPeriod {
    pub name: String,
    pub temperature: i64,
    pub temperature_unit: String,
    #[serde(default)]
    pub wind_speed: String,
    #[serde(default)]
    pub wind_direction: String,
    pub short_forecast: String,
    #[serde(default)]
    pub detailed_forecast: String,
}

#[derive(Debug, Deserialize)]
struct AlertsResponse {
    #[serde(default)]
    features: Vec<AlertFeature>,
}

#[derive(Debug, Deserialize)]
struct AlertFeature {
    properties: AlertProperties,
}

/// One active alert as reported by the NWS
#[derive(Debug, Clone, Deserialize, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AlertProperties {
    pub event: String,
    pub area_desc: String,
    #[serde(default)]
    pub severity: Option<String>,
    #[serde(default)]
    pub headline: Option<String>,
    #[serde(default)]
    pub instruction: Option<String>,
}

/// Handler for the `get_forecast` tool
#[derive(Debug)]
pub struct GetForecastHandler {
    pub service: Arc<WeatherService>,
}

#[async_trait::async_trait]
impl ToolHandler for GetForecastHandler {
    async fn execute(&self, args: Value) -> Result<Value, ToolError> {
        let latitude = args
            .get("latitude")
            .and_then(|v| v.as_f64())
            .ok_or_else(|| ToolError::InvalidArguments("Missing 'latitude' parameter".to_string()))?;
        let longitude = args
            .get("longitude")
            .and_then(|v| v.as_f64())
            .ok_or_else(|| ToolError::InvalidArguments("Missing 'longitude' parameter".to_string()))?;

        let periods = self.service.forecast(latitude, longitude).await?;
        serde_json::to_value(periods).map_err(|e| ToolError::Parse(e.to_string()))
    }
}

/// Handler for the `get_alerts` tool
#[derive(Debug)]
pub struct GetAlertsHandler {
    pub service: Arc<WeatherService>,
}

#[async_trait::async_trait]
impl ToolHandler for GetAlertsHandler {
    async fn execute(&self, args: Value) -> Result<Value, ToolError> {
        let state = args
            .get("state")
            .and_then(|v| v.as_str())
            .ok_or_else(|| ToolError::InvalidArguments("Missing 'state' parameter".to_string()))?;

        let alerts = self.service.alerts(state).await?;
        if alerts.is_empty() {
            return Ok(json!({"message": format!("No active alerts for {}", state.to_uppercase())}));
        }
        serde_json::to_value(alerts).map_err(|e| ToolError::Parse(e.to_string()))
    }
}

/// Build the `get_forecast` tool descriptor
pub fn get_forecast_tool(service: Arc<WeatherService>) -> Tool {
    Tool {
        name: "get_forecast".to_string(),
        description: "Get the short-term weather forecast for a US location".to_string(),
        input_schema: json!({
            "type": "object",
            "properties": {
                "latitude": {
                    "type": "number",
                    "description": "Latitude in decimal degrees"
                },
                "longitude": {
                    "type": "number",
                    "description": "Longitude in decimal degrees"
                }
            },
            "required": ["latitude", "longitude"]
        }),
        handler: Arc::new(GetForecastHandler { service }),
    }
}

/// Build the `get_alerts` tool descriptor
pub fn get_alerts_tool(service: Arc<WeatherService>) -> Tool {
    Tool {
        name: "get_alerts".to_string(),
        description: "Get active weather alerts for a US state".to_string(),
        input_schema: json!({
            "type": "object",
            "properties": {
                "state": {
                    "type": "string",
                    "description": "Two-letter US state code (e.g., 'CA', 'NY')"
                }
            },
            "required": ["state"]
        }),
        handler: Arc::new(GetAlertsHandler { service }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_forecast_rejects_bad_coordinates() {
        let service = WeatherService::new();
        let err = service.forecast(123.0, 0.0).await.unwrap_err();
        assert!(matches!(err, ToolError::InvalidArguments(_)));
    }

    #[tokio::test]
    async fn test_alerts_rejects_bad_state() {
        let service = WeatherService::new();
        let err = service.alerts("California").await.unwrap_err();
        assert!(matches!(err, ToolError::InvalidArguments(_)));
    }

    #[tokio::test]
    async fn test_forecast_handler_requires_coordinates() {
        let handler = GetForecastHandler {
            service: Arc::new(WeatherService::new()),
        };
        let err = handler.execute(json!({"latitude": 40.0})).await.unwrap_err();
        assert!(matches!(err, ToolError::InvalidArguments(_)));
    }

    #[test]
    fn test_alert_parsing() {
        let payload = json!({
            "features": [
                {
                    "properties": {
                        "event": "Flood Warning",
                        "areaDesc": "Sacramento County",
                        "severity": "Moderate",
                        "headline": "Flood Warning issued"
                    }
                }
            ]
        });
        let parsed: AlertsResponse = serde_json::from_value(payload).unwrap();
        assert_eq!(parsed.features.len(), 1);
        assert_eq!(parsed.features[0].properties.event, "Flood Warning");
    }
}
