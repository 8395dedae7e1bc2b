//! Streamable HTTP transport: a single endpoint that answers each POST with
//! either a JSON body or a short SSE stream carrying the response.
//!
//! Session handling is one header: the server may hand back `Mcp-Session-Id`
//! on initialize, and we echo it on every subsequent request.

use async_trait::async_trait;
use futures_util::StreamExt;
use serde_json::Value;
use std::time::Duration;
use url::Url;

use super::{match_response, rpc_notification, rpc_request, SseDecoder, Transport};
use crate::client::ClientError;

const SESSION_HEADER: &str = "Mcp-Session-Id";

/// Transport for the single-endpoint Streamable HTTP mode (`…/mcp`)
pub struct StreamableHttpTransport {
    http: reqwest::Client,
    url: Url,
    session_id: Option<String>,
    next_id: u64,
}

impl StreamableHttpTransport {
    pub fn new(url: Url, timeout: Duration) -> Result<Self, ClientError> {
        let http = reqwest::Client::builder()
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .timeout(timeout)
            .connect_timeout(Duration::from_secs(10))
            .build()
            .map_err(|e| ClientError::Connect(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self {
            http,
            url,
            session_id: None,
            next_id: 1,
        })
    }

    async fn post(&mut self, body: &Value) -> Result<reqwest::Response, ClientError> {
        let mut request = self
            .http
            .post(self.url.clone())
            .header("Accept", "application/json, text/event-stream")
            .json(body);

        if let Some(session) = &self.session_id {
            request = request.header(SESSION_HEADER, session);
        }

        let response = request
            .send()
            .await
            .map_err(|e| ClientError::Connect(format!("request to {} failed: {}", self.url, e)))?;

        // The server assigns the session on initialize; keep whatever it sent.
        if let Some(session) = response
            .headers()
            .get(SESSION_HEADER)
            .and_then(|v| v.to_str().ok())
        {
            self.session_id = Some(session.to_string());
        }

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(ClientError::Transport(format!(
                "server returned HTTP {}: {}",
                status, text
            )));
        }

        Ok(response)
    }
}

#[async_trait]
impl Transport for StreamableHttpTransport {
    async fn request(&mut self, method: &str, params: Value) -> Result<Value, ClientError> {
        let id = self.next_id;
        self.next_id += 1;

        let response = self.post(&rpc_request(id, method, params)).await?;

        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("")
            .to_string();

        if content_type.starts_with("text/event-stream") {
            // Response is framed as a short SSE stream; read until our id shows up.
            let mut decoder = SseDecoder::new();
            let mut stream = response.bytes_stream();
            while let Some(chunk) = stream.next().await {
                let chunk = chunk
                    .map_err(|e| ClientError::Transport(format!("stream error: {}", e)))?;
                for event in decoder.push(&chunk) {
                    if event.event != "message" {
                        continue;
                    }
                    let message: Value = serde_json::from_str(&event.data).map_err(|e| {
                        ClientError::Protocol(format!("invalid JSON in event stream: {}", e))
                    })?;
                    if let Some(result) = match_response(&message, id) {
                        return result;
                    }
                }
            }
            Err(ClientError::Transport(
                "event stream ended before the response arrived".to_string(),
            ))
        } else {
            let message: Value = response
                .json()
                .await
                .map_err(|e| ClientError::Protocol(format!("invalid JSON response: {}", e)))?;
            match_response(&message, id).unwrap_or_else(|| {
                Err(ClientError::Protocol(
                    "response did not match the request id".to_string(),
                ))
            })
        }
    }

    async fn notify(&mut self, method: &str, params: Value) -> Result<(), ClientError> {
        // Servers answer notifications with 202 Accepted and an empty body.
        self.post(&rpc_notification(method, params)).await?;
        Ok(())
    }

    async fn close(&mut self) -> Result<(), ClientError> {
        if let Some(session) = self.session_id.take() {
            let _ = self
                .http
                .delete(self.url.clone())
                .header(SESSION_HEADER, session)
                .send()
                .await;
        }
        Ok(())
    }
}
