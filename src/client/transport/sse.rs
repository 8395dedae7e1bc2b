//! SSE dual-endpoint transport (`…/sse`).
//!
//! The server keeps one long-lived event stream open. Its first event,
//! `endpoint`, names the URL we POST messages to; responses come back as
//! `message` events on the stream.

use async_trait::async_trait;
use futures_util::StreamExt;
use serde_json::Value;
use std::time::Duration;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use url::Url;

use super::{match_response, rpc_notification, rpc_request, SseDecoder, Transport};
use crate::client::ClientError;

/// Transport for the dual-endpoint SSE mode
pub struct SseTransport {
    http: reqwest::Client,
    endpoint: Url,
    incoming: mpsc::Receiver<Value>,
    reader: JoinHandle<()>,
    next_id: u64,
    timeout: Duration,
}

impl SseTransport {
    /// Open the event stream and wait for the server to announce its
    /// message endpoint.
    pub async fn connect(url: Url, timeout: Duration) -> Result<Self, ClientError> {
        // No overall timeout on this client: the event stream stays open for
        // the life of the session. Individual requests are bounded below.
        let http = reqwest::Client::builder()
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .connect_timeout(Duration::from_secs(10))
            .build()
            .map_err(|e| ClientError::Connect(format!("failed to build HTTP client: {}", e)))?;

        let response = http
            .get(url.clone())
            .header("Accept", "text/event-stream")
            .send()
            .await
            .map_err(|e| ClientError::Connect(format!("request to {} failed: {}", url, e)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ClientError::Connect(format!(
                "server returned HTTP {} for the event stream",
                status
            )));
        }

        let (endpoint_tx, endpoint_rx) = oneshot::channel::<String>();
        let (message_tx, incoming) = mpsc::channel::<Value>(16);

        let reader = tokio::spawn(read_event_stream(response, endpoint_tx, message_tx));

        let endpoint_path = tokio::time::timeout(timeout, endpoint_rx)
            .await
            .map_err(|_| ClientError::Connect("server never sent an endpoint event".to_string()))?
            .map_err(|_| ClientError::Connect("event stream closed during setup".to_string()))?;

        let endpoint = url
            .join(&endpoint_path)
            .map_err(|e| ClientError::Protocol(format!("bad endpoint '{}': {}", endpoint_path, e)))?;
        tracing::debug!("SSE message endpoint: {}", endpoint);

        Ok(Self {
            http,
            endpoint,
            incoming,
            reader,
            next_id: 1,
            timeout,
        })
    }

    async fn post(&self, body: &Value) -> Result<(), ClientError> {
        let response = self
            .http
            .post(self.endpoint.clone())
            .json(body)
            .send()
            .await
            .map_err(|e| ClientError::Transport(format!("POST to {} failed: {}", self.endpoint, e)))?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(ClientError::Transport(format!(
                "server returned HTTP {}: {}",
                status, text
            )));
        }
        Ok(())
    }
}

/// Pump the event stream, routing the endpoint announcement and all
/// subsequent messages to their channels.
async fn read_event_stream(
    response: reqwest::Response,
    endpoint_tx: oneshot::Sender<String>,
    message_tx: mpsc::Sender<Value>,
) {
    let mut endpoint_tx = Some(endpoint_tx);
    let mut decoder = SseDecoder::new();
    let mut stream = response.bytes_stream();

    while let Some(chunk) = stream.next().await {
        let chunk = match chunk {
            Ok(c) => c,
            Err(e) => {
                tracing::debug!("Event stream error: {}", e);
                break;
            }
        };

        for event in decoder.push(&chunk) {
            match event.event.as_str() {
                "endpoint" => {
                    if let Some(tx) = endpoint_tx.take() {
                        let _ = tx.send(event.data);
                    }
                }
                "message" => match serde_json::from_str::<Value>(&event.data) {
                    Ok(message) => {
                        if message_tx.send(message).await.is_err() {
                            return;
                        }
                    }
                    Err(e) => tracing::debug!("Skipping malformed message event: {}", e),
                },
                other => tracing::debug!("Ignoring '{}' event", other),
            }
        }
    }
}

#[async_trait]
impl Transport for SseTransport {
    async fn request(&mut self, method: &str, params: Value) -> Result<Value, ClientError> {
        let id = self.next_id;
        self.next_id += 1;

        self.post(&rpc_request(id, method, params)).await?;

        let timeout = self.timeout;
        let incoming = &mut self.incoming;
        tokio::time::timeout(timeout, async move {
            while let Some(message) = incoming.recv().await {
                if let Some(result) = match_response(&message, id) {
                    return result;
                }
            }
            Err(ClientError::Transport(
                "event stream closed before the response arrived".to_string(),
            ))
        })
        .await
        .map_err(|_| ClientError::Timeout(timeout))?
    }

    async fn notify(&mut self, method: &str, params: Value) -> Result<(), ClientError> {
        self.post(&rpc_notification(method, params)).await
    }

    async fn close(&mut self) -> Result<(), ClientError> {
        self.reader.abort();
        Ok(())
    }
}

impl Drop for SseTransport {
    fn drop(&mut self) {
        self.reader.abort();
    }
}
