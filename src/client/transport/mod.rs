//! Client transports: stdio subprocess, SSE dual-endpoint, Streamable HTTP.
//!
//! Each transport carries one synchronous JSON-RPC exchange at a time, which
//! is all the dispatcher ever needs: one connection, one call, exit.

pub mod http;
pub mod sse;
pub mod stdio;

pub use http::StreamableHttpTransport;
pub use sse::SseTransport;
pub use stdio::StdioTransport;

use async_trait::async_trait;
use serde_json::Value;

use super::ClientError;

/// A channel capable of carrying JSON-RPC requests and notifications
#[async_trait]
pub trait Transport: Send {
    /// Send a request and wait for the matching response's `result`
    async fn request(&mut self, method: &str, params: Value) -> Result<Value, ClientError>;

    /// Send a notification (no response expected)
    async fn notify(&mut self, method: &str, params: Value) -> Result<(), ClientError>;

    /// Release the underlying connection
    async fn close(&mut self) -> Result<(), ClientError>;
}

/// Build a JSON-RPC request envelope
pub(crate) fn rpc_request(id: u64, method: &str, params: Value) -> Value {
    serde_json::json!({
        "jsonrpc": "2.0",
        "id": id,
        "method": method,
        "params": params,
    })
}

/// Build a JSON-RPC notification envelope
pub(crate) fn rpc_notification(method: &str, params: Value) -> Value {
    serde_json::json!({
        "jsonrpc": "2.0",
        "method": method,
        "params": params,
    })
}

/// Match a decoded JSON-RPC message against a pending request id.
///
/// Returns `None` when the message belongs to someone else (notifications,
/// server-initiated requests, stale responses) and should be skipped.
pub(crate) fn match_response(message: &Value, id: u64) -> Option<Result<Value, ClientError>> {
    if message.get("id").and_then(|v| v.as_u64()) != Some(id) {
        return None;
    }

    if let Some(error) = message.get("error") {
        let code = error.get("code").and_then(|v| v.as_i64()).unwrap_or(0);
        let message = error
            .get("message")
            .and_then(|v| v.as_str())
            .unwrap_or("unknown error")
            .to_string();
        return Some(Err(ClientError::Rpc { code, message }));
    }

    Some(Ok(message.get("result").cloned().unwrap_or(Value::Null)))
}

/// One decoded Server-Sent Event
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SseEvent {
    pub event: String,
    pub data: String,
}

/// Incremental decoder for a `text/event-stream` byte stream.
///
/// Feed it raw chunks as they arrive; it yields complete events. Partial
/// events stay buffered until the terminating blank line shows up.
#[derive(Debug, Default)]
pub struct SseDecoder {
    buf: Vec<u8>,
}

/// Byte offset just past the blank line terminating the first complete
/// event, tolerating CRLF line endings.
fn find_event_end(buf: &[u8]) -> Option<usize> {
    let lf = buf.windows(2).position(|w| w == b"\n\n").map(|p| p + 2);
    let crlf = buf.windows(4).position(|w| w == b"\r\n\r\n").map(|p| p + 4);
    match (lf, crlf) {
        (Some(a), Some(b)) => Some(a.min(b)),
        (a, b) => a.or(b),
    }
}

impl SseDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, chunk: &[u8]) -> Vec<SseEvent> {
        // Buffer raw bytes: a multi-byte UTF-8 character may be split across
        // chunks, so decoding happens per complete event only.
        self.buf.extend_from_slice(chunk);

        let mut events = Vec::new();
        while let Some(end) = find_event_end(&self.buf) {
            let raw: Vec<u8> = self.buf.drain(..end).collect();
            let raw = String::from_utf8_lossy(&raw);

            let mut event = String::from("message");
            let mut data_lines: Vec<String> = Vec::new();
            for line in raw.lines() {
                if let Some(rest) = line.strip_prefix("event:") {
                    event = rest.trim().to_string();
                } else if let Some(rest) = line.strip_prefix("data:") {
                    data_lines.push(rest.strip_prefix(' ').unwrap_or(rest).to_string());
                }
                // id:, retry: and comment lines are irrelevant here
            }

            if !data_lines.is_empty() {
                events.push(SseEvent {
                    event,
                    data: data_lines.join("\n"),
                });
            }
        }
        events
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_decoder_single_event() {
        let mut decoder = SseDecoder::new();
        let events = decoder.push(b"event: endpoint\ndata: /messages?session=abc\n\n");
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].event, "endpoint");
        assert_eq!(events[0].data, "/messages?session=abc");
    }

    #[test]
    fn test_decoder_split_across_chunks() {
        let mut decoder = SseDecoder::new();
        assert!(decoder.push(b"event: message\nda").is_empty());
        let events = decoder.push(b"ta: {\"id\":1}\n\nevent: message\ndata: {\"id\":2}\n\n");
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].data, "{\"id\":1}");
        assert_eq!(events[1].data, "{\"id\":2}");
    }

    #[test]
    fn test_decoder_default_event_name() {
        let mut decoder = SseDecoder::new();
        let events = decoder.push(b"data: hello\n\n");
        assert_eq!(events[0].event, "message");
    }

    #[test]
    fn test_decoder_multibyte_char_split_across_chunks() {
        let mut decoder = SseDecoder::new();
        let payload = "data: caf\u{e9}\n\n".as_bytes();
        // Split inside the two-byte encoding of 'é'
        let (head, tail) = payload.split_at(10);
        assert!(decoder.push(head).is_empty());
        let events = decoder.push(tail);
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].data, "caf\u{e9}");
    }

    #[test]
    fn test_decoder_crlf() {
        let mut decoder = SseDecoder::new();
        let events = decoder.push(b"event: message\r\ndata: hi\r\n\r\n");
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].data, "hi");
    }

    #[test]
    fn test_match_response() {
        let ok = json!({"jsonrpc": "2.0", "id": 3, "result": {"x": 1}});
        assert_eq!(match_response(&ok, 3).unwrap().unwrap(), json!({"x": 1}));
        assert!(match_response(&ok, 4).is_none());

        let err = json!({"jsonrpc": "2.0", "id": 3, "error": {"code": -32601, "message": "Method not found"}});
        let result = match_response(&err, 3).unwrap();
        assert!(matches!(result, Err(ClientError::Rpc { code: -32601, .. })));

        let notification = json!({"jsonrpc": "2.0", "method": "notifications/progress"});
        assert!(match_response(&notification, 3).is_none());
    }
}
