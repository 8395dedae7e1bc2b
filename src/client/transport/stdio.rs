//! Stdio transport: spawn the server as a subprocess and exchange
//! newline-delimited JSON-RPC over its pipes.

use async_trait::async_trait;
use serde_json::Value;
use std::path::Path;
use std::process::Stdio;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::process::{Child, ChildStdin, ChildStdout, Command};

use super::{match_response, rpc_notification, rpc_request, Transport};
use crate::client::ClientError;

/// Transport over a spawned subprocess's stdin/stdout
#[derive(Debug)]
pub struct StdioTransport {
    child: Child,
    stdin: ChildStdin,
    stdout: BufReader<ChildStdout>,
    next_id: u64,
    timeout: Duration,
}

/// Pick the interpreter for a server script, matching the tutorial family:
/// `.py` runs under python3, `.js` under node, anything else executes directly.
fn command_for(script: &Path) -> (String, Vec<String>) {
    let path = script.to_string_lossy().to_string();
    match script.extension().and_then(|e| e.to_str()) {
        Some("py") => ("python3".to_string(), vec![path]),
        Some("js") => ("node".to_string(), vec![path]),
        _ => (path, Vec::new()),
    }
}

impl StdioTransport {
    /// Spawn the server process and wire up its pipes
    pub async fn spawn(script: &Path, timeout: Duration) -> Result<Self, ClientError> {
        let (program, args) = command_for(script);
        tracing::debug!("Spawning stdio server: {} {:?}", program, args);

        let mut child = Command::new(&program)
            .args(&args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| {
                ClientError::Connect(format!("failed to spawn '{}': {}", script.display(), e))
            })?;

        let stdin = child
            .stdin
            .take()
            .ok_or_else(|| ClientError::Connect("child stdin unavailable".to_string()))?;
        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| ClientError::Connect("child stdout unavailable".to_string()))?;

        Ok(Self {
            child,
            stdin,
            stdout: BufReader::new(stdout),
            next_id: 1,
            timeout,
        })
    }

    async fn send_line(&mut self, message: &Value) -> Result<(), ClientError> {
        let mut line = serde_json::to_string(message)
            .map_err(|e| ClientError::Transport(format!("failed to encode request: {}", e)))?;
        line.push('\n');
        self.stdin
            .write_all(line.as_bytes())
            .await
            .map_err(|e| ClientError::Transport(format!("failed to write to server: {}", e)))?;
        self.stdin
            .flush()
            .await
            .map_err(|e| ClientError::Transport(format!("failed to flush: {}", e)))
    }

    async fn read_response(&mut self, id: u64) -> Result<Value, ClientError> {
        let mut line = String::new();
        loop {
            line.clear();
            let read = self
                .stdout
                .read_line(&mut line)
                .await
                .map_err(|e| ClientError::Transport(format!("failed to read from server: {}", e)))?;
            if read == 0 {
                return Err(ClientError::Transport(
                    "server closed its stdout before responding".to_string(),
                ));
            }
            if line.trim().is_empty() {
                continue;
            }

            let message: Value = match serde_json::from_str(line.trim()) {
                Ok(v) => v,
                Err(e) => {
                    tracing::debug!("Skipping non-JSON line from server: {}", e);
                    continue;
                }
            };

            if let Some(result) = match_response(&message, id) {
                return result;
            }
        }
    }
}

#[async_trait]
impl Transport for StdioTransport {
    async fn request(&mut self, method: &str, params: Value) -> Result<Value, ClientError> {
        let id = self.next_id;
        self.next_id += 1;

        self.send_line(&rpc_request(id, method, params)).await?;

        let timeout = self.timeout;
        tokio::time::timeout(timeout, self.read_response(id))
            .await
            .map_err(|_| ClientError::Timeout(timeout))?
    }

    async fn notify(&mut self, method: &str, params: Value) -> Result<(), ClientError> {
        self.send_line(&rpc_notification(method, params)).await
    }

    async fn close(&mut self) -> Result<(), ClientError> {
        // Dropping stdin signals EOF; well-behaved servers exit on their own,
        // kill_on_drop covers the rest.
        let _ = self.stdin.shutdown().await;
        let _ = self.child.start_kill();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_for_python_script() {
        let (program, args) = command_for(Path::new("servers/server_stdio.py"));
        assert_eq!(program, "python3");
        assert_eq!(args, vec!["servers/server_stdio.py".to_string()]);
    }

    #[test]
    fn test_command_for_node_script() {
        let (program, args) = command_for(Path::new("server.js"));
        assert_eq!(program, "node");
        assert_eq!(args, vec!["server.js".to_string()]);
    }

    #[test]
    fn test_command_for_binary() {
        let (program, args) = command_for(Path::new("/usr/local/bin/calculator-mcp"));
        assert_eq!(program, "/usr/local/bin/calculator-mcp");
        assert!(args.is_empty());
    }

    #[tokio::test]
    async fn test_spawn_missing_program_fails() {
        let err = StdioTransport::spawn(
            Path::new("/nonexistent/definitely-not-a-server"),
            Duration::from_secs(1),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, ClientError::Connect(_)));
    }
}
