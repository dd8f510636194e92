use std::collections::HashMap;

use greeter_core::greeting::GET_CURRENT_TIME;
use greeter_core::errors::SerializationError;
use greeter_core::{FunctionError, FunctionRegistry, FunctionService, StaticContext};
use serde::Deserialize;
use serde_json::{Value, json};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tokio::sync::watch;
use tracing::{debug, info};

#[derive(Debug, Deserialize)]
struct Request {
    #[serde(default = "default_function")]
    function: String,
    #[serde(default)]
    data: Value,
    /// Overrides the deployed config for this invocation only.
    #[serde(default)]
    config: HashMap<String, String>,
}

fn default_function() -> String {
    GET_CURRENT_TIME.to_string()
}

/// Serves JSON-line requests from `reader`, one response line per request.
pub struct StdioService<R, W> {
    registry: FunctionRegistry,
    context: StaticContext,
    reader: R,
    writer: W,
    shutdown: watch::Receiver<bool>,
}

impl<R, W> StdioService<R, W>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    pub fn new(
        registry: FunctionRegistry,
        context: StaticContext,
        reader: R,
        writer: W,
        shutdown: watch::Receiver<bool>,
    ) -> Self {
        Self {
            registry,
            context,
            reader,
            writer,
            shutdown,
        }
    }

    fn handle_line(&self, line: &[u8]) -> Value {
        let outcome = std::str::from_utf8(line)
            .map_err(|e| {
                FunctionError::Serialization(SerializationError::Json {
                    reason: format!("request is not valid UTF-8: {}", e),
                })
            })
            .and_then(|line| serde_json::from_str::<Request>(line).map_err(FunctionError::from))
            .and_then(|request| {
                let context = if request.config.is_empty() {
                    self.context.clone()
                } else {
                    self.context.with_overrides(request.config)
                };
                self.registry.dispatch(&request.function, &context, &request.data)
            });

        match outcome {
            Ok(response) => response,
            Err(e) => json!({"error": {"kind": e.kind(), "message": e.to_string()}}),
        }
    }

    #[cfg(test)]
    fn into_writer(self) -> W {
        self.writer
    }
}

impl<R, W> FunctionService for StdioService<R, W>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    async fn start(&mut self) -> greeter_core::Result<()> {
        info!(functions = ?self.registry.names().collect::<Vec<_>>(), "Serving on stdin");
        let mut line = Vec::new();
        loop {
            line.clear();
            let read = tokio::select! {
                read = self.reader.read_until(b'\n', &mut line) => read?,
                _ = self.shutdown.wait_for(|stop| *stop) => {
                    debug!("Shutdown requested");
                    return Ok(());
                }
            };
            if read == 0 {
                debug!("Input closed");
                return Ok(());
            }
            let request = line.trim_ascii();
            if request.is_empty() {
                continue;
            }

            let response = self.handle_line(request);
            let mut encoded = serde_json::to_vec(&response)?;
            encoded.push(b'\n');
            self.writer.write_all(&encoded).await?;
            self.writer.flush().await?;
        }
    }

    async fn close(&mut self) -> greeter_core::Result<()> {
        self.writer.flush().await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use greeter_core::run_service;

    async fn serve(input: &str) -> Vec<Value> {
        serve_bytes(input.as_bytes()).await
    }

    async fn serve_bytes(input: &[u8]) -> Vec<Value> {
        let (_tx, rx) = watch::channel(false);
        let context = StaticContext::new(HashMap::from([(
            "format".to_string(),
            "%Y".to_string(),
        )]));
        let mut service = StdioService::new(
            FunctionRegistry::with_defaults(),
            context,
            input,
            Vec::new(),
            rx,
        );
        run_service(&mut service).await.unwrap();

        String::from_utf8(service.into_writer())
            .unwrap()
            .lines()
            .map(|line| serde_json::from_str(line).unwrap())
            .collect()
    }

    #[tokio::test]
    async fn test_greets_each_request_line() {
        let input = concat!(
            r#"{"function": "getCurrentTime", "data": {"name": "Alice"}}"#,
            "\n\n",
            r#"{"data": {"name": "Bob"}}"#,
            "\n",
        );
        let responses = serve(input).await;
        assert_eq!(responses.len(), 2);
        assert!(responses[0]["result"].as_str().unwrap().starts_with("Hi, Alice, "));
        assert!(responses[1]["result"].as_str().unwrap().starts_with("Hi, Bob, "));
    }

    #[tokio::test]
    async fn test_request_config_overrides_format() {
        let input = r#"{"data": {"name": "Alice"}, "config": {"format": "%%"}}"#;
        let responses = serve(input).await;
        assert_eq!(
            responses,
            vec![json!({"result": "Hi, Alice, the current time is %."})]
        );
    }

    #[tokio::test]
    async fn test_errors_are_reported_per_line() {
        let input = concat!(
            "not json\n",
            r#"{"data": {"test": "data"}}"#,
            "\n",
            r#"{"function": "getWeather", "data": {"name": "Alice"}}"#,
            "\n",
            r#"{"data": {"name": "Alice"}, "config": {"format": "%!"}}"#,
            "\n",
            r#"{"data": {"name": "Alice"}, "config": {"format": ""}}"#,
            "\n",
        );
        let kinds: Vec<_> = serve(input)
            .await
            .iter()
            .map(|r| r["error"]["kind"].as_str().unwrap().to_string())
            .collect();
        assert_eq!(kinds, ["serialization", "validation", "unknown_function", "format", "format"]);
    }

    #[tokio::test]
    async fn test_invalid_utf8_line_does_not_stop_serving() {
        let input: &[u8] = b"{\"data\": {\"name\": \"\xff\"}}\n{\"data\": {\"name\": \"Bob\"}}\n";
        let responses = serve_bytes(input).await;
        assert_eq!(responses.len(), 2);
        assert_eq!(responses[0]["error"]["kind"], "serialization");
        assert!(responses[1]["result"].as_str().unwrap().starts_with("Hi, Bob, "));
    }

    #[tokio::test]
    async fn test_shutdown_stops_serving() {
        let (tx, rx) = watch::channel(false);
        let (reader, _keep_open) = tokio::io::duplex(64);
        let mut service = StdioService::new(
            FunctionRegistry::with_defaults(),
            StaticContext::default(),
            tokio::io::BufReader::new(reader),
            Vec::new(),
            rx,
        );
        tx.send(true).unwrap();
        run_service(&mut service).await.unwrap();
        assert!(service.into_writer().is_empty());
    }
}
