// Server-sent events client - decodes the /stream push feed and reconnects with backoff
use crate::application::feed::ReconnectPolicy;
use crate::infrastructure::http_api::Credentials;
use bytes::{Buf, BytesMut};
use futures::stream::Stream;
use futures::StreamExt;

pub const STREAM_PATH: &str = "/stream";

/// Incremental `text/event-stream` decoder. Chunks may split events and
/// lines anywhere; only `data:` fields are kept.
#[derive(Debug, Default)]
pub struct SseDecoder {
    buffer: BytesMut,
    data: Vec<String>,
}

impl SseDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feeds a chunk and returns the data of every event it completed.
    pub fn push(&mut self, chunk: &[u8]) -> Vec<String> {
        self.buffer.extend_from_slice(chunk);
        let mut events = Vec::new();

        while let Some(end) = self.buffer.iter().position(|b| *b == b'\n') {
            let line = self.buffer.split_to(end + 1);
            let line = String::from_utf8_lossy(&line);
            let line = line.trim_end_matches(['\n', '\r']);
            if line.is_empty() {
                if !self.data.is_empty() {
                    events.push(self.data.join("\n"));
                    self.data.clear();
                }
                continue;
            }
            self.field(line);
        }

        events
    }

    fn field(&mut self, line: &str) {
        if line.starts_with(':') {
            return;
        }
        let (name, value) = match line.split_once(':') {
            Some((name, value)) => (name, value.strip_prefix(' ').unwrap_or(value)),
            None => (line, ""),
        };
        if name == "data" {
            self.data.push(value.to_string());
        }
    }

    /// Bytes held back waiting for a line break.
    pub fn pending(&self) -> usize {
        self.buffer.remaining()
    }
}

#[derive(Debug, Clone)]
pub struct SseClient {
    client: reqwest::Client,
    url: String,
    credentials: Option<Credentials>,
    policy: ReconnectPolicy,
}

impl SseClient {
    pub fn new(base_url: &str, credentials: Option<Credentials>, policy: ReconnectPolicy) -> Self {
        Self {
            client: reqwest::Client::new(),
            url: format!("{}{}", base_url.trim_end_matches('/'), STREAM_PATH),
            credentials,
            policy,
        }
    }

    async fn open(&self) -> Result<reqwest::Response, reqwest::Error> {
        let request = self
            .client
            .get(&self.url)
            .header(reqwest::header::ACCEPT, "text/event-stream");
        let request = match &self.credentials {
            Some(credentials) => credentials.apply(request),
            None => request,
        };
        request.send().await?.error_for_status()
    }

    /// Event payloads across reconnects. Ends once the reconnect policy
    /// runs out of attempts.
    pub fn messages(self) -> impl Stream<Item = String> + Send + 'static {
        async_stream::stream! {
            let mut backoff = self.policy.backoff();
            loop {
                match self.open().await {
                    Ok(response) => {
                        tracing::info!("Connected to live feed at {}", self.url);
                        backoff.reset();
                        let mut decoder = SseDecoder::new();
                        let mut body = response.bytes_stream();
                        while let Some(chunk) = body.next().await {
                            match chunk {
                                Ok(chunk) => {
                                    for data in decoder.push(&chunk) {
                                        yield data;
                                    }
                                }
                                Err(e) => {
                                    tracing::warn!("Live feed read failed: {}", e);
                                    break;
                                }
                            }
                        }
                        tracing::warn!("Live feed connection closed");
                    }
                    Err(e) => tracing::warn!("Live feed connection failed: {}", e),
                }

                match backoff.next_delay() {
                    Some(delay) => {
                        tracing::warn!(
                            "Reconnecting to live feed in {:?} (attempt {})",
                            delay,
                            backoff.attempts()
                        );
                        tokio::time::sleep(delay).await;
                    }
                    None => {
                        tracing::error!("Giving up on live feed after {} attempts", backoff.attempts());
                        break;
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decodes_split_events() {
        let mut decoder = SseDecoder::new();
        assert!(decoder.push(b"data: [{\"device_id\"").is_empty());
        assert!(decoder.push(b": \"d1\"}]\n").is_empty());
        let events = decoder.push(b"\ndata: []\n\n");
        assert_eq!(events, vec![r#"[{"device_id": "d1"}]"#.to_string(), "[]".to_string()]);
        assert_eq!(decoder.pending(), 0);
    }

    #[test]
    fn test_multiline_data_and_comments() {
        let mut decoder = SseDecoder::new();
        let events = decoder.push(b": keep-alive\r\nevent: update\r\ndata: [1,\r\ndata:2]\r\n\r\n");
        assert_eq!(events, vec!["[1,\n2]".to_string()]);
    }

    #[test]
    fn test_blank_lines_without_data_emit_nothing() {
        let mut decoder = SseDecoder::new();
        assert!(decoder.push(b"\n\n: ping\n\n").is_empty());
    }

    #[test]
    fn test_stream_url() {
        let client = SseClient::new("http://localhost:5000/", None, ReconnectPolicy::default());
        assert_eq!(client.url, "http://localhost:5000/stream");
    }
}
