use std::collections::VecDeque;
use std::pin::Pin;

use async_trait::async_trait;
use futures_util::{Stream, StreamExt};
use reqwest::header::ACCEPT;
use reqwest::Client;
use tracing::debug;

use crate::api::client::API_PREFIX;
use crate::errors::CoreError;

/// A long-lived server-push connection delivering raw message payloads for
/// one portfolio.
#[async_trait]
pub trait PushChannel: Send {
    /// Wait for the next message payload.
    ///
    /// `Ok(Some(payload))` is one complete message, `Ok(None)` means the
    /// server closed the stream, `Err` is a transport failure. After either
    /// of the latter two the channel is dead; the synchronizer opens a new
    /// one through the factory.
    async fn recv(&mut self) -> Result<Option<String>, CoreError>;
}

/// Opens fresh push channels. One factory serves many reconnect attempts;
/// each `open` yields an independent channel instance.
#[async_trait]
pub trait ChannelFactory: Send + Sync {
    async fn open(&self, portfolio_id: i64) -> Result<Box<dyn PushChannel>, CoreError>;
}

// ── SSE wire decoding ───────────────────────────────────────────────

/// Incremental decoder for the `text/event-stream` wire format.
///
/// Bytes arrive in arbitrary chunk boundaries; frames are blank-line
/// delimited and a frame's payload is the concatenation of its `data:`
/// lines. Comment lines (leading `:`) and the `event:`/`id:`/`retry:`
/// fields are ignored — the backend only ever sends data frames.
#[derive(Debug, Default)]
pub struct SseDecoder {
    buf: String,
}

impl SseDecoder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed a raw chunk; returns every message payload completed by it, in
    /// arrival order.
    pub fn feed(&mut self, chunk: &[u8]) -> Vec<String> {
        self.buf.push_str(&String::from_utf8_lossy(chunk));
        // Normalize CRLF so frame scanning only deals with '\n'. A trailing
        // lone '\r' stays buffered until its '\n' arrives in the next chunk.
        if self.buf.contains('\r') {
            self.buf = self.buf.replace("\r\n", "\n");
        }

        let mut messages = Vec::new();
        while let Some(pos) = self.buf.find("\n\n") {
            let frame: String = self.buf.drain(..pos + 2).collect();
            if let Some(payload) = Self::parse_frame(&frame) {
                messages.push(payload);
            }
        }
        messages
    }

    /// Extract the payload of one complete frame, `None` for keep-alive
    /// comments and frames without data.
    fn parse_frame(frame: &str) -> Option<String> {
        let mut data_lines: Vec<&str> = Vec::new();
        for line in frame.lines() {
            if let Some(rest) = line.strip_prefix("data:") {
                data_lines.push(rest.strip_prefix(' ').unwrap_or(rest));
            }
        }
        if data_lines.is_empty() {
            None
        } else {
            Some(data_lines.join("\n"))
        }
    }
}

// ── SSE transport ───────────────────────────────────────────────────

type ByteStream = Pin<Box<dyn Stream<Item = Result<Vec<u8>, reqwest::Error>> + Send>>;

/// Production `ChannelFactory`: GET `/portfolio/{id}` as an SSE stream.
///
/// Holds its own `reqwest::Client` without a total request timeout — the
/// stream is expected to stay open indefinitely. The bearer token is
/// attached when present (authentication is uniform across endpoints).
pub struct SseChannelFactory {
    base_url: String,
    client: Client,
    bearer: Option<String>,
}

impl SseChannelFactory {
    pub fn new(base_url: impl Into<String>) -> Self {
        let client = Client::builder()
            .connect_timeout(std::time::Duration::from_secs(30))
            .build()
            .unwrap_or_else(|_| Client::new());
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client,
            bearer: None,
        }
    }

    /// Attach a bearer token to every stream request this factory opens.
    #[must_use]
    pub fn with_bearer(mut self, token: impl Into<String>) -> Self {
        self.bearer = Some(token.into());
        self
    }
}

#[async_trait]
impl ChannelFactory for SseChannelFactory {
    async fn open(&self, portfolio_id: i64) -> Result<Box<dyn PushChannel>, CoreError> {
        let url = format!("{}{}/portfolio/{}", self.base_url, API_PREFIX, portfolio_id);
        debug!(%url, "opening SSE stream");

        let mut request = self
            .client
            .get(&url)
            .header(ACCEPT, "text/event-stream");
        if let Some(token) = &self.bearer {
            request = request.bearer_auth(token);
        }

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(CoreError::Api {
                operation: "open portfolio stream",
                status: status.as_u16(),
            });
        }

        let stream: ByteStream =
            Box::pin(response.bytes_stream().map(|r| r.map(|b| b.to_vec())));
        Ok(Box::new(SseChannel {
            stream,
            decoder: SseDecoder::new(),
            pending: VecDeque::new(),
        }))
    }
}

/// One live SSE connection, decoding chunks into message payloads.
struct SseChannel {
    stream: ByteStream,
    decoder: SseDecoder,
    /// Payloads decoded but not yet handed out — one chunk can complete
    /// several frames.
    pending: VecDeque<String>,
}

#[async_trait]
impl PushChannel for SseChannel {
    async fn recv(&mut self) -> Result<Option<String>, CoreError> {
        loop {
            if let Some(payload) = self.pending.pop_front() {
                return Ok(Some(payload));
            }
            match self.stream.next().await {
                Some(Ok(chunk)) => self.pending.extend(self.decoder.feed(&chunk)),
                Some(Err(e)) => return Err(CoreError::Channel(e.to_string())),
                None => return Ok(None),
            }
        }
    }
}
