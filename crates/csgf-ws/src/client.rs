//! Stream client: handshake, read loop and reconnect.

use std::sync::Arc;
use std::time::Duration;

use futures::{SinkExt, StreamExt};
use serde_json::Value;
use thiserror::Error;
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::client::IntoClientRequest;
use tokio_tungstenite::tungstenite::http::header::COOKIE;
use tokio_tungstenite::tungstenite::http::HeaderValue;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream};
use tracing::{debug, error, info, trace, warn};

use csgf_core::policy::{RetryConfig, RetryPolicy};
use csgf_core::{ClientState, PayloadDecoder, Session};

use crate::dispatch::Dispatcher;
use crate::frame::{self, ConnectRequest};
use crate::subscriptions::{RequestIds, SubscriptionPlan};

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Errors that end one connection.
#[derive(Debug, Error)]
pub enum StreamError {
    /// TCP/TLS/upgrade failure.
    #[error("Connect error: {0}")]
    Connect(String),

    /// The venue refused the connect request, or the request could not be
    /// built.
    #[error("Handshake error: {0}")]
    Handshake(String),

    #[error("WebSocket error: {0}")]
    WebSocket(String),

    #[error("Stream closed by peer")]
    Closed,

    #[error("Handshake timed out after {ms}ms")]
    Timeout { ms: u64 },

    #[error("Serialization error: {0}")]
    Serialize(#[from] serde_json::Error),
}

impl StreamError {
    /// Returns `true` if reconnecting may help.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::Connect(_) | Self::WebSocket(_) | Self::Closed | Self::Timeout { .. }
        )
    }
}

fn ws_error(e: tokio_tungstenite::tungstenite::Error) -> StreamError {
    StreamError::WebSocket(e.to_string())
}

/// Configuration for the stream client.
#[derive(Debug, Clone)]
pub struct StreamConfig {
    pub url: String,
    /// Sent as the `Cookie` header of the upgrade request.
    pub cookie: Option<String>,
    pub retry: RetryConfig,
    pub handshake_timeout: Duration,
}

impl StreamConfig {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            cookie: None,
            retry: RetryConfig::default(),
            handshake_timeout: Duration::from_secs(10),
        }
    }
}

/// Stream client for one session.
///
/// Owns the read loop. Each reply is decoded and dispatched before the next
/// one is read, so observers see events in arrival order.
pub struct StreamClient {
    config: StreamConfig,
    token: String,
    plan: SubscriptionPlan,
    decoder: PayloadDecoder,
    dispatcher: Dispatcher,
    state: Arc<ClientState>,
}

impl StreamClient {
    pub fn new(
        config: StreamConfig,
        session: &Session,
        state: Arc<ClientState>,
        dispatcher: Dispatcher,
    ) -> Self {
        Self {
            config,
            token: session.token.clone(),
            plan: SubscriptionPlan::for_user(session.user_id),
            decoder: PayloadDecoder::new(session.user_id),
            dispatcher,
            state,
        }
    }

    pub fn state(&self) -> &Arc<ClientState> {
        &self.state
    }

    /// Connect, subscribe and process frames, reconnecting on retryable
    /// failures.
    ///
    /// The attempt counter resets after every successful handshake. After a
    /// reconnect the round registry is cleared, since round events may have
    /// been missed in between. Resolves to the error that ended the session:
    /// a non-retryable one, or the last one once retries are exhausted.
    pub async fn run(&self) -> StreamError {
        let policy = RetryPolicy::new(self.config.retry.clone());
        let mut attempt = 0u32;
        let mut connected_before = false;

        loop {
            let err = match self.open().await {
                Ok(ws) => {
                    attempt = 0;
                    if connected_before {
                        let dropped = self.state.registry().await.clear();
                        info!(dropped, "reconnected, round registry cleared");
                    }
                    connected_before = true;
                    self.read_loop(ws).await
                }
                Err(e) => e,
            };

            if !err.is_retryable() {
                error!(error = %err, "stream failed");
                return err;
            }
            attempt += 1;
            let Some(delay) = policy.next_delay(attempt) else {
                error!(error = %err, attempts = attempt, "stream reconnect attempts exhausted");
                return err;
            };
            warn!(
                error = %err,
                attempt,
                "stream lost, reconnecting in {delay:?}"
            );
            tokio::time::sleep(delay).await;
        }
    }

    /// Connect and complete the handshake within the configured timeout.
    async fn open(&self) -> Result<WsStream, StreamError> {
        info!(url = %self.config.url, "connecting via WebSocket");
        let timeout = self.config.handshake_timeout;
        let opened = tokio::time::timeout(timeout, async {
            let mut ws = self.connect().await?;
            self.handshake(&mut ws).await?;
            Ok::<_, StreamError>(ws)
        })
        .await
        .map_err(|_| StreamError::Timeout {
            ms: timeout.as_millis() as u64,
        })??;
        info!(channels = self.plan.channels().len(), "stream subscribed");
        Ok(opened)
    }

    async fn connect(&self) -> Result<WsStream, StreamError> {
        let mut request = self
            .config
            .url
            .as_str()
            .into_client_request()
            .map_err(|e| StreamError::Handshake(format!("invalid stream url: {e}")))?;
        if let Some(cookie) = self.config.cookie.as_deref().filter(|c| !c.is_empty()) {
            let value = HeaderValue::from_str(cookie)
                .map_err(|e| StreamError::Handshake(format!("invalid cookie header: {e}")))?;
            request.headers_mut().insert(COOKIE, value);
        }
        let (ws, _response) = tokio_tungstenite::connect_async(request)
            .await
            .map_err(|e| StreamError::Connect(e.to_string()))?;
        Ok(ws)
    }

    /// Send the token, require a `result` in the first reply, then send
    /// the subscription batch.
    async fn handshake(&self, ws: &mut WsStream) -> Result<(), StreamError> {
        let ids = RequestIds::new();
        let connect = ConnectRequest::new(self.token.as_str(), ids.next_id());
        ws.send(Message::Text(serde_json::to_string(&connect)?.into()))
            .await
            .map_err(ws_error)?;

        let reply = loop {
            match ws.next().await {
                None | Some(Ok(Message::Close(_))) => return Err(StreamError::Closed),
                Some(Err(e)) => return Err(ws_error(e)),
                Some(Ok(Message::Text(text))) => break text,
                Some(Ok(_)) => continue,
            }
        };
        let first = frame::split_replies(reply.as_str())
            .next()
            .ok_or_else(|| StreamError::Handshake("empty connect reply".into()))?;
        let value: Value = serde_json::from_str(first)
            .map_err(|e| StreamError::Handshake(format!("unparseable connect reply: {e}")))?;
        if value.get("result").is_none() {
            return Err(StreamError::Handshake(format!("connect rejected: {first}")));
        }
        debug!("stream authorised");

        let batch = self.plan.encode_batch(&ids)?;
        ws.send(Message::Text(batch.into())).await.map_err(ws_error)?;
        Ok(())
    }

    async fn read_loop(&self, mut ws: WsStream) -> StreamError {
        loop {
            let msg = match ws.next().await {
                None => return StreamError::Closed,
                Some(Err(e)) => return ws_error(e),
                Some(Ok(msg)) => msg,
            };
            match msg {
                Message::Text(text) => self.handle_text(text.as_str()).await,
                // tungstenite queues the pong reply itself.
                Message::Ping(_) => trace!("ping"),
                Message::Close(close) => {
                    debug!(?close, "stream closed by peer");
                    return StreamError::Closed;
                }
                _ => {}
            }
        }
    }

    /// Decode and dispatch every reply in one text frame.
    pub async fn handle_text(&self, text: &str) {
        for line in frame::split_replies(text) {
            let reply = match frame::parse_reply(line) {
                Ok(reply) => reply,
                Err(e) => {
                    warn!(error = %e, "unparseable stream reply");
                    continue;
                }
            };
            if let Some(err) = &reply.error {
                warn!(id = ?reply.id, error = %err, "stream error reply");
                continue;
            }
            let Some((channel, data)) = reply.publication() else {
                trace!(id = ?reply.id, "ack skipped");
                continue;
            };
            match self.decoder.decode(channel, data) {
                Ok(event) => {
                    trace!(channel = %channel, kind = event.kind(), "event decoded");
                    self.dispatcher.dispatch(event, &self.state).await;
                }
                Err(e) => warn!(channel = %channel, error = %e, "payload decode failed"),
            }
        }
    }
}
