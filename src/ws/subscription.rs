//! Upstream subscription controller.
//!
//! Owns the single long-lived websocket to the streaming source and drives
//! the [`EventProcessor`] with every event it delivers.
//!
//! ```text
//! Disconnected ──run()──▶ Connecting ──connection_ack──▶ Subscribed
//!      ▲                      │                              │
//!      └──────── error / close / complete ◀──────────────────┘
//! ```
//!
//! No reconnect happens here; [`SubscriptionController::run`] returns when
//! the subscription ends and the caller decides what to do next.

use std::fmt;

use futures_util::{Sink, SinkExt, StreamExt};
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::tungstenite::client::IntoClientRequest;
use tokio_tungstenite::tungstenite::http::HeaderValue;

use super::messages::{ClientMessage, GRAPHQL_TRANSPORT_WS, ServerMessage, SubscribePayload};
use super::payload::extract_events;
use crate::error::BridgeError;
use crate::service::EventProcessor;

/// Lifecycle of the upstream subscription.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubscriptionState {
    /// No connection.
    Disconnected,
    /// Websocket handshake or `connection_init` in flight.
    Connecting,
    /// Subscription accepted; events are flowing.
    Subscribed,
}

/// What the read loop should do after one server message.
#[derive(Debug)]
enum ControlStep {
    Continue,
    Reply(ClientMessage),
    Finished,
    Failed(String),
}

/// Drives one subscription from connect to end-of-stream.
pub struct SubscriptionController {
    url: String,
    api_key: String,
    query: String,
    processor: EventProcessor,
    state: SubscriptionState,
    operation_id: Option<String>,
}

impl SubscriptionController {
    /// Creates a controller for `url`, authenticated with `api_key`,
    /// subscribing to `query`.
    #[must_use]
    pub fn new(
        url: impl Into<String>,
        api_key: impl Into<String>,
        query: impl Into<String>,
        processor: EventProcessor,
    ) -> Self {
        Self {
            url: url.into(),
            api_key: api_key.into(),
            query: query.into(),
            processor,
            state: SubscriptionState::Disconnected,
            operation_id: None,
        }
    }

    /// Current lifecycle state.
    #[must_use]
    pub const fn state(&self) -> SubscriptionState {
        self.state
    }

    /// Connects, subscribes, and processes events until the stream ends.
    ///
    /// Messages of one batch are processed strictly in order before the
    /// next frame is read.
    ///
    /// # Errors
    ///
    /// Returns [`BridgeError::Stream`] if the connection cannot be
    /// established, the server reports a subscription error, or the socket
    /// closes before the server completes the subscription. A server
    /// `complete` returns `Ok(())`.
    pub async fn run(&mut self) -> Result<(), BridgeError> {
        self.state = SubscriptionState::Connecting;
        self.operation_id = None;
        let result = self.run_connection().await;
        self.state = SubscriptionState::Disconnected;
        match &result {
            Ok(()) => tracing::info!("subscription complete"),
            Err(e) => tracing::error!(error = %e, "subscription error"),
        }
        result
    }

    async fn run_connection(&mut self) -> Result<(), BridgeError> {
        let mut request = self
            .url
            .as_str()
            .into_client_request()
            .map_err(|e| BridgeError::Stream(e.to_string()))?;
        let api_key = HeaderValue::from_str(&self.api_key)
            .map_err(|e| BridgeError::Stream(format!("api key is not a valid header: {e}")))?;
        let headers = request.headers_mut();
        headers.insert("Sec-WebSocket-Protocol", HeaderValue::from_static(GRAPHQL_TRANSPORT_WS));
        headers.insert("X-API-KEY", api_key);

        tracing::info!(url = %self.url, "connecting to stream");
        let (ws_stream, _) = tokio_tungstenite::connect_async(request)
            .await
            .map_err(|e| BridgeError::Stream(format!("connect failed: {e}")))?;
        let (mut sink, mut stream) = ws_stream.split();

        let init = ClientMessage::ConnectionInit {
            payload: serde_json::json!({ "headers": { "X-API-KEY": self.api_key } }),
        };
        send(&mut sink, &init).await?;

        while let Some(frame) = stream.next().await {
            let frame = frame.map_err(|e| BridgeError::Stream(format!("receive failed: {e}")))?;
            match frame {
                Message::Text(text) => match self.handle_text(text.as_str()).await {
                    ControlStep::Continue => {}
                    ControlStep::Reply(reply) => send(&mut sink, &reply).await?,
                    ControlStep::Finished => return Ok(()),
                    ControlStep::Failed(reason) => return Err(BridgeError::Stream(reason)),
                },
                Message::Close(frame) => {
                    let reason = frame.map(|f| format!("{} {}", f.code, f.reason.as_str()));
                    return Err(BridgeError::Stream(format!(
                        "server closed the connection: {}",
                        reason.unwrap_or_default()
                    )));
                }
                _ => {}
            }
        }

        Err(BridgeError::Stream("connection ended without completion".to_string()))
    }

    /// Reacts to one text frame from the server.
    async fn handle_text(&mut self, text: &str) -> ControlStep {
        let message = match serde_json::from_str::<ServerMessage>(text) {
            Ok(message) => message,
            Err(e) => {
                tracing::debug!(error = %e, "ignoring unrecognised stream message");
                return ControlStep::Continue;
            }
        };

        match message {
            ServerMessage::ConnectionAck => {
                let id = uuid::Uuid::new_v4().to_string();
                self.operation_id = Some(id.clone());
                self.state = SubscriptionState::Subscribed;
                tracing::info!(operation_id = %id, "connection acknowledged, subscribing");
                ControlStep::Reply(ClientMessage::Subscribe {
                    id,
                    payload: SubscribePayload {
                        query: self.query.clone(),
                    },
                })
            }
            ServerMessage::Ping => ControlStep::Reply(ClientMessage::Pong),
            ServerMessage::Pong => ControlStep::Continue,
            ServerMessage::Next { id, payload } => {
                if !self.is_own_operation(&id) {
                    tracing::debug!(operation_id = %id, "ignoring result for unknown operation");
                    return ControlStep::Continue;
                }
                if let Some(errors) = payload.get("errors") {
                    tracing::warn!(%errors, "stream result carried errors");
                }
                match extract_events(&payload) {
                    Some(events) => {
                        tracing::debug!(count = events.len(), "processing stream batch");
                        self.processor.process_all(events).await;
                    }
                    None => tracing::debug!("stream result without instructions, skipped"),
                }
                ControlStep::Continue
            }
            ServerMessage::Error { id, payload } => {
                if !self.is_own_operation(&id) {
                    return ControlStep::Continue;
                }
                ControlStep::Failed(format!("subscription rejected: {payload}"))
            }
            ServerMessage::Complete { id } => {
                if !self.is_own_operation(&id) {
                    return ControlStep::Continue;
                }
                ControlStep::Finished
            }
        }
    }

    fn is_own_operation(&self, id: &str) -> bool {
        self.operation_id.as_deref() == Some(id)
    }
}

impl fmt::Debug for SubscriptionController {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SubscriptionController")
            .field("url", &self.url)
            .field("api_key", &"<redacted>")
            .field("state", &self.state)
            .field("operation_id", &self.operation_id)
            .finish_non_exhaustive()
    }
}

async fn send<S>(sink: &mut S, message: &ClientMessage) -> Result<(), BridgeError>
where
    S: Sink<Message> + Unpin,
    S::Error: fmt::Display,
{
    let text = message
        .to_json()
        .map_err(|e| BridgeError::Stream(format!("failed to encode client message: {e}")))?;
    sink.send(Message::text(text))
        .await
        .map_err(|e| BridgeError::Stream(format!("send failed: {e}")))
}
