//! `graphql-transport-ws` protocol messages.
//!
//! Only the subset used by a single-subscription client is modelled.

use serde::{Deserialize, Serialize};

/// Websocket sub-protocol negotiated on upgrade.
pub const GRAPHQL_TRANSPORT_WS: &str = "graphql-transport-ws";

/// Client → server message.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMessage {
    /// First message after the upgrade; carries auth.
    ConnectionInit {
        /// Connection parameters.
        payload: serde_json::Value,
    },
    /// Starts an operation.
    Subscribe {
        /// Operation ID.
        id: String,
        /// GraphQL request.
        payload: SubscribePayload,
    },
    /// Reply to a server `ping`.
    Pong,
}

/// GraphQL request body carried by [`ClientMessage::Subscribe`].
#[derive(Debug, Clone, Serialize)]
pub struct SubscribePayload {
    /// GraphQL document.
    pub query: String,
}

/// Server → client message.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMessage {
    /// Connection accepted.
    ConnectionAck,
    /// One execution result for an operation.
    Next {
        /// Operation ID.
        id: String,
        /// Execution result (`{"data": ...}`).
        #[serde(default)]
        payload: serde_json::Value,
    },
    /// Operation failed.
    Error {
        /// Operation ID.
        id: String,
        /// GraphQL errors.
        #[serde(default)]
        payload: serde_json::Value,
    },
    /// Operation finished.
    Complete {
        /// Operation ID.
        id: String,
    },
    /// Keep-alive request.
    Ping,
    /// Keep-alive answer.
    Pong,
}

impl ClientMessage {
    /// Serializes to the JSON text frame body.
    ///
    /// # Errors
    ///
    /// Returns the [`serde_json::Error`] if the message cannot be encoded.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}
