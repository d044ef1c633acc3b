//! Decoded upstream instruction observation.

use chrono::{DateTime, Utc};

/// One blockchain instruction observed on the stream.
///
/// Ephemeral: built at the websocket boundary and consumed by a single
/// [`crate::service::EventProcessor::process`] call.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StreamEvent {
    /// Account addresses in source order. Missing or empty addresses have
    /// already been filtered out.
    pub accounts: Vec<String>,
    /// Transaction signature, empty when the source omitted it.
    pub signature: String,
    /// Block time, when present and parseable.
    pub block_time: Option<DateTime<Utc>>,
    /// Instruction method name as reported by the source.
    pub method: Option<String>,
}

impl StreamEvent {
    /// Creates an event from accounts and signature only.
    #[must_use]
    pub fn new<I, S>(accounts: I, signature: impl Into<String>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            accounts: accounts.into_iter().map(Into::into).collect(),
            signature: signature.into(),
            block_time: None,
            method: None,
        }
    }
}
