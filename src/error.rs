//! Bridge error taxonomy.
//!
//! [`BridgeError`] is the central error type. Only startup errors are
//! fatal; every other variant is logged at the point where it happens and the
//! stream keeps flowing.
//!
//! | Variant              | Raised by                    | Effect                      |
//! |----------------------|------------------------------|-----------------------------|
//! | `MissingConfig`      | [`crate::config`]            | process exits non-zero      |
//! | `InvalidConfig`      | [`crate::config`]            | process exits non-zero      |
//! | `StorageUnavailable` | [`crate::persistence`] open  | process exits non-zero      |
//! | `WriteFailure`       | [`crate::persistence`] append| logged, record dropped      |
//! | `Stream`             | [`crate::ws`]                | logged, subscription ends   |
//! | `Notification`       | [`crate::notify`]            | logged, swallowed           |

/// Errors produced by the bridge.
#[derive(Debug, thiserror::Error)]
pub enum BridgeError {
    /// A required environment variable is absent or empty.
    #[error("missing required configuration: set {0} in the environment")]
    MissingConfig(&'static str),

    /// An environment variable is present but cannot be parsed.
    #[error("invalid value {value:?} for {key}")]
    InvalidConfig {
        /// Variable name.
        key: &'static str,
        /// Raw value that failed to parse.
        value: String,
    },

    /// The record store could not be opened or its schema created.
    #[error("storage unavailable: {0}")]
    StorageUnavailable(String),

    /// A single append to the record store failed.
    #[error("storage write failed: {0}")]
    WriteFailure(String),

    /// Subscription-level failure (connect, protocol, transport).
    #[error("stream error: {0}")]
    Stream(String),

    /// Notification delivery failure.
    #[error("notification error: {0}")]
    Notification(String),
}
