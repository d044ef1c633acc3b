//! Upstream websocket layer: protocol messages, payload normalisation,
//! the subscription document, and the controller that drives them.
//!
//! The source speaks `graphql-transport-ws`; one subscription is opened per
//! connection and every `next` result is handed to the event processor.

pub mod messages;
pub mod payload;
pub mod query;
pub mod subscription;

pub use payload::extract_events;
pub use subscription::{SubscriptionController, SubscriptionState};
