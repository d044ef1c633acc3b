//! # draft-alert
//!
//! Real-time alerting bridge for newly created Solana DBC pools.
//!
//! Keeps one subscription open against the Bitquery streaming API, tests
//! every account address of each observed instruction against a fixed set
//! of name suffixes, appends every event to a SQLite audit log, and sends a
//! Telegram message when an address matches.
//!
//! ## Architecture
//!
//! ```text
//! Bitquery (graphql-transport-ws)
//!     │
//!     ├── SubscriptionController (ws/)
//!     │       └── payload normalisation (single | batch)
//!     │
//!     ├── EventProcessor (service/)
//!     │       ├── SuffixMatcher (domain/)
//!     │       ├── EventStore ──────────▶ SQLite
//!     │       └── AlertDispatcher ─────▶ worker ─▶ Telegram Bot API
//! ```

pub mod config;
pub mod domain;
pub mod error;
pub mod notify;
pub mod persistence;
pub mod service;
pub mod ws;
