//! Persistence layer: SQLite audit log of every processed event.
//!
//! [`EventStore`] is append-only. Rows are inserted once per stream event,
//! matched or not, and never updated or deleted by this crate.

pub mod models;
pub mod sqlite;

pub use models::StoredEvent;
pub use sqlite::EventStore;
