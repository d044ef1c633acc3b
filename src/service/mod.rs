//! Service layer: per-event orchestration.

pub mod event_processor;

pub use event_processor::EventProcessor;
