//! Domain layer: suffix matching, stream events, and derived records.
//!
//! Everything here is pure. Effects (storage, notification, transport)
//! live in the outer layers and consume these types.

pub mod event_record;
pub mod stream_event;
pub mod suffix_matcher;

pub use event_record::{MatchOutcome, NO_MATCH, NewEventRecord};
pub use stream_event::StreamEvent;
pub use suffix_matcher::{DEFAULT_SUFFIXES, SuffixMatcher};
