//! Event processor: match, persist, alert.

use std::sync::Arc;

use crate::domain::{MatchOutcome, NewEventRecord, StreamEvent, SuffixMatcher};
use crate::notify::{Alert, AlertDispatcher};
use crate::persistence::EventStore;

/// Turns one [`StreamEvent`] into exactly one stored record and, on a
/// suffix match, one queued alert.
///
/// Owns handles to the shared matcher, store and alert queue; cloning is
/// cheap. The write is awaited before the alert is queued, but a failed
/// write does not suppress the alert.
#[derive(Debug, Clone)]
pub struct EventProcessor {
    matcher: Arc<SuffixMatcher>,
    store: EventStore,
    alerts: AlertDispatcher,
}

impl EventProcessor {
    /// Creates a new `EventProcessor`.
    #[must_use]
    pub fn new(matcher: Arc<SuffixMatcher>, store: EventStore, alerts: AlertDispatcher) -> Self {
        Self {
            matcher,
            store,
            alerts,
        }
    }

    /// Returns a reference to the inner [`EventStore`].
    #[must_use]
    pub fn store(&self) -> &EventStore {
        &self.store
    }

    /// Processes one event. Never fails; errors are logged.
    pub async fn process(&self, event: StreamEvent) {
        let outcome = MatchOutcome::evaluate(&self.matcher, &event.accounts);
        let record = NewEventRecord::from_outcome(&event, &outcome);

        match self.store.append(&record).await {
            Ok(record_id) => {
                tracing::debug!(
                    record_id,
                    signature = %record.signature,
                    found_by = %record.found_by,
                    "event stored"
                );
            }
            // No retry: the row is logged in full so it can be replayed by hand.
            Err(e) => {
                tracing::error!(
                    error = %e,
                    mint = ?record.mint,
                    pool = ?record.pool,
                    signature = %record.signature,
                    found_by = %record.found_by,
                    "failed to store event"
                );
            }
        }

        match Alert::from_match(&event, &outcome) {
            Some(alert) => {
                let mint = alert.mint.clone().unwrap_or_default();
                if self.alerts.dispatch(alert) {
                    tracing::info!(%mint, signature = %event.signature, "alert queued");
                }
            }
            None => {
                tracing::info!(signature = %event.signature, "event processed (no match)");
            }
        }
    }

    /// Processes `events` strictly in order.
    pub async fn process_all(&self, events: Vec<StreamEvent>) {
        for event in events {
            self.process(event).await;
        }
    }
}
