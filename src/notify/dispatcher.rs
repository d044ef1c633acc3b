//! Non-blocking hand-off of alerts to a background sender.
//!
//! [`AlertDispatcher`] wraps a bounded [`tokio::sync::mpsc`] channel. The
//! stream loop only ever calls [`AlertDispatcher::dispatch`], which never
//! waits: when the queue is full the alert is dropped with a warning.
//! A single worker task drains the queue through a [`TelegramNotifier`].

use std::future::Future;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use super::{Alert, TelegramNotifier};

/// Sending half of the alert queue.
#[derive(Debug, Clone)]
pub struct AlertDispatcher {
    sender: mpsc::Sender<Alert>,
}

impl AlertDispatcher {
    /// Creates a dispatcher and the receiver it feeds. A zero capacity is
    /// raised to one.
    #[must_use]
    pub fn new(capacity: usize) -> (Self, mpsc::Receiver<Alert>) {
        let (sender, receiver) = mpsc::channel(capacity.max(1));
        (Self { sender }, receiver)
    }

    /// Creates a dispatcher whose alerts are delivered by `notifier` on a
    /// spawned worker. The worker ends once every dispatcher clone is
    /// dropped and the queue is drained.
    #[must_use]
    pub fn spawn(notifier: TelegramNotifier, capacity: usize) -> (Self, JoinHandle<()>) {
        let (dispatcher, receiver) = Self::new(capacity);
        let worker = tokio::spawn(run_alert_worker(receiver, notifier));
        (dispatcher, worker)
    }

    /// Queues `alert` without waiting. Returns `false` if it was dropped.
    pub fn dispatch(&self, alert: Alert) -> bool {
        match self.sender.try_send(alert) {
            Ok(()) => true,
            Err(mpsc::error::TrySendError::Full(alert)) => {
                tracing::warn!(
                    mint = alert.mint.as_deref().unwrap_or_default(),
                    signature = %alert.signature,
                    "alert queue full, dropping alert"
                );
                false
            }
            Err(mpsc::error::TrySendError::Closed(alert)) => {
                tracing::warn!(
                    mint = alert.mint.as_deref().unwrap_or_default(),
                    signature = %alert.signature,
                    "alert worker stopped, dropping alert"
                );
                false
            }
        }
    }
}

/// Delivers queued alerts one at a time until the queue closes.
pub async fn run_alert_worker(mut receiver: mpsc::Receiver<Alert>, notifier: TelegramNotifier) {
    while let Some(alert) = receiver.recv().await {
        let mint = alert.mint.as_deref().unwrap_or_default();
        if notifier.send(&alert.render_html()).await {
            tracing::info!(mint, signature = %alert.signature, "alert sent");
        }
    }
    tracing::debug!("alert worker stopped");
}

/// Waits for `worker` to deliver what is still queued, unless `shutdown`
/// resolves first. On shutdown the worker is aborted and the remaining
/// alerts are abandoned.
///
/// Returns `true` if the queue was drained.
pub async fn drain_alerts<F>(mut worker: JoinHandle<()>, shutdown: F) -> bool
where
    F: Future<Output = ()>,
{
    tokio::select! {
        joined = &mut worker => {
            if let Err(e) = joined {
                tracing::warn!(error = %e, "alert worker did not finish cleanly");
            }
            true
        }
        () = shutdown => {
            worker.abort();
            tracing::info!("shutdown requested, abandoning pending alerts");
            false
        }
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use std::time::Duration;

    use super::*;

    fn alert(mint: &str) -> Alert {
        Alert {
            mint: Some(mint.to_string()),
            pool: Some("pool".to_string()),
            signature: "sig".to_string(),
            matched: vec![mint.to_string()],
        }
    }

    #[test]
    fn queued_alerts_arrive_in_order() {
        let (dispatcher, mut rx) = AlertDispatcher::new(4);
        assert!(dispatcher.dispatch(alert("a")));
        assert!(dispatcher.dispatch(alert("b")));
        let Ok(first) = rx.try_recv() else {
            panic!("expected first alert");
        };
        let Ok(second) = rx.try_recv() else {
            panic!("expected second alert");
        };
        assert_eq!(first.mint.as_deref(), Some("a"));
        assert_eq!(second.mint.as_deref(), Some("b"));
    }

    #[test]
    fn full_queue_drops_instead_of_blocking() {
        let (dispatcher, _rx) = AlertDispatcher::new(1);
        assert!(dispatcher.dispatch(alert("a")));
        assert!(!dispatcher.dispatch(alert("b")));
    }

    #[test]
    fn zero_capacity_is_raised_to_one() {
        let (dispatcher, _rx) = AlertDispatcher::new(0);
        assert!(dispatcher.dispatch(alert("a")));
    }

    #[test]
    fn closed_queue_drops() {
        let (dispatcher, rx) = AlertDispatcher::new(1);
        drop(rx);
        assert!(!dispatcher.dispatch(alert("a")));
    }

    #[tokio::test]
    async fn worker_drains_queue_and_stops_when_dispatcher_dropped() {
        let Ok(notifier) = TelegramNotifier::new(
            "http://127.0.0.1:1",
            "t",
            "c",
            Duration::from_millis(200),
        ) else {
            panic!("client");
        };
        let (dispatcher, worker) = AlertDispatcher::spawn(notifier, 8);
        assert!(dispatcher.dispatch(alert("a")));
        drop(dispatcher);
        let finished = tokio::time::timeout(Duration::from_secs(10), worker).await;
        assert!(matches!(finished, Ok(Ok(()))));
    }

    #[tokio::test]
    async fn drain_waits_for_a_finished_worker() {
        let (dispatcher, mut rx) = AlertDispatcher::new(4);
        let worker = tokio::spawn(async move { while rx.recv().await.is_some() {} });
        assert!(dispatcher.dispatch(alert("a")));
        drop(dispatcher);
        assert!(drain_alerts(worker, std::future::pending()).await);
    }

    #[tokio::test]
    async fn shutdown_interrupts_a_slow_drain() {
        // Accepts connections at the TCP level but never answers.
        let Ok(silent) = tokio::net::TcpListener::bind("127.0.0.1:0").await else {
            panic!("bind");
        };
        let Ok(addr) = silent.local_addr() else {
            panic!("local_addr");
        };
        let Ok(notifier) = TelegramNotifier::new(
            format!("http://{addr}"),
            "t",
            "c",
            Duration::from_secs(600),
        ) else {
            panic!("client");
        };
        let (dispatcher, worker) = AlertDispatcher::spawn(notifier, 8);
        for mint in ["a", "b", "c"] {
            assert!(dispatcher.dispatch(alert(mint)));
        }
        drop(dispatcher);

        let drained = tokio::time::timeout(
            Duration::from_secs(5),
            drain_alerts(worker, tokio::time::sleep(Duration::from_millis(50))),
        )
        .await;
        assert!(matches!(drained, Ok(false)));
        drop(silent);
    }
}
