//! draft-alert entry point.
//!
//! Wires configuration, storage, notification and the upstream
//! subscription together, then runs until the stream ends or a
//! termination signal arrives.

use std::sync::Arc;

use tracing_subscriber::EnvFilter;

use draft_alert::config::{BridgeConfig, TeamList};
use draft_alert::domain::SuffixMatcher;
use draft_alert::notify::{AlertDispatcher, TelegramNotifier, drain_alerts};
use draft_alert::persistence::EventStore;
use draft_alert::service::EventProcessor;
use draft_alert::ws::SubscriptionController;
use draft_alert::ws::query::default_subscription;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    // Load configuration
    let config = BridgeConfig::from_env()?;
    let teams = TeamList::load(&config.teams_file);
    tracing::info!(teams = teams.len(), db = %config.db_path.display(), "starting draft-alert");
    tracing::debug!(teams = ?teams.entries(), "team list loaded");

    // Build matcher, storage and notification
    let matcher = Arc::new(SuffixMatcher::with_defaults());
    tracing::info!(suffixes = ?matcher.suffixes(), "suffix matcher compiled");
    let store = EventStore::open(&config.db_path).await?;
    let notifier = TelegramNotifier::new(
        config.telegram_api_base.as_str(),
        config.telegram_token.as_str(),
        config.chat_id.as_str(),
        config.notify_timeout,
    )?;
    let (alerts, alert_worker) = AlertDispatcher::spawn(notifier, config.alert_queue_capacity);

    let processor = EventProcessor::new(matcher, store.clone(), alerts);
    let mut controller = SubscriptionController::new(
        config.ws_url.as_str(),
        config.bitquery_key.as_str(),
        default_subscription(),
        processor,
    );

    let ended = tokio::select! {
        result = controller.run() => Some(result),
        () = shutdown_signal() => None,
    };

    match ended {
        // Immediate exit; rows already written are committed.
        None => tracing::info!("termination signal received, exiting"),
        Some(result) => {
            if let Err(e) = result {
                tracing::warn!(error = %e, "subscription terminated");
            }
            // Dropping the last dispatcher lets the worker drain pending
            // alerts; a signal during the drain still exits at once.
            drop(controller);
            if drain_alerts(alert_worker, shutdown_signal()).await {
                store.close().await;
            }
        }
    }

    Ok(())
}

/// Initializes tracing. `LOG_FORMAT=json` selects JSON output.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let json = std::env::var("LOG_FORMAT").is_ok_and(|v| v.eq_ignore_ascii_case("json"));
    if json {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}

/// Resolves on Ctrl-C or, on Unix, SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::warn!(error = %e, "failed to listen for ctrl-c");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::warn!(error = %e, "failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }
}
