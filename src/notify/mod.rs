//! Notification layer: alert formatting, queueing, and Telegram delivery.
//!
//! Delivery is fire-and-forget. Nothing in this module reports failure to
//! the processing path; failures are logged where they happen.

pub mod alert;
pub mod dispatcher;
pub mod telegram;

pub use alert::{Alert, escape_html};
pub use dispatcher::{AlertDispatcher, drain_alerts, run_alert_worker};
pub use telegram::TelegramNotifier;
