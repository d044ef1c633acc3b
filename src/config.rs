//! Bridge configuration loaded from environment variables.
//!
//! Follows 12-factor style: all settings come from environment variables
//! (or a `.env` file via `dotenvy`). The optional team list is read from a
//! plain text file named by `TEAMS_FILE`.

use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::BridgeError;

/// Default upstream streaming endpoint.
pub const DEFAULT_WS_URL: &str = "wss://streaming.bitquery.io/graphql";

/// Default Telegram Bot API base URL.
pub const DEFAULT_TELEGRAM_API_BASE: &str = "https://api.telegram.org";

/// Top-level bridge configuration.
///
/// Loaded once at startup via [`BridgeConfig::from_env`].
#[derive(Clone)]
pub struct BridgeConfig {
    /// API key for the streaming source (`BITQUERY_KEY`).
    pub bitquery_key: String,

    /// Telegram bot token (`TG_TOKEN`).
    pub telegram_token: String,

    /// Destination chat identifier (`CHAT_ID`).
    pub chat_id: String,

    /// SQLite database file (`DB_PATH`).
    pub db_path: PathBuf,

    /// Optional team list file (`TEAMS_FILE`).
    pub teams_file: PathBuf,

    /// Upstream websocket endpoint (`BITQUERY_WS_URL`).
    pub ws_url: String,

    /// Telegram Bot API base URL (`TELEGRAM_API_BASE`).
    pub telegram_api_base: String,

    /// Per-request timeout for notification sends (`NOTIFY_TIMEOUT_SECS`).
    pub notify_timeout: Duration,

    /// Capacity of the pending alert queue (`ALERT_QUEUE_CAPACITY`).
    pub alert_queue_capacity: usize,
}

impl BridgeConfig {
    /// Loads configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv().ok()` to optionally load a `.env` file.
    ///
    /// # Errors
    ///
    /// Returns [`BridgeError::MissingConfig`] when `BITQUERY_KEY`, `TG_TOKEN`
    /// or `CHAT_ID` is unset or empty, and [`BridgeError::InvalidConfig`] when
    /// a numeric setting cannot be parsed.
    pub fn from_env() -> Result<Self, BridgeError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Resolves configuration through an arbitrary key lookup.
    ///
    /// # Errors
    ///
    /// Same as [`BridgeConfig::from_env`].
    pub fn from_lookup<F>(lookup: F) -> Result<Self, BridgeError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let bitquery_key = required(&lookup, "BITQUERY_KEY")?;
        let telegram_token = required(&lookup, "TG_TOKEN")?;
        let chat_id = required(&lookup, "CHAT_ID")?;

        let db_path = lookup("DB_PATH")
            .filter(|v| !v.is_empty())
            .map_or_else(|| PathBuf::from("./tokens.db"), PathBuf::from);
        let teams_file = lookup("TEAMS_FILE")
            .filter(|v| !v.is_empty())
            .map_or_else(|| PathBuf::from("./teams.txt"), PathBuf::from);

        let ws_url = lookup("BITQUERY_WS_URL").unwrap_or_else(|| DEFAULT_WS_URL.to_string());
        let telegram_api_base = lookup("TELEGRAM_API_BASE")
            .unwrap_or_else(|| DEFAULT_TELEGRAM_API_BASE.to_string())
            .trim_end_matches('/')
            .to_string();

        let notify_timeout = Duration::from_secs(parse_var(&lookup, "NOTIFY_TIMEOUT_SECS", 10)?);
        let alert_queue_capacity = parse_var(&lookup, "ALERT_QUEUE_CAPACITY", 256)?;

        Ok(Self {
            bitquery_key,
            telegram_token,
            chat_id,
            db_path,
            teams_file,
            ws_url,
            telegram_api_base,
            notify_timeout,
            alert_queue_capacity,
        })
    }
}

impl fmt::Debug for BridgeConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BridgeConfig")
            .field("bitquery_key", &"<redacted>")
            .field("telegram_token", &"<redacted>")
            .field("chat_id", &self.chat_id)
            .field("db_path", &self.db_path)
            .field("teams_file", &self.teams_file)
            .field("ws_url", &self.ws_url)
            .field("telegram_api_base", &self.telegram_api_base)
            .field("notify_timeout", &self.notify_timeout)
            .field("alert_queue_capacity", &self.alert_queue_capacity)
            .finish()
    }
}

/// Reads a required variable. Empty values count as missing.
fn required<F>(lookup: &F, key: &'static str) -> Result<String, BridgeError>
where
    F: Fn(&str) -> Option<String>,
{
    lookup(key)
        .filter(|v| !v.trim().is_empty())
        .ok_or(BridgeError::MissingConfig(key))
}

/// Parses a variable as `T`, returning `default` when it is not set.
fn parse_var<F, T>(lookup: &F, key: &'static str, default: T) -> Result<T, BridgeError>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
{
    match lookup(key) {
        None => Ok(default),
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|_| BridgeError::InvalidConfig { key, value: raw }),
    }
}

/// Optional list of team names loaded at startup.
///
/// The list is carried for operators and logged on startup. No matching
/// logic consults it; `matched_team` on stored records stays empty.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TeamList {
    entries: Vec<String>,
}

impl TeamList {
    /// Parses one entry per line, trimming whitespace and dropping blank lines.
    #[must_use]
    pub fn parse(text: &str) -> Self {
        let entries = text
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(str::to_string)
            .collect();
        Self { entries }
    }

    /// Loads the team file at `path`. A missing or unreadable file yields an
    /// empty list.
    #[must_use]
    pub fn load(path: &Path) -> Self {
        match std::fs::read_to_string(path) {
            Ok(text) => {
                let teams = Self::parse(&text);
                tracing::info!(path = %path.display(), count = teams.len(), "loaded team list");
                teams
            }
            Err(e) => {
                tracing::info!(
                    path = %path.display(),
                    error = %e,
                    "no team file found, continuing without team matches"
                );
                Self::default()
            }
        }
    }

    /// Returns the loaded entries.
    #[must_use]
    pub fn entries(&self) -> &[String] {
        &self.entries
    }

    /// Number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` when no entries were loaded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
