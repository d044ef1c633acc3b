//! SQLite implementation of the append-only event store.

use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

use chrono::NaiveDateTime;
use sqlx::SqlitePool;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};

use super::models::StoredEvent;
use crate::domain::NewEventRecord;
use crate::error::BridgeError;

const SCHEMA: &str = "CREATE TABLE IF NOT EXISTS events (
  id INTEGER PRIMARY KEY AUTOINCREMENT,
  mint TEXT,
  pool TEXT,
  signature TEXT,
  found_by TEXT,
  matched_team TEXT,
  created_at DATETIME DEFAULT CURRENT_TIMESTAMP
)";

type EventRow = (
    i64,
    Option<String>,
    Option<String>,
    Option<String>,
    Option<String>,
    Option<String>,
    NaiveDateTime,
);

/// Append-only audit log backed by `sqlx::SqlitePool`.
///
/// The pool holds a single connection, so concurrent appends are
/// serialised by the pool rather than by SQLite's file lock.
#[derive(Debug, Clone)]
pub struct EventStore {
    pool: SqlitePool,
}

impl EventStore {
    /// Opens (creating if absent) the database at `path` and ensures the
    /// schema exists. Existing rows are never touched.
    ///
    /// # Errors
    ///
    /// Returns [`BridgeError::StorageUnavailable`] if the file cannot be
    /// opened or the schema cannot be created.
    pub async fn open(path: &Path) -> Result<Self, BridgeError> {
        let options = SqliteConnectOptions::new()
            .filename(path)
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .busy_timeout(Duration::from_secs(5));
        let store = Self::connect(options).await?;
        tracing::info!(path = %path.display(), "event store opened");
        Ok(store)
    }

    /// Opens a private in-memory database.
    ///
    /// # Errors
    ///
    /// Returns [`BridgeError::StorageUnavailable`] if SQLite cannot be
    /// initialised.
    pub async fn open_in_memory() -> Result<Self, BridgeError> {
        let options = SqliteConnectOptions::from_str("sqlite::memory:")
            .map_err(|e| BridgeError::StorageUnavailable(e.to_string()))?;
        Self::connect(options).await
    }

    async fn connect(options: SqliteConnectOptions) -> Result<Self, BridgeError> {
        // One long-lived connection: serialises writers and keeps an
        // in-memory database alive for the life of the store.
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .min_connections(1)
            .idle_timeout(None::<Duration>)
            .max_lifetime(None::<Duration>)
            .connect_with(options)
            .await
            .map_err(|e| BridgeError::StorageUnavailable(e.to_string()))?;

        sqlx::query(SCHEMA)
            .execute(&pool)
            .await
            .map_err(|e| BridgeError::StorageUnavailable(e.to_string()))?;

        Ok(Self { pool })
    }

    /// Appends one record and returns its row ID.
    ///
    /// # Errors
    ///
    /// Returns [`BridgeError::WriteFailure`] on database failure.
    pub async fn append(&self, record: &NewEventRecord) -> Result<i64, BridgeError> {
        let result = sqlx::query(
            "INSERT INTO events (mint, pool, signature, found_by, matched_team) \
             VALUES (?, ?, ?, ?, ?)",
        )
        .bind(record.mint.as_deref())
        .bind(record.pool.as_deref())
        .bind(record.signature.as_str())
        .bind(record.found_by.as_str())
        .bind(record.matched_team.as_str())
        .execute(&self.pool)
        .await
        .map_err(|e| BridgeError::WriteFailure(e.to_string()))?;

        Ok(result.last_insert_rowid())
    }

    /// Number of rows in the log.
    ///
    /// # Errors
    ///
    /// Returns [`BridgeError::StorageUnavailable`] on database failure.
    pub async fn count(&self) -> Result<i64, BridgeError> {
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM events")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| BridgeError::StorageUnavailable(e.to_string()))
    }

    /// Loads the most recent `limit` rows in insertion order.
    ///
    /// # Errors
    ///
    /// Returns [`BridgeError::StorageUnavailable`] on database failure.
    pub async fn load_recent(&self, limit: u32) -> Result<Vec<StoredEvent>, BridgeError> {
        let rows = sqlx::query_as::<_, EventRow>(
            "SELECT id, mint, pool, signature, found_by, matched_team, created_at FROM ( \
               SELECT * FROM events ORDER BY id DESC LIMIT ? \
             ) ORDER BY id ASC",
        )
        .bind(i64::from(limit))
        .fetch_all(&self.pool)
        .await
        .map_err(|e| BridgeError::StorageUnavailable(e.to_string()))?;

        Ok(rows
            .into_iter()
            .map(
                |(id, mint, pool, signature, found_by, matched_team, created_at)| StoredEvent {
                    id,
                    mint,
                    pool,
                    signature,
                    found_by,
                    matched_team,
                    created_at,
                },
            )
            .collect())
    }

    /// Closes the underlying pool.
    pub async fn close(&self) {
        self.pool.close().await;
    }
}
