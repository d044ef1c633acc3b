//! Database models for the audit log.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// A stored row from the `events` table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredEvent {
    /// Auto-increment row ID.
    pub id: i64,
    /// Mint address.
    pub mint: Option<String>,
    /// Pool address.
    pub pool: Option<String>,
    /// Transaction signature.
    pub signature: Option<String>,
    /// Comma-joined matched addresses, or `"no-match"`.
    pub found_by: Option<String>,
    /// Reserved team column.
    pub matched_team: Option<String>,
    /// Insert time (UTC, SQLite `CURRENT_TIMESTAMP`).
    pub created_at: NaiveDateTime,
}
