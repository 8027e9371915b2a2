//! Payment record model and the ledger facade over both backends.

use std::sync::Arc;

use serde::Serialize;

use super::db::{self, DbPool};
use super::memory::MemStore;
use super::LedgerError;

/// Lifecycle status of a payment record.
///
/// Every record is created `Pending`; an admin verdict moves it to
/// `Approved` or `Rejected`. No code path creates a record in any other
/// status, but readers stay defensive about the stored set (see
/// [`StatusCounts`]).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaymentStatus {
    Pending,
    Approved,
    Rejected,
}

impl PaymentStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
        }
    }
}

/// The only statuses an admin verdict may apply.
///
/// Typed separately from [`PaymentStatus`] so `resolve_latest` cannot be
/// asked to write `pending` back onto a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReviewVerdict {
    Approved,
    Rejected,
}

impl ReviewVerdict {
    pub fn as_status(self) -> PaymentStatus {
        match self {
            Self::Approved => PaymentStatus::Approved,
            Self::Rejected => PaymentStatus::Rejected,
        }
    }
}

/// One user's claimed payment event awaiting manual review.
#[derive(Debug, Clone)]
pub struct PaymentRecord {
    /// Backend-local sequence id.
    pub id: i64,
    /// Telegram user id of the submitter. Not unique across records.
    pub user_id: i64,
    /// Display handle, informational only.
    pub username: Option<String>,
    /// How the proof was submitted ("image", "document", "unknown") or
    /// which payment channel was chosen. Free text, not an enum.
    pub method: String,
    /// Stored status text. Writers only produce the three known values.
    pub status: String,
    /// Free-text note attached when the status leaves `pending`.
    pub reason: Option<String>,
    /// Creation timestamp; selects "the most recent record for a user".
    pub created_at: String,
}

/// Aggregate counts by status.
///
/// `total` is a plain row count, not the sum of the three named buckets,
/// so rows carrying an out-of-set status (impossible via our writers,
/// possible via manual DB edits) remain visible in the total.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StatusCounts {
    pub pending: i64,
    pub approved: i64,
    pub rejected: i64,
    pub total: i64,
}

/// The payment ledger, backed by SQLite or by a process-local store.
///
/// The backend is chosen once at startup (see `StorageKind`); there is no
/// runtime failover between the two. If the durable backend is configured
/// but unreachable at call time the operation fails rather than silently
/// degrading to ephemeral storage.
pub enum PaymentLedger {
    Durable(Arc<DbPool>),
    Ephemeral(MemStore),
}

impl PaymentLedger {
    pub fn durable(pool: Arc<DbPool>) -> Self {
        Self::Durable(pool)
    }

    pub fn ephemeral(store: MemStore) -> Self {
        Self::Ephemeral(store)
    }

    /// Appends one new record with status `pending`.
    pub fn record_pending(
        &self,
        user_id: i64,
        username: Option<&str>,
        method: &str,
    ) -> Result<(), LedgerError> {
        match self {
            Self::Durable(pool) => {
                let conn = db::get_connection(pool)?;
                db::insert_payment(&conn, user_id, username, method)?;
                Ok(())
            }
            Self::Ephemeral(store) => {
                store.record_pending(user_id, username, method);
                Ok(())
            }
        }
    }

    /// Applies a verdict to the chronologically last record of `user_id`.
    ///
    /// Returns `Ok(false)` with no side effect when the user has no
    /// records. The target is selected by recency only, never by current
    /// status: a second verdict on an already-resolved record succeeds
    /// again and overwrites status and reason. That matches the manual
    /// review flow, where an admin may correct a mistaken verdict.
    pub fn resolve_latest(
        &self,
        user_id: i64,
        verdict: ReviewVerdict,
        reason: Option<&str>,
    ) -> Result<bool, LedgerError> {
        match self {
            Self::Durable(pool) => {
                let conn = db::get_connection(pool)?;
                Ok(db::resolve_latest(&conn, user_id, verdict, reason)?)
            }
            Self::Ephemeral(store) => Ok(store.resolve_latest(user_id, verdict, reason)),
        }
    }

    /// Aggregate counts by status. Pure read.
    pub fn aggregate_counts(&self) -> Result<StatusCounts, LedgerError> {
        match self {
            Self::Durable(pool) => {
                let conn = db::get_connection(pool)?;
                Ok(db::count_by_status(&conn)?)
            }
            Self::Ephemeral(store) => Ok(store.aggregate_counts()),
        }
    }
}
