//! Payment ledger and its two storage backends.

pub mod db;
pub mod ledger;
pub mod memory;

use thiserror::Error;

/// Errors surfaced by ledger operations.
///
/// Backend unavailability is reported to the caller instead of being
/// swallowed; handlers turn it into a user-facing retry notice while the
/// webhook acknowledgment still succeeds.
#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("connection pool error: {0}")]
    Pool(#[from] r2d2::Error),
    #[error("database error: {0}")]
    Sqlite(#[from] rusqlite::Error),
}

// Re-exports for convenience
pub use db::{create_pool, get_connection, DbConnection, DbPool};
pub use ledger::{PaymentLedger, PaymentRecord, PaymentStatus, ReviewVerdict, StatusCounts};
pub use memory::MemStore;
