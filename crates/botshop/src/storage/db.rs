//! Durable ledger backend: SQLite via an r2d2 connection pool.

use r2d2::{Pool, PooledConnection};
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::{params, Connection, OptionalExtension, Result};

use super::ledger::{ReviewVerdict, StatusCounts};
use super::LedgerError;

pub type DbPool = Pool<SqliteConnectionManager>;
pub type DbConnection = PooledConnection<SqliteConnectionManager>;

/// Create a new database connection pool and ensure the schema exists.
///
/// Schema creation failure is a startup error: without the payments table
/// every later ledger call would fail anyway, far from the root cause.
///
/// # Arguments
///
/// * `database_path` - Path to the SQLite database file
pub fn create_pool(database_path: &str) -> Result<DbPool, LedgerError> {
    let manager = SqliteConnectionManager::file(database_path);
    let pool = Pool::builder()
        .max_size(10) // Maximum 10 connections in the pool
        .build(manager)?;

    let conn = pool.get()?;
    init_schema(&conn)?;

    Ok(pool)
}

/// Get a connection from the pool. The connection is returned to the pool
/// when dropped.
pub fn get_connection(pool: &DbPool) -> Result<DbConnection, r2d2::Error> {
    pool.get()
}

/// Create the payments table and its indexes if they do not exist yet.
///
/// Idempotent and never destructive; safe to run on every startup.
pub fn init_schema(conn: &Connection) -> Result<()> {
    conn.execute(
        "CREATE TABLE IF NOT EXISTS payments (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            user_id INTEGER NOT NULL,
            username TEXT,
            pay_method TEXT,
            status TEXT NOT NULL DEFAULT 'pending',
            reason TEXT,
            created_at DATETIME NOT NULL DEFAULT CURRENT_TIMESTAMP
        )",
        [],
    )?;
    conn.execute("CREATE INDEX IF NOT EXISTS idx_pay_user ON payments(user_id)", [])?;
    conn.execute("CREATE INDEX IF NOT EXISTS idx_pay_status ON payments(status)", [])?;
    conn.execute("CREATE INDEX IF NOT EXISTS idx_pay_time ON payments(created_at)", [])?;
    Ok(())
}

/// Insert one pending payment record.
pub fn insert_payment(conn: &Connection, user_id: i64, username: Option<&str>, method: &str) -> Result<()> {
    conn.execute(
        "INSERT INTO payments (user_id, username, pay_method, status) VALUES (?1, ?2, ?3, 'pending')",
        params![user_id, username, method],
    )?;
    Ok(())
}

/// Apply a verdict to the most recent record of `user_id`.
///
/// A single conditional UPDATE keyed by the latest-record subselect, so
/// the read-then-update cannot race against a concurrent insert for the
/// same user. The id tiebreak keeps ordering stable when two records
/// share a timestamp. Returns `false` when the user has no records.
pub fn resolve_latest(
    conn: &Connection,
    user_id: i64,
    verdict: ReviewVerdict,
    reason: Option<&str>,
) -> Result<bool> {
    let changed = conn.execute(
        "UPDATE payments
            SET status = ?1, reason = ?2
          WHERE id = (
            SELECT id FROM payments WHERE user_id = ?3
            ORDER BY created_at DESC, id DESC LIMIT 1
          )",
        params![verdict.as_status().as_str(), reason, user_id],
    )?;
    Ok(changed > 0)
}

/// Aggregate counts by status over the whole table.
///
/// `total` is COUNT(*), independent of the three named buckets.
pub fn count_by_status(conn: &Connection) -> Result<StatusCounts> {
    conn.query_row(
        "SELECT
            COALESCE(SUM(status = 'pending'), 0),
            COALESCE(SUM(status = 'approved'), 0),
            COALESCE(SUM(status = 'rejected'), 0),
            COUNT(*)
         FROM payments",
        [],
        |row| {
            Ok(StatusCounts {
                pending: row.get(0)?,
                approved: row.get(1)?,
                rejected: row.get(2)?,
                total: row.get(3)?,
            })
        },
    )
}

/// Fetch the most recent record for a user. Used by tests and diagnostics.
pub fn latest_for_user(conn: &Connection, user_id: i64) -> Result<Option<(String, Option<String>)>> {
    conn.query_row(
        "SELECT status, reason FROM payments WHERE user_id = ?1
         ORDER BY created_at DESC, id DESC LIMIT 1",
        params![user_id],
        |row| Ok((row.get(0)?, row.get(1)?)),
    )
    .optional()
}
