//! Ephemeral ledger backend: an in-process list plus a monotonic counter.
//!
//! Selected when no `DATABASE_PATH` is configured. Data does not survive a
//! process restart and the id counter restarts at 1, an accepted and
//! documented limitation of this backend, not a bug.

use std::sync::{Arc, Mutex, MutexGuard};

use chrono::Utc;

use super::ledger::{PaymentRecord, PaymentStatus, ReviewVerdict, StatusCounts};

#[derive(Default)]
struct MemInner {
    records: Vec<PaymentRecord>,
    counter: i64,
}

/// Process-local payment store.
///
/// The list and the counter are the only shared mutable state in the
/// process; every operation runs inside a single lock scope so the
/// increment-and-append (and the find-latest-and-update) cannot interleave.
#[derive(Clone, Default)]
pub struct MemStore {
    inner: Arc<Mutex<MemInner>>,
}

impl MemStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, MemInner> {
        // A poisoned lock only means another thread panicked mid-append;
        // the data itself is append-only and still usable.
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn record_pending(&self, user_id: i64, username: Option<&str>, method: &str) {
        let mut inner = self.lock();
        inner.counter += 1;
        let id = inner.counter;
        inner.records.push(PaymentRecord {
            id,
            user_id,
            username: username.map(str::to_owned),
            method: method.to_owned(),
            status: PaymentStatus::Pending.as_str().to_owned(),
            reason: None,
            created_at: Utc::now().to_rfc3339(),
        });
    }

    /// Applies a verdict to the last record of `user_id`, if any.
    ///
    /// Insertion order equals creation order here, so "latest" is the last
    /// matching element. Selection ignores the current status on purpose
    /// (see `PaymentLedger::resolve_latest`).
    pub fn resolve_latest(&self, user_id: i64, verdict: ReviewVerdict, reason: Option<&str>) -> bool {
        let mut inner = self.lock();
        match inner.records.iter_mut().rev().find(|r| r.user_id == user_id) {
            Some(record) => {
                record.status = verdict.as_status().as_str().to_owned();
                record.reason = reason.map(str::to_owned);
                true
            }
            None => false,
        }
    }

    pub fn aggregate_counts(&self) -> StatusCounts {
        let inner = self.lock();
        let mut counts = StatusCounts {
            total: inner.records.len() as i64,
            ..StatusCounts::default()
        };
        for record in &inner.records {
            match record.status.as_str() {
                "pending" => counts.pending += 1,
                "approved" => counts.approved += 1,
                "rejected" => counts.rejected += 1,
                _ => {}
            }
        }
        counts
    }

    /// Snapshot of all records, oldest first.
    pub fn records(&self) -> Vec<PaymentRecord> {
        self.lock().records.clone()
    }
}
