//! # Domain Invariants
//!
//! Guards checked before any ledger mutation. Each returns the error the
//! operation must abort with.

use super::entities::{Period, PendingDecryptionRequest};
use super::errors::{LedgerError, LedgerResult};
use super::store::EncryptedStore;
use super::value_objects::{Address, Timestamp};

/// Invariant: one reading per (period, reporter).
pub fn invariant_single_submission(
    store: &EncryptedStore,
    period: &Period,
    reporter: &Address,
) -> LedgerResult<()> {
    if store.has_reading(period.id, reporter) {
        return Err(LedgerError::AlreadyReported(period.id));
    }
    Ok(())
}

/// Invariant: submissions only while active and strictly before `end`.
pub fn invariant_reporting_window(period: &Period, now: Timestamp) -> LedgerResult<()> {
    if !period.is_open_at(now) {
        return Err(LedgerError::NotReportingWindow);
    }
    Ok(())
}

/// Invariant: a summary is requested once, after the window has closed.
pub fn invariant_summary_window(period: &Period, now: Timestamp) -> LedgerResult<()> {
    if period.summary_finalized() {
        return Err(LedgerError::SummaryAlreadyFinalized(period.id));
    }
    if let Some(request_id) = period.pending_request {
        return Err(LedgerError::AggregationPending {
            period_id: period.id,
            request_id,
        });
    }
    if !period.has_expired(now) {
        return Err(LedgerError::PeriodStillOpen {
            period_id: period.id,
            remaining_secs: period.time_remaining(now),
        });
    }
    Ok(())
}

/// Invariant: the callback batch is exactly roster × stride values.
pub fn invariant_batch_shape(
    pending: &PendingDecryptionRequest,
    plaintexts: &[u64],
) -> LedgerResult<()> {
    let expected = pending.expected_batch_len();
    if plaintexts.len() != expected {
        return Err(LedgerError::BatchLengthMismatch {
            expected,
            actual: plaintexts.len(),
        });
    }
    Ok(())
}
