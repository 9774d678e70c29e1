//! # Aggregation Reduction
//!
//! Plaintext side of the decrypt-verify-aggregate protocol: which handles
//! go into a request, and how the returned batch folds into averages.
//!
//! Batch layout is reporter-major: for roster `[r0, r1]` and fields
//! `[f0, f1, f2]` the batch is `r0.f0, r0.f1, r0.f2, r1.f0, r1.f1, r1.f2`.

use crate::domain::{
    Address, CipherHandle, EncryptedStore, Field, LedgerError, LedgerResult, PeriodId,
};

/// Collect the handles to decrypt, in batch order.
pub fn gather_handles(
    store: &EncryptedStore,
    period_id: PeriodId,
    roster: &[Address],
    fields: &[Field],
) -> LedgerResult<Vec<CipherHandle>> {
    let mut handles = Vec::with_capacity(roster.len() * fields.len());
    for reporter in roster {
        let reading = store
            .reading(period_id, reporter)
            .ok_or(LedgerError::NoData(period_id))?;
        handles.extend(fields.iter().map(|field| reading.handle(*field)));
    }
    Ok(handles)
}

/// Sum each column of a reporter-major batch.
pub fn reduce_batch(
    plaintexts: &[u64],
    reporter_count: usize,
    stride: usize,
) -> LedgerResult<Vec<u128>> {
    let expected = reporter_count * stride;
    if plaintexts.len() != expected {
        return Err(LedgerError::BatchLengthMismatch {
            expected,
            actual: plaintexts.len(),
        });
    }

    let mut sums = vec![0u128; stride];
    if stride == 0 {
        return Ok(sums);
    }
    for row in plaintexts.chunks_exact(stride) {
        for (sum, value) in sums.iter_mut().zip(row) {
            *sum += u128::from(*value);
        }
    }
    Ok(sums)
}

/// Truncating average. Zero reporters yields zero.
pub fn floor_average(sum: u128, reporter_count: usize) -> u64 {
    if reporter_count == 0 {
        return 0;
    }
    // The mean of u64 values always fits in a u64.
    (sum / reporter_count as u128) as u64
}
