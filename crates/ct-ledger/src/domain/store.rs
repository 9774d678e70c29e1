//! # Encrypted Store
//!
//! One reading per (period, reporter) plus the capability relation that the
//! decryption oracle consults. Grants are append-only.

use super::entities::{Reading, ReportStatus};
use super::errors::{LedgerError, LedgerResult};
use super::value_objects::{Address, CipherHandle, PeriodId};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

/// `(handle, grantee) -> may request decryption`.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct GrantTable {
    grants: HashSet<(CipherHandle, Address)>,
}

impl GrantTable {
    /// Create an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Allow `grantee` to request decryption of `handle`.
    /// Returns `false` if the grant already existed.
    pub fn allow(&mut self, handle: CipherHandle, grantee: Address) -> bool {
        self.grants.insert((handle, grantee))
    }

    /// Allow `grantee` on every handle in `handles`.
    pub fn allow_all<I>(&mut self, handles: I, grantee: Address)
    where
        I: IntoIterator<Item = CipherHandle>,
    {
        for handle in handles {
            self.allow(handle, grantee);
        }
    }

    /// The capability predicate.
    pub fn is_allowed(&self, handle: &CipherHandle, grantee: &Address) -> bool {
        self.grants.contains(&(*handle, *grantee))
    }

    /// Whether `grantee` may decrypt every handle in `handles`.
    pub fn all_allowed(&self, handles: &[CipherHandle], grantee: &Address) -> bool {
        handles.iter().all(|h| self.is_allowed(h, grantee))
    }

    /// Number of grants.
    pub fn len(&self) -> usize {
        self.grants.len()
    }

    /// Whether the table is empty.
    pub fn is_empty(&self) -> bool {
        self.grants.is_empty()
    }
}

/// Readings keyed by (period, reporter), plus their grants.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct EncryptedStore {
    readings: HashMap<(PeriodId, Address), Reading>,
    grants: GrantTable,
}

impl EncryptedStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether a reading exists.
    pub fn has_reading(&self, period_id: PeriodId, reporter: &Address) -> bool {
        self.readings.contains_key(&(period_id, *reporter))
    }

    /// Look up a reading.
    pub fn reading(&self, period_id: PeriodId, reporter: &Address) -> Option<&Reading> {
        self.readings.get(&(period_id, *reporter))
    }

    /// Store a reading. Existing readings are immutable.
    pub fn insert_reading(
        &mut self,
        period_id: PeriodId,
        reporter: Address,
        reading: Reading,
    ) -> LedgerResult<()> {
        if self.has_reading(period_id, &reporter) {
            return Err(LedgerError::AlreadyReported(period_id));
        }
        self.readings.insert((period_id, reporter), reading);
        Ok(())
    }

    /// `(submitted, timestamp)` without exposing handles.
    pub fn report_status(&self, period_id: PeriodId, reporter: &Address) -> ReportStatus {
        self.reading(period_id, reporter)
            .map(|r| ReportStatus {
                submitted: r.submitted,
                timestamp: r.submitted_at,
            })
            .unwrap_or_default()
    }

    /// The capability relation.
    pub fn grants(&self) -> &GrantTable {
        &self.grants
    }

    /// Mutable access to the capability relation.
    pub fn grants_mut(&mut self) -> &mut GrantTable {
        &mut self.grants
    }

    /// Number of stored readings across all periods.
    pub fn reading_count(&self) -> usize {
        self.readings.len()
    }
}
