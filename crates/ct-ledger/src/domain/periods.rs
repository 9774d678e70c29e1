//! # Period Manager
//!
//! Arena of period records indexed by a strictly increasing id. Ids are
//! allocated when a period starts and never reused, so a late oracle
//! callback can only ever touch the period it was issued for.

use super::entities::{AggregateSummary, Period};
use super::errors::{LedgerError, LedgerResult};
use super::value_objects::{Address, PeriodId, PeriodPhase, RequestId, Timestamp};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Owns the period lifecycle.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PeriodManager {
    periods: BTreeMap<PeriodId, Period>,
    current: Option<PeriodId>,
    next_id: PeriodId,
    /// Outstanding aggregation; blocks `start_period` until resolved.
    pending_aggregation: Option<(PeriodId, RequestId)>,
}

impl Default for PeriodManager {
    fn default() -> Self {
        Self::new()
    }
}

impl PeriodManager {
    /// Create a manager with no periods.
    pub fn new() -> Self {
        Self {
            periods: BTreeMap::new(),
            current: None,
            next_id: 1,
            pending_aggregation: None,
        }
    }

    /// Id the next `open` will allocate.
    pub fn next_id(&self) -> PeriodId {
        self.next_id
    }

    /// The current period, if one was ever started.
    pub fn current(&self) -> Option<&Period> {
        self.current.and_then(|id| self.periods.get(&id))
    }

    /// Look up any period, current or retired.
    pub fn get(&self, id: PeriodId) -> Option<&Period> {
        self.periods.get(&id)
    }

    /// Look up a period or fail with `UnknownPeriod`.
    pub fn require(&self, id: PeriodId) -> LedgerResult<&Period> {
        self.periods.get(&id).ok_or(LedgerError::UnknownPeriod(id))
    }

    fn require_mut(&mut self, id: PeriodId) -> LedgerResult<&mut Period> {
        self.periods
            .get_mut(&id)
            .ok_or(LedgerError::UnknownPeriod(id))
    }

    /// Outstanding aggregation, if any.
    pub fn pending_aggregation(&self) -> Option<(PeriodId, RequestId)> {
        self.pending_aggregation
    }

    /// Current period is open for submissions.
    pub fn is_active(&self, now: Timestamp) -> bool {
        self.current().is_some_and(|p| p.is_open_at(now))
    }

    /// Seconds left in the current window.
    pub fn time_remaining(&self, now: Timestamp) -> u64 {
        self.current().map_or(0, |p| p.time_remaining(now))
    }

    /// Validate that a new period may start at `now`.
    pub fn check_can_start(&self, now: Timestamp) -> LedgerResult<()> {
        if let Some((period_id, request_id)) = self.pending_aggregation {
            return Err(LedgerError::AggregationPending {
                period_id,
                request_id,
            });
        }
        if let Some(current) = self.current() {
            if current.is_open_at(now) {
                return Err(LedgerError::PeriodStillOpen {
                    period_id: current.id,
                    remaining_secs: current.time_remaining(now),
                });
            }
        }
        Ok(())
    }

    /// Open a new period. An expired, never-aggregated current period is
    /// marked `Superseded` and stays queryable.
    pub fn open(
        &mut self,
        now: Timestamp,
        duration_secs: u64,
        summary: AggregateSummary,
    ) -> LedgerResult<PeriodId> {
        self.check_can_start(now)?;

        if let Some(current_id) = self.current {
            let current = self.require_mut(current_id)?;
            if current.active() {
                current.transition_to(PeriodPhase::Superseded)?;
            }
        }

        let id = self.next_id;
        self.periods
            .insert(id, Period::new(id, now, duration_secs, summary));
        self.current = Some(id);
        self.next_id += 1;
        Ok(id)
    }

    /// Add a reporter to the open period's roster.
    pub fn enroll(&mut self, id: PeriodId, reporter: Address) -> LedgerResult<bool> {
        Ok(self.require_mut(id)?.append_reporter(reporter))
    }

    /// Mark a period as waiting on `request_id`.
    pub fn begin_aggregation(&mut self, id: PeriodId, request_id: RequestId) -> LedgerResult<()> {
        let period = self.require_mut(id)?;
        period.transition_to(PeriodPhase::AwaitingDecryption)?;
        period.pending_request = Some(request_id);
        self.pending_aggregation = Some((id, request_id));
        Ok(())
    }

    /// Write the final summary and release the start guard.
    pub fn finalize(&mut self, id: PeriodId, summary: AggregateSummary) -> LedgerResult<()> {
        let period = self.require_mut(id)?;
        period.transition_to(PeriodPhase::Finalized)?;
        period.summary = summary;
        period.pending_request = None;
        if self.pending_aggregation.is_some_and(|(pid, _)| pid == id) {
            self.pending_aggregation = None;
        }
        Ok(())
    }

    /// Number of periods ever opened.
    pub fn len(&self) -> usize {
        self.periods.len()
    }

    /// Whether no period was ever opened.
    pub fn is_empty(&self) -> bool {
        self.periods.is_empty()
    }
}
