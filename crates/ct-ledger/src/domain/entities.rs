//! # Domain Entities
//!
//! Periods, readings, summaries and the decryption correlation record.

use super::errors::{LedgerError, LedgerResult};
use super::value_objects::{
    Address, CipherHandle, Field, PeriodId, PeriodPhase, RequestId, Timestamp, FIELD_COUNT,
};
use serde::{Deserialize, Serialize};

/// Encrypted per-period aggregate.
///
/// Created zeroed when the period opens, replaced once at finalization.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AggregateSummary {
    /// Encrypted number of reporters.
    pub reporter_count: CipherHandle,
    /// Encrypted floor averages, one per aggregated field.
    pub averages: Vec<(Field, CipherHandle)>,
}

impl AggregateSummary {
    /// Every handle in the summary, count first.
    pub fn handles(&self) -> Vec<CipherHandle> {
        std::iter::once(self.reporter_count)
            .chain(self.averages.iter().map(|(_, h)| *h))
            .collect()
    }

    /// Handle of the average for `field`, if that field is aggregated.
    pub fn average(&self, field: Field) -> Option<CipherHandle> {
        self.averages
            .iter()
            .find(|(f, _)| *f == field)
            .map(|(_, h)| *h)
    }
}

/// A fixed-duration reporting window.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Period {
    /// Period id.
    pub id: PeriodId,
    /// Window start.
    pub start: Timestamp,
    /// Window end (exclusive).
    pub end: Timestamp,
    /// Lifecycle phase.
    pub phase: PeriodPhase,
    /// Reporters in submission order, no duplicates.
    pub roster: Vec<Address>,
    /// Encrypted aggregate.
    pub summary: AggregateSummary,
    /// Outstanding decryption request, if any.
    pub pending_request: Option<RequestId>,
}

impl Period {
    /// Open a new period at `now`.
    pub fn new(
        id: PeriodId,
        now: Timestamp,
        duration_secs: u64,
        summary: AggregateSummary,
    ) -> Self {
        Self {
            id,
            start: now,
            end: now.saturating_add(duration_secs),
            phase: PeriodPhase::Active,
            roster: Vec::new(),
            summary,
            pending_request: None,
        }
    }

    /// The raw `active` flag: cleared once aggregation starts.
    pub fn active(&self) -> bool {
        self.phase == PeriodPhase::Active
    }

    /// Whether the window has elapsed.
    pub fn has_expired(&self, now: Timestamp) -> bool {
        now >= self.end
    }

    /// Accepting readings: active and strictly before `end`.
    pub fn is_open_at(&self, now: Timestamp) -> bool {
        self.active() && !self.has_expired(now)
    }

    /// Seconds left in the window, zero unless open.
    pub fn time_remaining(&self, now: Timestamp) -> u64 {
        if self.active() {
            self.end.saturating_sub(now)
        } else {
            0
        }
    }

    /// Whether the summary has been written.
    pub fn summary_finalized(&self) -> bool {
        self.phase == PeriodPhase::Finalized
    }

    /// Number of reporters on the roster.
    pub fn reporter_count(&self) -> usize {
        self.roster.len()
    }

    /// Append a reporter. Returns `false` if already present.
    pub fn append_reporter(&mut self, reporter: Address) -> bool {
        if self.roster.contains(&reporter) {
            return false;
        }
        self.roster.push(reporter);
        true
    }

    /// Transition to new phase.
    pub fn transition_to(&mut self, next: PeriodPhase) -> LedgerResult<()> {
        if !self.phase.can_transition_to(next) {
            return Err(LedgerError::InvalidPeriodTransition {
                from: self.phase,
                to: next,
            });
        }
        self.phase = next;
        Ok(())
    }

    /// Public view of the period.
    pub fn info(&self) -> PeriodInfo {
        PeriodInfo {
            id: self.id,
            start: self.start,
            end: self.end,
            active: self.active(),
            reporter_count: self.reporter_count(),
        }
    }

    /// Historical view of the period.
    pub fn history(&self) -> PeriodHistory {
        PeriodHistory {
            start: self.start,
            end: self.end,
            finalized: self.summary_finalized(),
            reporter_count: self.reporter_count(),
        }
    }
}

/// One reporter's five-field submission for one period.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reading {
    /// Encrypted field values, indexed by [`Field::index`].
    pub handles: [CipherHandle; FIELD_COUNT],
    /// Always `true` once stored.
    pub submitted: bool,
    /// Submission time.
    pub submitted_at: Timestamp,
}

impl Reading {
    /// Build a submitted reading.
    pub fn new(handles: [CipherHandle; FIELD_COUNT], submitted_at: Timestamp) -> Self {
        Self {
            handles,
            submitted: true,
            submitted_at,
        }
    }

    /// Handle for one field.
    pub fn handle(&self, field: Field) -> CipherHandle {
        self.handles[field.index()]
    }
}

/// Correlation record for an outstanding oracle request.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingDecryptionRequest {
    /// Oracle request id.
    pub request_id: RequestId,
    /// Period being aggregated.
    pub period_id: PeriodId,
    /// Fields requested per reporter, in batch order.
    pub fields: Vec<Field>,
    /// Roster size when the request was issued.
    pub reporter_count: usize,
    /// Request time.
    pub requested_at: Timestamp,
}

impl PendingDecryptionRequest {
    /// Values per reporter in the returned batch.
    pub fn stride(&self) -> usize {
        self.fields.len()
    }

    /// Exact batch length the callback must carry.
    pub fn expected_batch_len(&self) -> usize {
        self.reporter_count * self.stride()
    }
}

/// Oracle proof of decryption authenticity (opaque signature bytes).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecryptionProof(pub Vec<u8>);

/// What the oracle delivers to [`crate::ConfidentialLedgerApi::on_decrypted`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecryptionResponse {
    /// Request being answered.
    pub request_id: RequestId,
    /// Plaintexts in request order.
    pub plaintexts: Vec<u64>,
    /// Attestation over `(request_id, plaintexts)`.
    pub proof: DecryptionProof,
}

/// `currentPeriodInfo` view.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PeriodInfo {
    /// Period id.
    pub id: PeriodId,
    /// Window start.
    pub start: Timestamp,
    /// Window end.
    pub end: Timestamp,
    /// Raw active flag.
    pub active: bool,
    /// Roster size.
    pub reporter_count: usize,
}

/// `readPeriodHistory` view.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PeriodHistory {
    /// Window start.
    pub start: Timestamp,
    /// Window end.
    pub end: Timestamp,
    /// Summary finalized.
    pub finalized: bool,
    /// Roster size.
    pub reporter_count: usize,
}

/// `reportStatus` view.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportStatus {
    /// Whether a reading exists.
    pub submitted: bool,
    /// Submission time, zero when not submitted.
    pub timestamp: Timestamp,
}
