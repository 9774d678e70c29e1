//! # Inbound Ports
//!
//! API trait defining what the confidential ledger can do.
//!
//! The caller identity is always the first argument; authentication of that
//! identity belongs to whatever transport sits in front of the ledger.

use crate::domain::{
    Address, AlertKind, AggregateSummary, CipherHandle, DecryptionProof, FieldValues, LedgerResult,
    PeriodHistory, PeriodId, PeriodInfo, ReportStatus, RequestId, Timestamp, FIELD_COUNT,
};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Result of a committed submission.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmissionReceipt {
    /// Period the reading was stored under.
    pub period_id: PeriodId,
    /// Submission time.
    pub submitted_at: Timestamp,
    /// Alerts published for this submission.
    pub alerts: Vec<AlertKind>,
}

/// Outcome of `request_summary`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum SummaryRequestOutcome {
    /// Decryption requested; finalization waits for the oracle callback.
    Pending(RequestId),
    /// Empty roster; the period was finalized with a zero aggregate.
    FinalizedEmpty,
}

/// Confidential ledger API - inbound port.
#[async_trait]
pub trait ConfidentialLedgerApi: Send + Sync {
    /// Owner only. Idempotent.
    async fn authorize_reporter(&self, caller: Address, reporter: Address) -> LedgerResult<()>;

    /// Owner only. Idempotent.
    async fn authorize_reviewer(&self, caller: Address, reviewer: Address) -> LedgerResult<()>;

    /// Owner only. Opens a new period.
    async fn start_period(&self, caller: Address) -> LedgerResult<PeriodId>;

    /// Reporter only. Encrypts and stores one reading for the current period.
    async fn submit(&self, caller: Address, values: FieldValues)
        -> LedgerResult<SubmissionReceipt>;

    /// Reviewer only. Starts aggregation of the current, closed period.
    async fn request_summary(&self, caller: Address) -> LedgerResult<SummaryRequestOutcome>;

    /// Oracle callback. Verifies, reduces, re-encrypts and finalizes.
    async fn on_decrypted(
        &self,
        request_id: RequestId,
        plaintexts: Vec<u64>,
        proof: DecryptionProof,
    ) -> LedgerResult<PeriodId>;

    /// Reviewer only. Grants the caller capability on one reporter's reading.
    async fn grant_emergency_access(
        &self,
        caller: Address,
        reporter: Address,
        period_id: PeriodId,
    ) -> LedgerResult<()>;

    /// Reviewer only. Public facts about any period.
    async fn read_period_history(
        &self,
        caller: Address,
        period_id: PeriodId,
    ) -> LedgerResult<PeriodHistory>;

    /// Current period accepts submissions.
    async fn is_active(&self) -> bool;

    /// Seconds left in the current window.
    async fn time_remaining(&self) -> u64;

    /// Submission status of `reporter` in the current period.
    async fn report_status(&self, reporter: Address) -> ReportStatus;

    /// Current period, if any was started.
    async fn current_period_info(&self) -> Option<PeriodInfo>;

    /// Field handles of a reading, for callers holding capability on all five.
    async fn reading_handles(
        &self,
        caller: Address,
        period_id: PeriodId,
        reporter: Address,
    ) -> LedgerResult<[CipherHandle; FIELD_COUNT]>;

    /// Grant-table predicate.
    async fn has_capability(&self, handle: CipherHandle, grantee: Address) -> bool;

    /// Reviewer only. Encrypted summary of a finalized period.
    async fn summary_handles(
        &self,
        caller: Address,
        period_id: PeriodId,
    ) -> LedgerResult<AggregateSummary>;

    /// Reviewer only. Grants the caller capability on a finalized summary.
    async fn grant_summary_access(&self, caller: Address, period_id: PeriodId)
        -> LedgerResult<()>;

    /// Outstanding request for a period.
    async fn pending_request(&self, period_id: PeriodId) -> Option<RequestId>;
}
