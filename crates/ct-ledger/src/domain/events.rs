//! # Ledger Events
//!
//! Public events published after an operation commits. Nothing here carries
//! a plaintext reading; alert events do reveal threshold crossings per
//! reporter, which is the documented privacy caveat of alerting.

use super::value_objects::{AlertKind, Address, PeriodId, RequestId, Timestamp};
use serde::{Deserialize, Serialize};

/// Events emitted by the ledger.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum LedgerEvent {
    /// A reporter was added to the allow-list.
    ReporterAuthorized {
        /// New reporter
        reporter: Address,
    },

    /// A reviewer was added to the allow-list.
    ReviewerAuthorized {
        /// New reviewer
        reviewer: Address,
    },

    /// A period was opened.
    PeriodStarted {
        /// Period id
        period_id: PeriodId,
        /// Window start
        start: Timestamp,
        /// Window end
        end: Timestamp,
    },

    /// A reading was stored.
    ReadingSubmitted {
        /// Period id
        period_id: PeriodId,
        /// Submitting reporter
        reporter: Address,
        /// Submission time
        timestamp: Timestamp,
    },

    /// A threshold alert fired on a submission.
    AlertRaised {
        /// Period id
        period_id: PeriodId,
        /// Submitting reporter
        reporter: Address,
        /// Rule that fired
        kind: AlertKind,
    },

    /// Aggregation handed to the decryption oracle.
    SummaryRequested {
        /// Period id
        period_id: PeriodId,
        /// Oracle request id
        request_id: RequestId,
        /// Roster size
        reporter_count: usize,
    },

    /// Summary written and period closed for good.
    SummaryFinalized {
        /// Period id
        period_id: PeriodId,
        /// Public roster size
        reporter_count: usize,
    },

    /// A reviewer received capability on one reporter's reading.
    EmergencyAccessGranted {
        /// Period id
        period_id: PeriodId,
        /// Granted reviewer
        reviewer: Address,
        /// Reporter whose reading was opened up
        reporter: Address,
    },

    /// A reviewer received capability on a finalized summary.
    SummaryAccessGranted {
        /// Period id
        period_id: PeriodId,
        /// Granted reviewer
        reviewer: Address,
    },
}

impl LedgerEvent {
    /// Stable event name.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            LedgerEvent::ReporterAuthorized { .. } => "reporter_authorized",
            LedgerEvent::ReviewerAuthorized { .. } => "reviewer_authorized",
            LedgerEvent::PeriodStarted { .. } => "period_started",
            LedgerEvent::ReadingSubmitted { .. } => "reading_submitted",
            LedgerEvent::AlertRaised { .. } => "alert_raised",
            LedgerEvent::SummaryRequested { .. } => "summary_requested",
            LedgerEvent::SummaryFinalized { .. } => "summary_finalized",
            LedgerEvent::EmergencyAccessGranted { .. } => "emergency_access_granted",
            LedgerEvent::SummaryAccessGranted { .. } => "summary_access_granted",
        }
    }

    /// Period the event belongs to, if any.
    #[must_use]
    pub fn period_id(&self) -> Option<PeriodId> {
        match self {
            LedgerEvent::ReporterAuthorized { .. } | LedgerEvent::ReviewerAuthorized { .. } => {
                None
            }
            LedgerEvent::PeriodStarted { period_id, .. }
            | LedgerEvent::ReadingSubmitted { period_id, .. }
            | LedgerEvent::AlertRaised { period_id, .. }
            | LedgerEvent::SummaryRequested { period_id, .. }
            | LedgerEvent::SummaryFinalized { period_id, .. }
            | LedgerEvent::EmergencyAccessGranted { period_id, .. }
            | LedgerEvent::SummaryAccessGranted { period_id, .. } => Some(*period_id),
        }
    }
}
