//! # Domain Errors
//!
//! Every error aborts the triggering operation with no partial mutation.
//! Retrying is the caller's (or the oracle's) business.

use super::value_objects::{PeriodId, PeriodPhase, RequestId};
use thiserror::Error;

/// Broad error class, stable across variants.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Caller lacks the required role or capability.
    Authorization,
    /// Operation invalid for the current period or reading state.
    State,
    /// Oracle callback failed its authenticity check.
    Verification,
    /// An external collaborator or persistence layer failed.
    Backend,
    /// Rejected configuration.
    Config,
}

impl ErrorKind {
    /// Stable label used in metrics.
    pub fn label(&self) -> &'static str {
        match self {
            ErrorKind::Authorization => "authorization",
            ErrorKind::State => "state",
            ErrorKind::Verification => "verification",
            ErrorKind::Backend => "backend",
            ErrorKind::Config => "config",
        }
    }
}

/// Ledger error types.
#[derive(Debug, Error)]
pub enum LedgerError {
    /// Caller is not the privileged owner.
    #[error("Caller is not the owner")]
    NotOwner,

    /// Caller is not an authorized reporter.
    #[error("Caller is not an authorized reporter")]
    NotReporter,

    /// Caller is not an authorized reviewer.
    #[error("Caller is not an authorized reviewer")]
    NotReviewer,

    /// Caller holds no decryption capability on the requested handles.
    #[error("No capability on requested values")]
    NoCapability,

    /// A reading for this (period, reporter) already exists.
    #[error("Already reported for period {0}")]
    AlreadyReported(PeriodId),

    /// Submission outside an open reporting window.
    #[error("Not reporting window")]
    NotReportingWindow,

    /// No period has been started yet.
    #[error("No period has been started")]
    NoActivePeriod,

    /// The current period is still inside its window.
    #[error("Period {period_id} still open ({remaining_secs}s remaining)")]
    PeriodStillOpen {
        /// Current period
        period_id: PeriodId,
        /// Seconds left in the window
        remaining_secs: u64,
    },

    /// The summary for this period is already final.
    #[error("Summary already finalized for period {0}")]
    SummaryAlreadyFinalized(PeriodId),

    /// The summary for this period is not final yet.
    #[error("Summary not finalized for period {0}")]
    SummaryNotFinalized(PeriodId),

    /// A decryption request is outstanding.
    #[error("Aggregation pending for period {period_id} (request {request_id})")]
    AggregationPending {
        /// Period awaiting the callback
        period_id: PeriodId,
        /// Outstanding request
        request_id: RequestId,
    },

    /// No reading exists for the (period, reporter) pair.
    #[error("No data for period {0}")]
    NoData(PeriodId),

    /// Callback for a request this ledger never issued (or already consumed).
    #[error("Unknown request: {0}")]
    UnknownRequest(RequestId),

    /// Period id was never allocated.
    #[error("Unknown period: {0}")]
    UnknownPeriod(PeriodId),

    /// Plaintext batch does not match roster size times stride.
    #[error("Batch length mismatch: expected {expected}, got {actual}")]
    BatchLengthMismatch {
        /// Roster size times aggregated field count
        expected: usize,
        /// Received values
        actual: usize,
    },

    /// Invalid period state transition.
    #[error("Invalid period transition: {from:?} -> {to:?}")]
    InvalidPeriodTransition {
        /// Current phase
        from: PeriodPhase,
        /// Attempted phase
        to: PeriodPhase,
    },

    /// Oracle proof does not authenticate the batch.
    #[error("Invalid decryption proof for request {0}")]
    InvalidProof(RequestId),

    /// Encryption backend failure.
    #[error("Cipher backend error: {0}")]
    Cipher(String),

    /// Decryption oracle failure.
    #[error("Oracle error: {0}")]
    Oracle(String),

    /// Snapshot encode/decode failure.
    #[error("Snapshot error: {0}")]
    Snapshot(String),

    /// Invalid configuration.
    #[error("Invalid config: {0}")]
    InvalidConfig(String),
}

impl LedgerError {
    /// Error class.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::NotOwner | Self::NotReporter | Self::NotReviewer | Self::NoCapability => {
                ErrorKind::Authorization
            }
            Self::AlreadyReported(_)
            | Self::NotReportingWindow
            | Self::NoActivePeriod
            | Self::PeriodStillOpen { .. }
            | Self::SummaryAlreadyFinalized(_)
            | Self::SummaryNotFinalized(_)
            | Self::AggregationPending { .. }
            | Self::NoData(_)
            | Self::UnknownRequest(_)
            | Self::UnknownPeriod(_)
            | Self::BatchLengthMismatch { .. }
            | Self::InvalidPeriodTransition { .. } => ErrorKind::State,
            Self::InvalidProof(_) => ErrorKind::Verification,
            Self::Cipher(_) | Self::Oracle(_) | Self::Snapshot(_) => ErrorKind::Backend,
            Self::InvalidConfig(_) => ErrorKind::Config,
        }
    }

    /// Stable reason code surfaced to callers.
    pub fn code(&self) -> &'static str {
        match self {
            Self::NotOwner => "not_owner",
            Self::NotReporter => "not_reporter",
            Self::NotReviewer => "not_reviewer",
            Self::NoCapability => "no_capability",
            Self::AlreadyReported(_) => "already_reported",
            Self::NotReportingWindow => "not_reporting_window",
            Self::NoActivePeriod => "no_active_period",
            Self::PeriodStillOpen { .. } => "period_still_open",
            Self::SummaryAlreadyFinalized(_) => "summary_already_finalized",
            Self::SummaryNotFinalized(_) => "summary_not_finalized",
            Self::AggregationPending { .. } => "aggregation_pending",
            Self::NoData(_) => "no_data",
            Self::UnknownRequest(_) => "unknown_request",
            Self::UnknownPeriod(_) => "unknown_period",
            Self::BatchLengthMismatch { .. } => "batch_length_mismatch",
            Self::InvalidPeriodTransition { .. } => "invalid_period_transition",
            Self::InvalidProof(_) => "invalid_proof",
            Self::Cipher(_) => "cipher_backend",
            Self::Oracle(_) => "oracle",
            Self::Snapshot(_) => "snapshot",
            Self::InvalidConfig(_) => "invalid_config",
        }
    }
}

impl From<ct_crypto::CryptoError> for LedgerError {
    fn from(err: ct_crypto::CryptoError) -> Self {
        LedgerError::Cipher(err.to_string())
    }
}

/// Result type for ledger operations.
pub type LedgerResult<T> = Result<T, LedgerError>;
