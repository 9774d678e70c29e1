//! # Domain Value Objects
//!
//! Identities, handles, fields and the period state machine.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Caller identity (20-byte address).
pub type Address = [u8; 20];

/// Period identifier, strictly increasing from 1.
pub type PeriodId = u64;

/// Unix timestamp in seconds.
pub type Timestamp = u64;

/// Correlation id issued by the decryption oracle.
pub type RequestId = uuid::Uuid;

/// Number of fields in a reading.
pub const FIELD_COUNT: usize = 5;

/// Plaintext inputs of one submission, indexed by [`Field::index`].
pub type FieldValues = [u64; FIELD_COUNT];

/// Opaque reference to an encrypted value.
///
/// A handle can be stored, copied and access-controlled; it reveals nothing
/// about the value behind it.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CipherHandle([u8; 32]);

impl CipherHandle {
    /// Wrap raw handle bytes.
    pub fn new(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Raw handle bytes.
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

impl fmt::Display for CipherHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&hex::encode(self.0))
    }
}

impl fmt::Debug for CipherHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "CipherHandle({}..)", hex::encode(&self.0[..4]))
    }
}

/// The five fields of a reading.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Field {
    /// Rate-like metric (alerted on both bounds).
    Metric1,
    /// Primary pressure metric (alerted on the upper bound).
    Metric2,
    /// Collected, never alerted on, not aggregated by default.
    Metric3,
    /// Secondary metric (alerted on both bounds).
    Metric4,
    /// Collected, never alerted on, not aggregated by default.
    Metric5,
}

impl Field {
    /// All fields in storage order.
    pub const ALL: [Field; FIELD_COUNT] = [
        Field::Metric1,
        Field::Metric2,
        Field::Metric3,
        Field::Metric4,
        Field::Metric5,
    ];

    /// Position of this field in a reading.
    pub fn index(&self) -> usize {
        match self {
            Field::Metric1 => 0,
            Field::Metric2 => 1,
            Field::Metric3 => 2,
            Field::Metric4 => 3,
            Field::Metric5 => 4,
        }
    }
}

/// Roles managed by the access registry.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Role {
    /// May submit readings.
    Reporter,
    /// May request summaries and emergency access.
    Reviewer,
}

/// Period lifecycle.
///
/// `Expired` is not stored: it is an `Active` period whose window has
/// elapsed (see [`crate::Period::has_expired`]).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum PeriodPhase {
    /// Accepting readings until the window closes.
    #[default]
    Active,
    /// Decryption requested, waiting for the oracle callback.
    AwaitingDecryption,
    /// Summary written; the period never mutates again.
    Finalized,
    /// Expired without aggregation and replaced by a newer period.
    Superseded,
}

impl PeriodPhase {
    /// Check if transition is valid.
    pub fn can_transition_to(&self, next: PeriodPhase) -> bool {
        match (self, next) {
            (Self::Active, Self::AwaitingDecryption) => true,
            (Self::Active, Self::Finalized) => true, // empty roster
            (Self::Active, Self::Superseded) => true,
            (Self::AwaitingDecryption, Self::Finalized) => true,
            _ => false,
        }
    }

    /// Check if terminal state.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Finalized | Self::Superseded)
    }
}

/// Threshold alert raised on plaintext inputs at submission time.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum AlertKind {
    /// Metric 1 outside its allowed band.
    RateOutOfRange,
    /// Metric 2 above its ceiling.
    PrimaryPressureHigh,
    /// Metric 4 outside its allowed band.
    SecondaryMetricOutOfRange,
}

impl AlertKind {
    /// Stable label used in metrics and logs.
    pub fn label(&self) -> &'static str {
        match self {
            AlertKind::RateOutOfRange => "rate_out_of_range",
            AlertKind::PrimaryPressureHigh => "primary_pressure_high",
            AlertKind::SecondaryMetricOutOfRange => "secondary_metric_out_of_range",
        }
    }
}
