//! # Ledger Configuration
//!
//! Period length, which fields are aggregated, alert thresholds and the
//! identity the ledger uses for its own capability grants.

use crate::algorithms::AlertThresholds;
use crate::domain::{Address, Field, LedgerError, LedgerResult};
use serde::{Deserialize, Serialize};

/// Default period length (7 days).
pub const DEFAULT_PERIOD_DURATION_SECS: u64 = 7 * 24 * 3600;

/// Default ledger identity used for self-grants.
pub const DEFAULT_LEDGER_IDENTITY: Address = [0xC7; 20];

/// Fields aggregated by default. Metrics 3 and 5 are stored but not averaged.
pub const DEFAULT_AGGREGATED_FIELDS: [Field; 3] = [Field::Metric1, Field::Metric2, Field::Metric4];

/// Ledger configuration.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerConfig {
    /// Length of each reporting window.
    pub period_duration_secs: u64,

    /// Fields averaged at finalization, in batch order.
    pub aggregated_fields: Vec<Field>,

    /// Submission alert thresholds.
    pub alert_thresholds: AlertThresholds,

    /// Grantee recorded for the ledger's own capabilities.
    pub ledger_identity: Address,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            period_duration_secs: DEFAULT_PERIOD_DURATION_SECS,
            aggregated_fields: DEFAULT_AGGREGATED_FIELDS.to_vec(),
            alert_thresholds: AlertThresholds::default(),
            ledger_identity: DEFAULT_LEDGER_IDENTITY,
        }
    }
}

impl LedgerConfig {
    /// Create a config for testing (one minute periods).
    pub fn for_testing() -> Self {
        Self {
            period_duration_secs: 60,
            ..Self::default()
        }
    }

    /// Aggregate every field instead of the default subset.
    pub fn with_all_fields(mut self) -> Self {
        self.aggregated_fields = Field::ALL.to_vec();
        self
    }

    /// Reject configurations the ledger cannot run with.
    pub fn validate(&self) -> LedgerResult<()> {
        if self.period_duration_secs == 0 {
            return Err(LedgerError::InvalidConfig(
                "period_duration_secs must be positive".into(),
            ));
        }
        if self.aggregated_fields.is_empty() {
            return Err(LedgerError::InvalidConfig(
                "aggregated_fields must not be empty".into(),
            ));
        }
        for (i, field) in self.aggregated_fields.iter().enumerate() {
            if self.aggregated_fields[..i].contains(field) {
                return Err(LedgerError::InvalidConfig(format!(
                    "duplicate aggregated field {field:?}"
                )));
            }
        }
        Ok(())
    }
}
