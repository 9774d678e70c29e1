//! # Alert Evaluator
//!
//! Threshold rules over the plaintext of one submission. Runs before the
//! values are encrypted, so any alert it raises is information about one
//! reporter in one period that leaves the encrypted boundary.

use crate::domain::{AlertKind, Field, FieldValues};
use serde::{Deserialize, Serialize};

/// Inclusive band; values outside it alert.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Band {
    /// Lowest accepted value.
    pub min: u64,
    /// Highest accepted value.
    pub max: u64,
}

impl Band {
    /// Create a band.
    pub const fn new(min: u64, max: u64) -> Self {
        Self { min, max }
    }

    /// Whether `value` lies outside the band.
    pub fn excludes(&self, value: u64) -> bool {
        value < self.min || value > self.max
    }
}

/// Alert thresholds.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlertThresholds {
    /// Accepted band for metric 1.
    pub rate: Band,
    /// Ceiling for metric 2.
    pub primary_pressure_max: u64,
    /// Accepted band for metric 4.
    pub secondary: Band,
}

impl Default for AlertThresholds {
    fn default() -> Self {
        Self {
            rate: Band::new(50, 120),
            primary_pressure_max: 140,
            secondary: Band::new(60, 140),
        }
    }
}

/// Evaluate every rule independently. Metrics 3 and 5 are never inspected.
pub fn evaluate(values: &FieldValues, thresholds: &AlertThresholds) -> Vec<AlertKind> {
    let mut alerts = Vec::new();

    if thresholds.rate.excludes(values[Field::Metric1.index()]) {
        alerts.push(AlertKind::RateOutOfRange);
    }
    if values[Field::Metric2.index()] > thresholds.primary_pressure_max {
        alerts.push(AlertKind::PrimaryPressureHigh);
    }
    if thresholds.secondary.excludes(values[Field::Metric4.index()]) {
        alerts.push(AlertKind::SecondaryMetricOutOfRange);
    }

    alerts
}
